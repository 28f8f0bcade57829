//! Where predictions and results come from.
//!
//! Supports two backends:
//! - Local: JSONL files in the data directory (default)
//! - Sheet: a spreadsheet-backed web app reached over HTTP

pub mod convert;
pub mod local;
pub mod sheet;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::config::{SourceConfig, SourceKind};
use crate::models::{MatchResult, PredictionRecord, Round};
use crate::storage::{StorageConfig, StorageError};

pub use local::LocalSource;
pub use sheet::SheetSource;

/// Errors raised while loading or saving league data.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} is not supported by the {1} source")]
    Unsupported(&'static str, &'static str),

    #[error("Source misconfigured: {0}")]
    Config(String),
}

/// A backend holding the league's predictions and fixtures.
#[async_trait]
pub trait LeagueSource: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Every prediction record across all users and rounds.
    async fn fetch_predictions(&self) -> Result<Vec<PredictionRecord>, SourceError>;

    /// Fixtures and results of one round, in fixture order.
    async fn fetch_round(&self, round: Round) -> Result<Vec<MatchResult>, SourceError>;

    /// The round currently open for predictions, if any is known.
    async fn current_round(&self) -> Result<Option<Round>, SourceError>;

    /// Store a validated submission.
    async fn submit(&self, record: &PredictionRecord) -> Result<(), SourceError>;

    /// Store a fixture's (possibly updated) result.
    async fn record_result(&self, result: &MatchResult) -> Result<(), SourceError>;
}

/// Build the configured backend.
pub fn build_source(
    config: &SourceConfig,
    storage: &StorageConfig,
) -> Result<Arc<dyn LeagueSource>, SourceError> {
    let source: Arc<dyn LeagueSource> = match config.kind {
        SourceKind::Local => Arc::new(LocalSource::new(storage.clone())),
        SourceKind::Sheet => {
            let base_url = config.base_url.clone().ok_or_else(|| {
                SourceError::Config("sheet source requires base_url".to_string())
            })?;
            Arc::new(SheetSource::new(
                base_url,
                Duration::from_secs(config.timeout_seconds),
            )?)
        }
    };
    info!("Using {} source", source.name());
    Ok(source)
}
