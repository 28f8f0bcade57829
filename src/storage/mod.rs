//! Local on-disk storage.
//!
//! Predictions and fixtures are kept as JSON Lines under the data directory:
//! - `normalized/predictions.jsonl`: every submission across all rounds
//! - `normalized/round-N/matches.jsonl`: fixtures and results of round N

mod jsonl;

pub use jsonl::*;

use std::path::PathBuf;
use thiserror::Error;

use crate::models::Round;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn normalized_dir(&self) -> PathBuf {
        self.data_dir.join("normalized")
    }

    pub fn round_dir(&self, round: Round) -> PathBuf {
        self.normalized_dir().join(round_dir_name(round))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

pub(crate) fn round_dir_name(round: Round) -> String {
    format!("round-{}", round)
}

/// Parse a `round-N` directory name.
pub(crate) fn parse_round_dir(name: &str) -> Option<Round> {
    name.strip_prefix("round-")?.parse().ok()
}
