//! Local JSONL-backed source.

use async_trait::async_trait;
use tracing::{debug, info};

use super::{LeagueSource, SourceError};
use crate::models::{current_round, MatchResult, PredictionRecord, Round};
use crate::storage::{self, StorageConfig};

/// Reads and writes league data under the data directory.
pub struct LocalSource {
    storage: StorageConfig,
}

impl LocalSource {
    pub fn new(storage: StorageConfig) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }
}

#[async_trait]
impl LeagueSource for LocalSource {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn fetch_predictions(&self) -> Result<Vec<PredictionRecord>, SourceError> {
        let records = storage::read_predictions(&self.storage)?;
        debug!("Loaded {} prediction records", records.len());
        Ok(records)
    }

    async fn fetch_round(&self, round: Round) -> Result<Vec<MatchResult>, SourceError> {
        Ok(storage::read_matches(&self.storage, round)?)
    }

    async fn current_round(&self) -> Result<Option<Round>, SourceError> {
        let mut matches = Vec::new();
        for round in storage::list_rounds(&self.storage)? {
            matches.extend(storage::read_matches(&self.storage, round)?);
        }
        Ok(current_round(&matches))
    }

    async fn submit(&self, record: &PredictionRecord) -> Result<(), SourceError> {
        let replaced = storage::upsert_prediction(&self.storage, record)?;
        info!(
            "{} predictions for {} in GW {}",
            if replaced { "Replaced" } else { "Stored" },
            record.user_key(),
            record.round
        );
        Ok(())
    }

    async fn record_result(&self, result: &MatchResult) -> Result<(), SourceError> {
        storage::upsert_match(&self.storage, result)?;
        info!(
            "Recorded GW {} fixture {}: {} {:?}-{:?} {}",
            result.round,
            result.fixture_id,
            result.home_team,
            result.home_goals,
            result.away_goals,
            result.away_team
        );
        Ok(())
    }
}
