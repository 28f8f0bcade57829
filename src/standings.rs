//! Load-then-aggregate entry points.
//!
//! Every input is fetched before any scoring starts. If a fetch fails the
//! whole load fails; the aggregator never sees partial data.

use std::collections::{BTreeSet, HashMap};

use futures::future::try_join_all;
use tracing::{debug, info};

use crate::calculate::{aggregate_overall, aggregate_round, ScoringPolicy};
use crate::models::{Leaderboard, Round};
use crate::source::{LeagueSource, SourceError};

/// Leaderboard for one round.
pub async fn round_leaderboard(
    source: &dyn LeagueSource,
    round: Round,
    policy: &ScoringPolicy,
) -> Result<Leaderboard, SourceError> {
    let (records, results) = tokio::try_join!(source.fetch_predictions(), source.fetch_round(round))?;
    debug!(
        "GW {}: {} prediction records, {} fixtures",
        round,
        records.len(),
        results.len()
    );
    Ok(aggregate_round(&records, round, &results, policy))
}

/// Leaderboard across all rounds that have predictions.
pub async fn overall_leaderboard(
    source: &dyn LeagueSource,
    policy: &ScoringPolicy,
) -> Result<Leaderboard, SourceError> {
    let records = source.fetch_predictions().await?;
    let rounds: BTreeSet<Round> = records.iter().map(|r| r.round).collect();

    let fetched = try_join_all(rounds.iter().map(|&round| async move {
        source.fetch_round(round).await.map(|results| (round, results))
    }))
    .await?;
    let results_by_round: HashMap<_, _> = fetched.into_iter().collect();

    info!(
        "Overall: {} prediction records across {} rounds",
        records.len(),
        results_by_round.len()
    );
    Ok(aggregate_overall(&records, &results_by_round, policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FixtureId, MatchResult, Pick, PredictionRecord};
    use crate::source::LocalSource;
    use crate::storage::StorageConfig;
    use async_trait::async_trait;
    use tempfile::TempDir;

    async fn seeded_source(temp_dir: &TempDir) -> LocalSource {
        let source = LocalSource::new(StorageConfig::new(temp_dir.path().to_path_buf()));
        for result in [
            MatchResult::new(FixtureId(1), 1, "A", "B").full_time(2, 1),
            MatchResult::new(FixtureId(2), 1, "C", "D").full_time(0, 0),
            MatchResult::new(FixtureId(3), 2, "E", "F").full_time(1, 3),
        ] {
            source.record_result(&result).await.unwrap();
        }
        for record in [
            PredictionRecord::new("Ann", "ann", 1)
                .with_picks(vec![Pick::new(2, 1).captain(), Pick::new(1, 1)]),
            PredictionRecord::new("Bob", "bob", 1)
                .with_picks(vec![Pick::new(1, 0), Pick::new(0, 0).captain()]),
            PredictionRecord::new("Ann", "@ANN", 2).with_picks(vec![Pick::new(1, 3)]),
        ] {
            source.submit(&record).await.unwrap();
        }
        source
    }

    #[tokio::test]
    async fn test_round_leaderboard() {
        let temp_dir = TempDir::new().unwrap();
        let source = seeded_source(&temp_dir).await;

        let board = round_leaderboard(&source, 1, &ScoringPolicy::default())
            .await
            .unwrap();

        let rows: Vec<_> = board.rows.iter().map(|r| (r.name.as_str(), r.points)).collect();
        assert_eq!(rows, vec![("Ann", 7), ("Bob", 7)]);
    }

    #[tokio::test]
    async fn test_overall_leaderboard_merges_rounds() {
        let temp_dir = TempDir::new().unwrap();
        let source = seeded_source(&temp_dir).await;

        let board = overall_leaderboard(&source, &ScoringPolicy::default())
            .await
            .unwrap();

        let rows: Vec<_> = board.rows.iter().map(|r| (r.name.as_str(), r.points)).collect();
        assert_eq!(rows, vec![("Ann", 10), ("Bob", 7)]);
        assert_eq!(board.rows[0].handle, "@ANN");
    }

    struct FailingRounds {
        inner: LocalSource,
    }

    #[async_trait]
    impl LeagueSource for FailingRounds {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn fetch_predictions(&self) -> Result<Vec<PredictionRecord>, SourceError> {
            self.inner.fetch_predictions().await
        }

        async fn fetch_round(&self, round: Round) -> Result<Vec<MatchResult>, SourceError> {
            if round == 2 {
                return Err(SourceError::HttpStatus {
                    status: 502,
                    message: "Bad Gateway".to_string(),
                });
            }
            self.inner.fetch_round(round).await
        }

        async fn current_round(&self) -> Result<Option<Round>, SourceError> {
            self.inner.current_round().await
        }

        async fn submit(&self, record: &PredictionRecord) -> Result<(), SourceError> {
            self.inner.submit(record).await
        }

        async fn record_result(&self, result: &MatchResult) -> Result<(), SourceError> {
            self.inner.record_result(result).await
        }
    }

    #[tokio::test]
    async fn test_any_failed_round_fails_overall_load() {
        let temp_dir = TempDir::new().unwrap();
        let source = FailingRounds {
            inner: seeded_source(&temp_dir).await,
        };

        let result = overall_leaderboard(&source, &ScoringPolicy::default()).await;
        assert!(matches!(result, Err(SourceError::HttpStatus { status: 502, .. })));

        // A round that loads fine still works on its own.
        assert!(round_leaderboard(&source, 1, &ScoringPolicy::default())
            .await
            .is_ok());
    }
}
