use axum::extract::{Path, State};
use axum::Json;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{Leaderboard, Round};
use crate::standings;

pub async fn round_leaderboard(
    State(state): State<AppState>,
    Path(round): Path<Round>,
) -> Result<Json<Leaderboard>, ApiError> {
    let board = standings::round_leaderboard(state.source.as_ref(), round, &state.scoring)
        .await
        .map_err(|e| {
            ApiError::Unavailable(format!("Could not load GW {} leaderboard: {}", round, e))
        })?;
    Ok(Json(board))
}

pub async fn overall_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Leaderboard>, ApiError> {
    let board = standings::overall_leaderboard(state.source.as_ref(), &state.scoring)
        .await
        .map_err(|e| {
            ApiError::Unavailable(format!("Could not load overall leaderboard: {}", e))
        })?;
    Ok(Json(board))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::http::StatusCode;
    use tempfile::TempDir;

    use crate::api::state::AppState;
    use crate::api::test_support::*;
    use crate::calculate::ScoringPolicy;
    use crate::models::{FixtureId, MatchResult, Pick, PredictionRecord, Round};
    use crate::source::{LeagueSource, SourceError};

    async fn seed(source: &dyn LeagueSource) {
        for result in [
            MatchResult::new(FixtureId(1), 1, "A", "B").full_time(2, 1),
            MatchResult::new(FixtureId(2), 1, "C", "D").full_time(0, 0),
            MatchResult::new(FixtureId(3), 2, "E", "F").full_time(3, 3),
        ] {
            source.record_result(&result).await.unwrap();
        }
        for record in [
            PredictionRecord::new("Bob", "bob", 1)
                .with_picks(vec![Pick::new(1, 0), Pick::new(0, 0).captain()]),
            PredictionRecord::new("Alice", "alice", 1)
                .with_picks(vec![Pick::new(2, 1).captain(), Pick::new(1, 1)]),
            PredictionRecord::new("Bob", "bob", 2).with_picks(vec![Pick::new(1, 1)]),
        ] {
            source.submit(&record).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_round_leaderboard() {
        let temp_dir = TempDir::new().unwrap();
        let (state, source) = setup_test_state(temp_dir.path());
        seed(&*source).await;

        let (status, json) = get_json(app(state), "/api/rounds/1/leaderboard").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["title"], "GW 1 Leaderboard");
        assert_eq!(json["scope"]["mode"], "round");
        let rows = json["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], "Alice");
        assert_eq!(rows[0]["points"], 7);
        assert_eq!(rows[0]["position"], 1);
        assert_eq!(rows[1]["name"], "Bob");
        assert_eq!(rows[1]["points"], 7);
    }

    #[tokio::test]
    async fn test_overall_leaderboard() {
        let temp_dir = TempDir::new().unwrap();
        let (state, source) = setup_test_state(temp_dir.path());
        seed(&*source).await;

        let (status, json) = get_json(app(state), "/api/leaderboard").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["title"], "Overall Leaderboard");
        let rows = json["rows"].as_array().unwrap();
        assert_eq!(rows[0]["name"], "Bob");
        assert_eq!(rows[0]["points"], 8);
        assert_eq!(rows[1]["name"], "Alice");
    }

    #[tokio::test]
    async fn test_empty_round_leaderboard() {
        let temp_dir = TempDir::new().unwrap();
        let (state, _) = setup_test_state(temp_dir.path());

        let (status, json) = get_json(app(state), "/api/rounds/5/leaderboard").await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["rows"].as_array().unwrap().is_empty());
    }

    struct Offline;

    #[async_trait]
    impl LeagueSource for Offline {
        fn name(&self) -> &'static str {
            "offline"
        }

        async fn fetch_predictions(&self) -> Result<Vec<PredictionRecord>, SourceError> {
            Err(SourceError::HttpStatus {
                status: 503,
                message: "Service Unavailable".to_string(),
            })
        }

        async fn fetch_round(&self, _round: Round) -> Result<Vec<MatchResult>, SourceError> {
            Ok(Vec::new())
        }

        async fn current_round(&self) -> Result<Option<Round>, SourceError> {
            Ok(None)
        }

        async fn submit(&self, _record: &PredictionRecord) -> Result<(), SourceError> {
            Ok(())
        }

        async fn record_result(&self, _result: &MatchResult) -> Result<(), SourceError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_upstream_failure_reports_could_not_load() {
        let state = AppState {
            source: Arc::new(Offline),
            scoring: ScoringPolicy::default(),
            clock: fixed_now,
        };

        let (status, json) = get_json(app(state.clone()), "/api/leaderboard").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"]["code"], "UNAVAILABLE");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Could not load"));

        let (status, _) = get_json(app(state), "/api/rounds/1/leaderboard").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
