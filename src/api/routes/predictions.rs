use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{Pick, Round};
use crate::submission::Submission;

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub round: Round,
    pub name: String,
    pub handle: String,
    /// Picks as stored, with locked fixtures cleared
    pub picks: Vec<Pick>,
}

pub async fn submit(
    State(state): State<AppState>,
    Json(submission): Json<Submission>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let round = submission.round;
    let fixtures = state.source.fetch_round(round).await.map_err(|e| {
        ApiError::Unavailable(format!("Could not load GW {} fixtures: {}", round, e))
    })?;

    let record = submission.validate(&fixtures, state.now())?;
    state
        .source
        .submit(&record)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!("Accepted GW {} predictions from {}", round, record.user_key());
    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            round,
            name: record.name,
            handle: record.handle,
            picks: record.picks,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::Duration;
    use tempfile::TempDir;

    use crate::api::test_support::*;
    use crate::models::{FixtureId, MatchResult};
    use crate::source::{LeagueSource, LocalSource};

    async fn seed_round(source: &LocalSource) {
        source
            .record_result(
                &MatchResult::new(FixtureId(1), 1, "Arsenal", "Chelsea")
                    .with_kickoff(fixed_now() - Duration::minutes(5)),
            )
            .await
            .unwrap();
        source
            .record_result(
                &MatchResult::new(FixtureId(2), 1, "Leeds", "Spurs")
                    .with_kickoff(fixed_now() + Duration::hours(2)),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_submit_stores_record() {
        let temp_dir = TempDir::new().unwrap();
        let (state, source) = setup_test_state(temp_dir.path());
        seed_round(&source).await;

        let body = r#"{
            "name": "Ann",
            "handle": "@annb",
            "round": 1,
            "picks": [
                {"home": 2, "away": 0, "is_captain": true},
                {"home": 1, "away": 1, "is_captain": true}
            ]
        }"#;
        let (status, json) = post_json(app(state), "/api/predictions", body).await;

        assert_eq!(status, StatusCode::CREATED);
        // First fixture already kicked off: its pick and captaincy are dropped.
        assert!(json["picks"][0]["home"].is_null());
        assert_eq!(json["picks"][0]["is_captain"], false);
        assert_eq!(json["picks"][1]["fixture_id"], 2);
        assert_eq!(json["picks"][1]["is_captain"], true);

        let stored = source.fetch_predictions().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].handle, "@annb");
        assert!(stored[0].submitted_at.is_some());
    }

    #[tokio::test]
    async fn test_resubmission_replaces() {
        let temp_dir = TempDir::new().unwrap();
        let (state, source) = setup_test_state(temp_dir.path());
        seed_round(&source).await;

        for home in [1, 3] {
            let body = format!(
                r#"{{"name": "Ann", "handle": "annb", "round": 1, "picks": [{{}}, {{"home": {}, "away": 0}}]}}"#,
                home
            );
            let (status, _) = post_json(app(state.clone()), "/api/predictions", &body).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let stored = source.fetch_predictions().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].picks[1].home, Some(3));
    }

    #[tokio::test]
    async fn test_two_captains_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let (state, source) = setup_test_state(temp_dir.path());
        seed_round(&source).await;
        source
            .record_result(&MatchResult::new(FixtureId(3), 1, "Everton", "Fulham"))
            .await
            .unwrap();

        let body = r#"{"name": "Ann", "handle": "annb", "round": 1, "picks": [
            {}, {"home": 1, "away": 0, "is_captain": true}, {"home": 0, "away": 0, "is_captain": true}
        ]}"#;
        let (status, json) = post_json(app(state), "/api/predictions", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Only one captain"));
        assert!(source.fetch_predictions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_for_unknown_round_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let (state, _) = setup_test_state(temp_dir.path());

        let body = r#"{"name": "Ann", "handle": "annb", "round": 12, "picks": []}"#;
        let (status, _) = post_json(app(state), "/api/predictions", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
