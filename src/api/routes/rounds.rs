use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{FixtureId, MatchResult, ResultEntry, Round};

#[derive(Debug, Serialize)]
pub struct CurrentRoundResponse {
    pub round: Round,
}

pub async fn current_round(
    State(state): State<AppState>,
) -> Result<Json<CurrentRoundResponse>, ApiError> {
    let round = state
        .source
        .current_round()
        .await
        .map_err(|e| ApiError::Unavailable(format!("Could not load fixtures: {}", e)))?
        .ok_or_else(|| ApiError::NotFound("No fixtures scheduled".to_string()))?;
    Ok(Json(CurrentRoundResponse { round }))
}

#[derive(Debug, Serialize)]
pub struct FixtureView {
    pub fixture_id: FixtureId,
    pub home_team: String,
    pub away_team: String,
    pub kickoff: Option<DateTime<Utc>>,
    pub home_goals: Option<u32>,
    pub away_goals: Option<u32>,
    pub locked: bool,
    pub status: Option<String>,
}

impl FixtureView {
    fn new(m: &MatchResult, now: DateTime<Utc>) -> Self {
        Self {
            fixture_id: m.fixture_id,
            home_team: m.home_team.clone(),
            away_team: m.away_team.clone(),
            kickoff: m.kickoff,
            home_goals: m.home_goals,
            away_goals: m.away_goals,
            locked: m.is_locked(now),
            status: m.status_label(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FixturesResponse {
    pub round: Round,
    pub fixtures: Vec<FixtureView>,
}

pub async fn list_fixtures(
    State(state): State<AppState>,
    Path(round): Path<Round>,
) -> Result<Json<FixturesResponse>, ApiError> {
    let matches = state
        .source
        .fetch_round(round)
        .await
        .map_err(|e| ApiError::Unavailable(format!("Could not load GW {} fixtures: {}", round, e)))?;
    if matches.is_empty() {
        return Err(ApiError::NotFound(format!("GW {} has no fixtures", round)));
    }

    let now = state.now();
    Ok(Json(FixturesResponse {
        round,
        fixtures: matches.iter().map(|m| FixtureView::new(m, now)).collect(),
    }))
}

pub async fn record_result(
    State(state): State<AppState>,
    Path(round): Path<Round>,
    Json(entry): Json<ResultEntry>,
) -> Result<(StatusCode, Json<MatchResult>), ApiError> {
    let matches = state
        .source
        .fetch_round(round)
        .await
        .map_err(|e| ApiError::Unavailable(format!("Could not load GW {} fixtures: {}", round, e)))?;

    let fixture_id = entry.fixture_id;
    let existing = matches.iter().find(|m| m.fixture_id == fixture_id);
    let created = existing.is_none();
    let result = entry.apply(round, existing).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Fixture {} is new to GW {}; home_team and away_team are required",
            fixture_id, round
        ))
    })?;

    state
        .source
        .record_result(&result)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(result)))
}
