//! Conversion from sheet-backend rows to prediction league models.
//!
//! Sheet rows are loosely typed: numbers may arrive as strings, blanks as
//! empty strings, and the picks of a submission as a JSON string inside a
//! cell. Everything here is lenient; a bad cell degrades to "absent".

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::models::{FixtureId, MatchResult, Pick, PredictionRecord, Round};

/// One row of the predictions sheet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetPredictionRow {
    #[serde(rename = "Name", default)]
    pub name: Value,

    #[serde(rename = "Twitter", default)]
    pub twitter: Value,

    #[serde(rename = "GW", default)]
    pub gw: Value,

    /// JSON-encoded array of picks, or occasionally the array itself
    #[serde(rename = "Predictions_JSON", default)]
    pub predictions_json: Value,

    #[serde(rename = "Timestamp", default)]
    pub timestamp: Value,
}

/// Payload of the `realScores` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetResultsPayload {
    #[serde(default)]
    pub matches: Vec<SheetMatch>,
}

/// Payload of the `gwData` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetRoundPayload {
    #[serde(default)]
    pub gw: Value,

    #[serde(default)]
    pub fixtures: Vec<SheetMatch>,
}

/// A fixture or result as served by the sheet backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetMatch {
    #[serde(default)]
    pub id: Value,

    #[serde(default)]
    pub home: Option<String>,

    #[serde(default)]
    pub away: Option<String>,

    #[serde(default)]
    pub kickoff_time: Option<String>,

    #[serde(default)]
    pub real_home_goals: Value,

    #[serde(default)]
    pub real_away_goals: Value,

    #[serde(default)]
    pub started: Value,

    #[serde(default)]
    pub finished: Value,
}

/// Submission body accepted by the sheet backend.
#[derive(Debug, Clone, Serialize)]
pub struct SheetSubmission {
    pub name: String,
    pub twitter: String,
    pub gw: Round,
    pub predictions: Vec<SheetPick>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetPick {
    #[serde(default)]
    pub home_score: Value,

    #[serde(default)]
    pub away_score: Value,

    #[serde(default)]
    pub is_captain: Value,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub fixture_id: Value,
}

/// Read a goal count: non-negative integers, as numbers or strings.
pub fn parse_goals(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<u32>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
                    .map(|f| f as u32)
            })
        }
        _ => None,
    }
}

/// Read a checkbox-ish flag: booleans, "true"/"TRUE", or non-zero numbers.
pub fn parse_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

fn parse_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let Value::String(s) = value else {
        return None;
    };
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Decode the picks cell of a prediction row.
pub fn parse_picks(raw: &Value) -> Result<Vec<Pick>, serde_json::Error> {
    let parsed;
    let array = match raw {
        Value::Null => return Ok(Vec::new()),
        Value::String(s) if s.trim().is_empty() => return Ok(Vec::new()),
        Value::String(s) => {
            parsed = serde_json::from_str::<Value>(s)?;
            &parsed
        }
        other => other,
    };

    let sheet_picks: Vec<Option<SheetPick>> = serde_json::from_value(array.clone())?;
    Ok(sheet_picks
        .into_iter()
        .map(|p| p.map(Pick::from).unwrap_or_default())
        .collect())
}

impl From<SheetPick> for Pick {
    fn from(p: SheetPick) -> Self {
        Pick {
            fixture_id: parse_goals(&p.fixture_id).map(FixtureId),
            home: parse_goals(&p.home_score),
            away: parse_goals(&p.away_score),
            is_captain: parse_flag(&p.is_captain),
        }
    }
}

impl From<&Pick> for SheetPick {
    fn from(p: &Pick) -> Self {
        SheetPick {
            home_score: p.home.map(Value::from).unwrap_or(Value::Null),
            away_score: p.away.map(Value::from).unwrap_or(Value::Null),
            is_captain: Value::Bool(p.is_captain),
            fixture_id: p.fixture_id.map(|id| Value::from(id.0)).unwrap_or(Value::Null),
        }
    }
}

impl From<&PredictionRecord> for SheetSubmission {
    fn from(record: &PredictionRecord) -> Self {
        SheetSubmission {
            name: record.name.clone(),
            twitter: record.handle.clone(),
            gw: record.round,
            predictions: record.picks.iter().map(SheetPick::from).collect(),
        }
    }
}

/// Convert a sheet row into a prediction record.
///
/// Rows without a readable round are dropped. Rows whose picks cannot be
/// decoded are kept with no picks so they still appear on the leaderboard.
pub fn record_from_row(row: &SheetPredictionRow) -> Option<PredictionRecord> {
    let name = parse_text(&row.name);
    let Some(round) = parse_goals(&row.gw) else {
        warn!("Dropping prediction row for {:?}: unreadable GW {}", name, row.gw);
        return None;
    };

    let picks = match parse_picks(&row.predictions_json) {
        Ok(picks) => picks,
        Err(e) => {
            warn!(
                "Unreadable picks for {:?} in GW {}, scoring as empty: {}",
                name, round, e
            );
            Vec::new()
        }
    };

    let mut record = PredictionRecord::new(name, parse_text(&row.twitter), round).with_picks(picks);
    record.submitted_at = parse_timestamp(&row.timestamp);
    Some(record)
}

/// Convert a list of sheet matches for one round. Matches without an id
/// get their 1-based position.
pub fn matches_from_sheet(round: Round, matches: &[SheetMatch]) -> Vec<MatchResult> {
    matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let fixture_id = parse_goals(&m.id).unwrap_or(i as u32 + 1);
            MatchResult {
                fixture_id: FixtureId(fixture_id),
                round,
                home_team: m.home.clone().unwrap_or_default(),
                away_team: m.away.clone().unwrap_or_default(),
                kickoff: m
                    .kickoff_time
                    .as_deref()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|dt| dt.with_timezone(&Utc)),
                home_goals: parse_goals(&m.real_home_goals),
                away_goals: parse_goals(&m.real_away_goals),
                started: parse_flag(&m.started),
                finished: parse_flag(&m.finished),
            }
        })
        .collect()
}

/// Read the round number out of a `gwData` payload.
pub fn round_from_payload(payload: &SheetRoundPayload) -> Option<Round> {
    parse_goals(&payload.gw)
}

const TEAM_ALIASES: &[(&str, &str)] = &[
    ("manchester city", "man city"),
    ("manchester united", "man utd"),
    ("tottenham hotspur", "spurs"),
    ("wolverhampton wanderers", "wolves"),
    ("west ham united", "west ham"),
    ("afc bournemouth", "bournemouth"),
    ("nottingham forest", "nottm forest"),
    ("brighton and hove albion", "brighton"),
    ("newcastle united", "newcastle"),
    ("leeds united", "leeds"),
    ("sheffield united", "sheffield utd"),
];

fn non_alphanumeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9 ]+").expect("valid regex"))
}

/// Canonical team name used to match feeds that spell teams differently.
pub fn normalize_team_name(name: &str) -> String {
    let lowered = name.to_lowercase().replace(['\u{2019}', '\''], "");
    let cleaned = non_alphanumeric().replace_all(&lowered, " ");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    TEAM_ALIASES
        .iter()
        .find(|(full, _)| *full == collapsed)
        .map(|(_, short)| short.to_string())
        .unwrap_or(collapsed)
}

/// Line up feed results with the round's fixture list by team names.
///
/// The output follows fixture order and keeps the fixtures' ids. Fixtures
/// the feed does not mention keep an unknown score.
pub fn align_results(fixtures: &[MatchResult], feed: &[MatchResult]) -> Vec<MatchResult> {
    let by_teams: HashMap<(String, String), &MatchResult> = feed
        .iter()
        .map(|m| {
            (
                (normalize_team_name(&m.home_team), normalize_team_name(&m.away_team)),
                m,
            )
        })
        .collect();

    fixtures
        .iter()
        .map(|fixture| {
            let key = (
                normalize_team_name(&fixture.home_team),
                normalize_team_name(&fixture.away_team),
            );
            let mut aligned = fixture.clone();
            match by_teams.get(&key) {
                Some(result) => {
                    aligned.home_goals = result.home_goals;
                    aligned.away_goals = result.away_goals;
                    aligned.started = result.started;
                    aligned.finished = result.finished;
                    if aligned.kickoff.is_none() {
                        aligned.kickoff = result.kickoff;
                    }
                }
                None => warn!(
                    "No feed result for {} v {} in GW {}",
                    fixture.home_team, fixture.away_team, fixture.round
                ),
            }
            aligned
        })
        .collect()
}
