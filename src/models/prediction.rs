//! Prediction records: one user's picks for one round.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FixtureId, RecordId, Round, UserKey};

/// A single predicted scoreline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    /// Fixture this pick refers to. Legacy rows carry none and are
    /// matched by position instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture_id: Option<FixtureId>,

    /// Predicted home goals, absent when left blank
    pub home: Option<u32>,

    /// Predicted away goals, absent when left blank
    pub away: Option<u32>,

    /// Captain pick: points for this fixture are doubled
    #[serde(default)]
    pub is_captain: bool,
}

impl Pick {
    pub fn new(home: u32, away: u32) -> Self {
        Self {
            fixture_id: None,
            home: Some(home),
            away: Some(away),
            is_captain: false,
        }
    }

    /// Builder method to mark this pick as captain.
    pub fn captain(mut self) -> Self {
        self.is_captain = true;
        self
    }

    /// Builder method to attach a fixture id.
    pub fn for_fixture(mut self, fixture_id: FixtureId) -> Self {
        self.fixture_id = Some(fixture_id);
        self
    }

    /// Whether both scores were filled in.
    pub fn is_complete(&self) -> bool {
        self.home.is_some() && self.away.is_some()
    }

    /// Drop the scores and captaincy, keeping the fixture reference.
    pub fn clear(&mut self) {
        self.home = None;
        self.away = None;
        self.is_captain = false;
    }
}

/// One submission for one round by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Display name as submitted
    pub name: String,

    /// Social handle as submitted
    pub handle: String,

    /// Round these picks belong to
    pub round: Round,

    /// Picks in fixture order
    #[serde(default)]
    pub picks: Vec<Pick>,

    /// When the submission was accepted, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl PredictionRecord {
    pub fn new(name: impl Into<String>, handle: impl Into<String>, round: Round) -> Self {
        Self {
            name: name.into(),
            handle: handle.into(),
            round,
            picks: Vec::new(),
            submitted_at: None,
        }
    }

    /// Builder method to set picks.
    pub fn with_picks(mut self, picks: Vec<Pick>) -> Self {
        self.picks = picks;
        self
    }

    pub fn user_key(&self) -> UserKey {
        UserKey::new(&self.name, &self.handle)
    }

    pub fn id(&self) -> RecordId {
        RecordId::for_submission(&self.user_key(), self.round)
    }

    /// Number of picks flagged as captain.
    pub fn captain_count(&self) -> usize {
        self.picks.iter().filter(|p| p.is_captain).count()
    }
}
