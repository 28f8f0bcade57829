//! Validation of incoming prediction submissions.
//!
//! A submission is checked against the round's fixtures at the moment it
//! arrives. Picks for fixtures that have already locked are cleared rather
//! than rejected, so a late submitter keeps the picks that still count.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{MatchResult, Pick, PredictionRecord, Round};

/// Highest goal count accepted in a prediction.
pub const MAX_PREDICTED_GOALS: u32 = 99;

/// Submission validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Name is required")]
    MissingName,

    #[error("Handle is required")]
    MissingHandle,

    #[error("GW {0} has no fixtures")]
    UnknownRound(Round),

    #[error("{picks} picks submitted for {fixtures} fixtures")]
    TooManyPicks { picks: usize, fixtures: usize },

    #[error("Pick {index} refers to a fixture outside this round")]
    UnknownFixture { index: usize },

    #[error("Pick {index} repeats a fixture already predicted")]
    DuplicateFixture { index: usize },

    #[error("Pick {index} predicts more than {max} goals", max = MAX_PREDICTED_GOALS)]
    ScoreOutOfRange { index: usize },

    #[error("Only one captain allowed, got {0}")]
    MultipleCaptains(usize),
}

/// A prediction submission as received from a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub name: String,
    pub handle: String,
    pub round: Round,
    #[serde(default)]
    pub picks: Vec<Pick>,
}

impl Submission {
    /// Validate against the round's fixtures and build the record to store.
    ///
    /// Positional picks are given the id of the fixture at their position so
    /// the stored record no longer depends on fixture order.
    pub fn validate(
        self,
        fixtures: &[MatchResult],
        now: DateTime<Utc>,
    ) -> Result<PredictionRecord, SubmissionError> {
        let name = self.name.trim().to_string();
        let handle = self.handle.trim().to_string();
        if name.is_empty() {
            return Err(SubmissionError::MissingName);
        }
        if handle.is_empty() {
            return Err(SubmissionError::MissingHandle);
        }
        if fixtures.is_empty() {
            return Err(SubmissionError::UnknownRound(self.round));
        }
        if self.picks.len() > fixtures.len() {
            return Err(SubmissionError::TooManyPicks {
                picks: self.picks.len(),
                fixtures: fixtures.len(),
            });
        }

        let mut picks = Vec::with_capacity(self.picks.len());
        let mut seen = HashSet::new();
        for (index, mut pick) in self.picks.into_iter().enumerate() {
            let fixture = match pick.fixture_id {
                Some(id) => fixtures
                    .iter()
                    .find(|f| f.fixture_id == id)
                    .ok_or(SubmissionError::UnknownFixture { index })?,
                None => &fixtures[index],
            };
            if !seen.insert(fixture.fixture_id) {
                return Err(SubmissionError::DuplicateFixture { index });
            }
            pick.fixture_id = Some(fixture.fixture_id);

            let too_many = |goals: Option<u32>| goals.is_some_and(|g| g > MAX_PREDICTED_GOALS);
            if too_many(pick.home) || too_many(pick.away) {
                return Err(SubmissionError::ScoreOutOfRange { index });
            }

            if fixture.is_locked(now) {
                debug!("Clearing pick for locked fixture {}", fixture.fixture_id);
                pick.clear();
            }
            picks.push(pick);
        }

        let captains = picks.iter().filter(|p| p.is_captain).count();
        if captains > 1 {
            return Err(SubmissionError::MultipleCaptains(captains));
        }

        let mut record = PredictionRecord::new(name, handle, self.round).with_picks(picks);
        record.submitted_at = Some(now);
        Ok(record)
    }
}
