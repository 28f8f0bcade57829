//! Scoring engine.
//!
//! Pure computation over already-fetched data:
//! - Per-fixture scoring of a predicted scoreline against the real one
//! - Leaderboard aggregation for one round or across all rounds

pub mod leaderboard;

use serde::{Deserialize, Serialize};

use crate::models::{MatchResult, Pick};

pub use leaderboard::{aggregate, aggregate_overall, aggregate_round};

/// Points for predicting the exact score.
pub const EXACT_SCORE_POINTS: u32 = 3;

/// Points for predicting the right outcome (home win, draw, away win).
pub const CORRECT_RESULT_POINTS: u32 = 1;

/// Multiplier applied to a captain pick.
pub const CAPTAIN_MULTIPLIER: u32 = 2;

/// How a single pick fared against the real score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickOutcome {
    /// Either side of the prediction or the result is unknown
    Unscored,
    Miss,
    CorrectResult,
    ExactScore,
}

impl PickOutcome {
    /// Base points before the captain multiplier.
    pub fn base_points(self) -> u32 {
        match self {
            PickOutcome::ExactScore => EXACT_SCORE_POINTS,
            PickOutcome::CorrectResult => CORRECT_RESULT_POINTS,
            PickOutcome::Miss | PickOutcome::Unscored => 0,
        }
    }
}

/// Classify a prediction against an actual score.
///
/// The outcome comparison is the sign of the goal difference, so any
/// predicted draw matches any actual draw.
pub fn classify(
    predicted_home: Option<u32>,
    predicted_away: Option<u32>,
    actual_home: Option<u32>,
    actual_away: Option<u32>,
) -> PickOutcome {
    let (Some(ph), Some(pa), Some(ah), Some(aa)) =
        (predicted_home, predicted_away, actual_home, actual_away)
    else {
        return PickOutcome::Unscored;
    };

    if ph == ah && pa == aa {
        PickOutcome::ExactScore
    } else if ph.cmp(&pa) == ah.cmp(&aa) {
        PickOutcome::CorrectResult
    } else {
        PickOutcome::Miss
    }
}

/// Points for one prediction: 3 for the exact score, 1 for the right
/// outcome, 0 otherwise, doubled for the captain pick. Any unknown score
/// yields 0.
pub fn score(
    predicted_home: Option<u32>,
    predicted_away: Option<u32>,
    actual_home: Option<u32>,
    actual_away: Option<u32>,
    is_captain: bool,
) -> u32 {
    let base = classify(predicted_home, predicted_away, actual_home, actual_away).base_points();
    if is_captain {
        base * CAPTAIN_MULTIPLIER
    } else {
        base
    }
}

/// Which real scores count towards points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Score in-progress matches on their current score. When off, only
    /// finished matches count.
    #[serde(default = "default_count_live_scores")]
    pub count_live_scores: bool,
}

fn default_count_live_scores() -> bool {
    true
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            count_live_scores: default_count_live_scores(),
        }
    }
}

impl ScoringPolicy {
    /// The (home, away) goals this policy allows to be scored against.
    pub fn countable_score(&self, result: &MatchResult) -> (Option<u32>, Option<u32>) {
        if !result.finished && !self.count_live_scores {
            return (None, None);
        }
        (result.home_goals, result.away_goals)
    }

    /// Classify and score a pick against a result under this policy.
    pub fn score_pick(&self, pick: &Pick, result: &MatchResult) -> (PickOutcome, u32) {
        let (actual_home, actual_away) = self.countable_score(result);
        let outcome = classify(pick.home, pick.away, actual_home, actual_away);
        let points = score(pick.home, pick.away, actual_home, actual_away, pick.is_captain);
        (outcome, points)
    }
}
