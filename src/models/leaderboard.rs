//! Leaderboard output rows.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Round;

/// Which predictions a leaderboard covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Scope {
    Round { round: Round },
    Overall,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Round { round } => write!(f, "GW {} Leaderboard", round),
            Scope::Overall => write!(f, "Overall Leaderboard"),
        }
    }
}

/// One ranked line of a leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    /// 1-based position after sorting
    pub position: u32,
    pub name: String,
    pub handle: String,
    pub points: u32,
    /// Picks that hit the exact score
    pub exact_scores: u32,
    /// Picks that got only the outcome right
    pub correct_results: u32,
}

/// A ranked table, rebuilt from scratch on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub title: String,
    pub scope: Scope,
    pub rows: Vec<LeaderboardRow>,
}

impl Leaderboard {
    pub fn new(scope: Scope, rows: Vec<LeaderboardRow>) -> Self {
        Self {
            title: scope.to_string(),
            scope,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for Leaderboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        if self.rows.is_empty() {
            return writeln!(f, "No data yet.");
        }
        writeln!(f, "{:>4}  {:<24} {:<20} {:>5}", "Rank", "Name", "Handle", "Pts")?;
        for row in &self.rows {
            writeln!(
                f,
                "{:>4}  {:<24} {:<20} {:>5}",
                row.position, row.name, row.handle, row.points
            )?;
        }
        Ok(())
    }
}
