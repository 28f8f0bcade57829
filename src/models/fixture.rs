//! Fixtures and their real outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FixtureId, Round};

/// A fixture in a round together with whatever is known of its outcome.
///
/// Goals stay `None` until the match starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub fixture_id: FixtureId,

    pub round: Round,

    #[serde(default)]
    pub home_team: String,

    #[serde(default)]
    pub away_team: String,

    /// Scheduled kickoff, if announced
    #[serde(default)]
    pub kickoff: Option<DateTime<Utc>>,

    #[serde(default)]
    pub home_goals: Option<u32>,

    #[serde(default)]
    pub away_goals: Option<u32>,

    #[serde(default)]
    pub started: bool,

    /// Result is final/official
    #[serde(default)]
    pub finished: bool,
}

impl MatchResult {
    pub fn new(fixture_id: FixtureId, round: Round, home_team: &str, away_team: &str) -> Self {
        Self {
            fixture_id,
            round,
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            kickoff: None,
            home_goals: None,
            away_goals: None,
            started: false,
            finished: false,
        }
    }

    /// Builder method to set kickoff time.
    pub fn with_kickoff(mut self, kickoff: DateTime<Utc>) -> Self {
        self.kickoff = Some(kickoff);
        self
    }

    /// Builder method for an in-progress score.
    pub fn live(mut self, home: u32, away: u32) -> Self {
        self.home_goals = Some(home);
        self.away_goals = Some(away);
        self.started = true;
        self
    }

    /// Builder method for a final score.
    pub fn full_time(self, home: u32, away: u32) -> Self {
        let mut result = self.live(home, away);
        result.finished = true;
        result
    }

    /// A fixture no longer accepts predictions once it has started,
    /// finished, or its kickoff time has passed.
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        if self.started || self.finished {
            return true;
        }
        match self.kickoff {
            Some(kickoff) => kickoff <= now,
            None => false,
        }
    }

    /// Short score label for display: the final score, `LIVE`, or nothing.
    pub fn status_label(&self) -> Option<String> {
        match (self.home_goals, self.away_goals) {
            (Some(h), Some(a)) if self.finished => Some(format!("{}–{}", h, a)),
            _ if self.started => Some("LIVE".to_string()),
            _ => None,
        }
    }
}

/// An admin update to one fixture: a score, its status, and optionally the
/// fixture details when the fixture is new.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub fixture_id: FixtureId,

    #[serde(default)]
    pub home_team: Option<String>,

    #[serde(default)]
    pub away_team: Option<String>,

    #[serde(default)]
    pub kickoff: Option<DateTime<Utc>>,

    #[serde(default)]
    pub home_goals: Option<u32>,

    #[serde(default)]
    pub away_goals: Option<u32>,

    #[serde(default)]
    pub finished: bool,
}

impl ResultEntry {
    /// Apply this entry on top of the stored fixture, if there is one.
    ///
    /// Returns `None` for a new fixture that lacks team names. A fixture
    /// with a score counts as started.
    pub fn apply(self, round: Round, existing: Option<&MatchResult>) -> Option<MatchResult> {
        let mut result = match existing {
            Some(existing) => existing.clone(),
            None => MatchResult::new(
                self.fixture_id,
                round,
                self.home_team.as_deref()?,
                self.away_team.as_deref()?,
            ),
        };
        if let Some(home_team) = self.home_team {
            result.home_team = home_team;
        }
        if let Some(away_team) = self.away_team {
            result.away_team = away_team;
        }
        if self.kickoff.is_some() {
            result.kickoff = self.kickoff;
        }
        result.home_goals = self.home_goals;
        result.away_goals = self.away_goals;
        result.started = result.started || self.home_goals.is_some() || self.finished;
        result.finished = self.finished;
        Some(result)
    }
}

/// Pick the round that should be open for predictions: the lowest round
/// with an unfinished fixture, or the highest known round once everything
/// has finished.
pub fn current_round(matches: &[MatchResult]) -> Option<Round> {
    matches
        .iter()
        .filter(|m| !m.finished)
        .map(|m| m.round)
        .min()
        .or_else(|| matches.iter().map(|m| m.round).max())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 16, 12, 0, 0).unwrap()
    }

    fn fixture(id: u32, round: Round) -> MatchResult {
        MatchResult::new(FixtureId(id), round, "Arsenal", "Chelsea")
    }

    #[test]
    fn test_not_locked_before_kickoff() {
        let m = fixture(1, 1).with_kickoff(now() + Duration::hours(2));
        assert!(!m.is_locked(now()));
    }

    #[test]
    fn test_locked_at_kickoff() {
        let m = fixture(1, 1).with_kickoff(now());
        assert!(m.is_locked(now()));
    }

    #[test]
    fn test_locked_when_started_even_without_kickoff() {
        assert!(fixture(1, 1).live(0, 0).is_locked(now()));
        assert!(!fixture(1, 1).is_locked(now()));
    }

    #[test]
    fn test_locked_when_finished_despite_future_kickoff() {
        let mut m = fixture(1, 1).with_kickoff(now() + Duration::days(1));
        m.finished = true;
        assert!(m.is_locked(now()));
    }

    #[test]
    fn test_status_label() {
        assert_eq!(fixture(1, 1).full_time(2, 1).status_label().as_deref(), Some("2–1"));
        assert_eq!(fixture(1, 1).live(0, 0).status_label().as_deref(), Some("LIVE"));
        assert_eq!(fixture(1, 1).status_label(), None);
    }

    #[test]
    fn test_result_entry_updates_existing_fixture() {
        let existing = fixture(4, 2).with_kickoff(now());
        let entry = ResultEntry {
            fixture_id: FixtureId(4),
            home_goals: Some(1),
            away_goals: Some(0),
            ..ResultEntry::default()
        };

        let updated = entry.apply(2, Some(&existing)).unwrap();

        assert_eq!(updated.home_team, "Arsenal");
        assert_eq!(updated.kickoff, Some(now()));
        assert_eq!(updated.home_goals, Some(1));
        assert!(updated.started);
        assert!(!updated.finished);
    }

    #[test]
    fn test_result_entry_new_fixture_needs_teams() {
        let entry = ResultEntry {
            fixture_id: FixtureId(9),
            home_goals: Some(0),
            away_goals: Some(0),
            finished: true,
            ..ResultEntry::default()
        };
        assert!(entry.clone().apply(3, None).is_none());

        let entry = ResultEntry {
            home_team: Some("Leeds".to_string()),
            away_team: Some("Spurs".to_string()),
            ..entry
        };
        let created = entry.apply(3, None).unwrap();
        assert_eq!(created.round, 3);
        assert_eq!(created.status_label().as_deref(), Some("0–0"));
    }

    #[test]
    fn test_current_round_lowest_unfinished() {
        let matches = vec![
            fixture(1, 1).full_time(1, 0),
            fixture(2, 2).full_time(0, 0),
            fixture(3, 2),
            fixture(4, 3),
        ];
        assert_eq!(current_round(&matches), Some(2));
    }

    #[test]
    fn test_current_round_all_finished() {
        let matches = vec![fixture(1, 1).full_time(1, 0), fixture(2, 2).full_time(0, 0)];
        assert_eq!(current_round(&matches), Some(2));
    }

    #[test]
    fn test_current_round_empty() {
        assert_eq!(current_round(&[]), None);
    }
}
