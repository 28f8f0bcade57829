//! Leaderboard aggregation.
//!
//! Groups prediction records by user, scores every pick against its round's
//! results and ranks the totals. Nothing here fails: missing rounds, missing
//! results and blank picks all contribute zero.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::models::{
    FixtureId, Leaderboard, LeaderboardRow, MatchResult, Pick, PredictionRecord, Round, Scope,
    UserKey,
};

use super::{PickOutcome, ScoringPolicy};

/// Running totals for one record or one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub points: u32,
    pub exact_scores: u32,
    pub correct_results: u32,
}

impl Tally {
    fn add_pick(&mut self, outcome: PickOutcome, points: u32) {
        self.points += points;
        match outcome {
            PickOutcome::ExactScore => self.exact_scores += 1,
            PickOutcome::CorrectResult => self.correct_results += 1,
            PickOutcome::Miss | PickOutcome::Unscored => {}
        }
    }

    fn merge(&mut self, other: Tally) {
        self.points += other.points;
        self.exact_scores += other.exact_scores;
        self.correct_results += other.correct_results;
    }
}

/// Results of one round, addressable by position and by fixture id.
struct RoundResults<'a> {
    ordered: &'a [MatchResult],
    by_id: HashMap<FixtureId, &'a MatchResult>,
}

impl<'a> RoundResults<'a> {
    fn new(ordered: &'a [MatchResult]) -> Self {
        let by_id = ordered.iter().map(|m| (m.fixture_id, m)).collect();
        Self { ordered, by_id }
    }

    /// Picks naming a fixture are matched by id, others by position.
    fn result_for(&self, index: usize, pick: &Pick) -> Option<&'a MatchResult> {
        match pick.fixture_id {
            Some(id) => self.by_id.get(&id).copied(),
            None => self.ordered.get(index),
        }
    }
}

/// Score every pick of one record against its round's results.
pub fn score_record(
    record: &PredictionRecord,
    results: &[MatchResult],
    policy: &ScoringPolicy,
) -> Tally {
    tally_record(record, &RoundResults::new(results), policy)
}

fn tally_record(
    record: &PredictionRecord,
    results: &RoundResults<'_>,
    policy: &ScoringPolicy,
) -> Tally {
    let mut tally = Tally::default();
    let mut scored: HashSet<FixtureId> = HashSet::new();
    for (index, pick) in record.picks.iter().enumerate() {
        let Some(result) = results.result_for(index, pick) else {
            continue;
        };
        // A fixture counts once per record; later picks for it are ignored.
        if !scored.insert(result.fixture_id) {
            continue;
        }
        let (outcome, points) = policy.score_pick(pick, result);
        tally.add_pick(outcome, points);
    }
    tally
}

/// Whose name and handle represent a merged user: the latest round wins,
/// then the alphabetically first name.
fn represents(candidate: &PredictionRecord, current: &PredictionRecord) -> bool {
    candidate
        .round
        .cmp(&current.round)
        .then_with(|| current.name.cmp(&candidate.name))
        .then_with(|| current.handle.cmp(&candidate.handle))
        == Ordering::Greater
}

struct UserTotal<'a> {
    display: &'a PredictionRecord,
    tally: Tally,
}

/// Aggregate prediction records into a ranked leaderboard.
///
/// In [`Scope::Round`] mode only records for that round are considered; in
/// [`Scope::Overall`] mode every record is scored against its own round.
/// Every record's points are added to its user's total. A round missing
/// from `results_by_round` scores zero.
pub fn aggregate(
    records: &[PredictionRecord],
    results_by_round: &HashMap<Round, Vec<MatchResult>>,
    scope: Scope,
    policy: &ScoringPolicy,
) -> Leaderboard {
    let rounds: HashMap<Round, RoundResults<'_>> = results_by_round
        .iter()
        .map(|(round, results)| (*round, RoundResults::new(results)))
        .collect();
    let empty = RoundResults::new(&[]);

    let mut users: HashMap<UserKey, UserTotal<'_>> = HashMap::new();
    for record in records {
        if let Scope::Round { round } = scope {
            if record.round != round {
                continue;
            }
        }
        let results = rounds.get(&record.round).unwrap_or(&empty);
        let tally = tally_record(record, results, policy);

        let total = users.entry(record.user_key()).or_insert(UserTotal {
            display: record,
            tally: Tally::default(),
        });
        total.tally.merge(tally);
        if represents(record, total.display) {
            total.display = record;
        }
    }

    let mut totals: Vec<UserTotal<'_>> = users.into_values().collect();
    totals.sort_by(|a, b| {
        b.tally
            .points
            .cmp(&a.tally.points)
            .then_with(|| a.display.name.cmp(&b.display.name))
            .then_with(|| a.display.handle.cmp(&b.display.handle))
    });

    let rows = totals
        .into_iter()
        .enumerate()
        .map(|(i, total)| LeaderboardRow {
            position: u32::try_from(i + 1).unwrap_or(u32::MAX),
            name: total.display.name.clone(),
            handle: total.display.handle.clone(),
            points: total.tally.points,
            exact_scores: total.tally.exact_scores,
            correct_results: total.tally.correct_results,
        })
        .collect();

    Leaderboard::new(scope, rows)
}

/// Leaderboard for a single round scored against that round's results.
pub fn aggregate_round(
    records: &[PredictionRecord],
    round: Round,
    results: &[MatchResult],
    policy: &ScoringPolicy,
) -> Leaderboard {
    let results_by_round = HashMap::from([(round, results.to_vec())]);
    aggregate(records, &results_by_round, Scope::Round { round }, policy)
}

/// Leaderboard across every round, merged per user.
pub fn aggregate_overall(
    records: &[PredictionRecord],
    results_by_round: &HashMap<Round, Vec<MatchResult>>,
    policy: &ScoringPolicy,
) -> Leaderboard {
    aggregate(records, results_by_round, Scope::Overall, policy)
}
