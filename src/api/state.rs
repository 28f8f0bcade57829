use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::calculate::ScoringPolicy;
use crate::source::LeagueSource;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn LeagueSource>,
    pub scoring: ScoringPolicy,
    /// Clock used for fixture lock checks
    pub clock: fn() -> DateTime<Utc>,
}

impl AppState {
    pub fn new(source: Arc<dyn LeagueSource>, scoring: ScoringPolicy) -> Self {
        Self {
            source,
            scoring,
            clock: Utc::now,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}
