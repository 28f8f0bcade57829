//! Core data models for the prediction league.

mod fixture;
mod ids;
mod leaderboard;
mod prediction;

pub use fixture::*;
pub use ids::*;
pub use leaderboard::*;
pub use prediction::*;
