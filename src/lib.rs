//! # GW Predictor
//!
//! Score predictions for a gameweek-based football prediction league and
//! rank players per round and overall.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (picks, prediction records, results, leaderboards)
//! - **calculate**: Pick scoring and leaderboard aggregation
//! - **submission**: Validation of incoming predictions against fixture locks
//! - **source**: Backends holding predictions and results (local JSONL, spreadsheet web app)
//! - **standings**: Load-then-aggregate entry points over a source
//! - **storage**: Filesystem JSONL store used by the local source
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod models;
pub mod source;
pub mod standings;
pub mod storage;
pub mod submission;

pub use models::*;
