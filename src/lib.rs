//! # Playstats
//!
//! Statistics for a board-game session tracker.
//!
//! ## Architecture
//!
//! - **models**: Match records and derived statistics types
//! - **calculate**: Aggregation engine (player stats, head-to-head, teams, scoresheets)
//! - **storage**: JSONL match store
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod models;
pub mod storage;

pub use models::*;
