//! Core data models: normalized match records and derived statistics.

mod ids;
mod player_match;
mod stats;

pub use ids::*;
pub use player_match::*;
pub use stats::*;
