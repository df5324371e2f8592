//! Statistics calculation engine.
//!
//! Folds a player's match history into derived metrics:
//! - Per-player aggregates (win rates, placements, streaks, per-game stats)
//! - Head-to-head records against each opponent
//! - Teammate frequency and team-game performance
//! - Per-scoresheet and per-round score breakdowns
//!
//! All functions are pure: they take the full match list, skip unfinished
//! matches, and return fresh structures.

mod diagnostics;
mod head_to_head;
mod player;
mod scoresheet;
mod team;
mod teammates;

pub use diagnostics::*;
pub use head_to_head::head_to_head_stats;
pub use player::aggregate_player_stats;
pub use scoresheet::scoresheet_stats;
pub use team::get_team_stats;
pub use teammates::teammate_frequency;

use std::cmp::Ordering;

use crate::models::{GameRef, PlayerMatch, RecordType, StatKey, WinCondition};

/// Game a match's statistics are attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameIdentity {
    pub key: StatKey,
    pub id: u64,
    pub record_type: RecordType,
}

/// Resolve the game bucket for a match.
///
/// A shared match whose game has been linked to a local original counts
/// toward that original game, so both record spaces merge into one bucket.
pub fn resolve_game_identity(m: &PlayerMatch) -> GameIdentity {
    let (record_type, id) = match (m.record_type, m.linked_game_id) {
        (RecordType::Shared, Some(linked)) => (RecordType::Original, linked),
        (record_type, _) => (record_type, m.game_id),
    };

    GameIdentity {
        key: StatKey::new(record_type, id),
        id,
        record_type,
    }
}

/// Resolved identity with the match's display fields attached.
pub fn game_ref(m: &PlayerMatch) -> GameRef {
    let identity = resolve_game_identity(m);
    GameRef {
        key: identity.key,
        id: identity.id,
        record_type: identity.record_type,
        name: m.game_name.clone(),
        image: m.game_image.clone(),
    }
}

/// Win rate as a fraction (0.0 to 1.0).
pub fn calculate_win_rate(wins: u32, plays: u32) -> f64 {
    if plays == 0 {
        0.0
    } else {
        wins as f64 / plays as f64
    }
}

pub fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Best/worst score tracker that follows the win condition.
///
/// Highest Score keeps max as best; Lowest Score keeps min as best; any other
/// condition clears both, since its scores carry no ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBounds {
    pub best: Option<f64>,
    pub worst: Option<f64>,
}

impl ScoreBounds {
    pub fn record(&mut self, condition: WinCondition, score: Option<f64>) {
        if !condition.ranks_scores() {
            self.best = None;
            self.worst = None;
            return;
        }
        let Some(score) = score else {
            return;
        };

        self.best = match self.best {
            Some(best) if condition.is_better(best, score) != Some(false) => Some(best),
            _ => Some(score),
        };
        self.worst = match self.worst {
            Some(worst) if condition.is_better(score, worst) != Some(false) => Some(worst),
            _ => Some(score),
        };
    }
}

/// Descending by plays, then descending by win rate.
pub(crate) fn by_plays_then_win_rate(
    a_plays: u32,
    a_rate: f64,
    b_plays: u32,
    b_rate: f64,
) -> Ordering {
    b_plays
        .cmp(&a_plays)
        .then_with(|| b_rate.partial_cmp(&a_rate).unwrap_or(Ordering::Equal))
}
