//! Derived statistics models.
//!
//! Every value here is recomputed from the match history on request and never
//! persisted.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MatchPlayer, PlayerMatch, RecordType, StatKey, WinCondition};

/// Outcome of a single match from one player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    Win,
    Loss,
}

impl MatchOutcome {
    pub fn from_winner(is_winner: bool) -> Self {
        if is_winner {
            MatchOutcome::Win
        } else {
            MatchOutcome::Loss
        }
    }
}

/// A run of consecutive same-outcome results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    #[serde(rename = "type")]
    pub kind: MatchOutcome,
    pub count: u32,
}

impl Streak {
    pub fn new(kind: MatchOutcome, count: u32) -> Self {
        Self { kind, count }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streaks {
    pub current: Streak,
    /// Longest win streak; loss runs never land here
    pub longest: Streak,
}

impl Default for Streaks {
    fn default() -> Self {
        Self {
            current: Streak::new(MatchOutcome::Win, 0),
            longest: Streak::new(MatchOutcome::Win, 0),
        }
    }
}

impl Streaks {
    /// Advance the streak state machine by one result.
    pub fn record(&mut self, outcome: MatchOutcome) {
        if self.current.kind == outcome {
            self.current.count += 1;
        } else {
            self.current = Streak::new(outcome, 1);
        }

        if self.current.kind == MatchOutcome::Win && self.current.count > self.longest.count {
            self.longest = self.current;
        }
    }
}

/// Lightweight player reference embedded in relational outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub key: StatKey,
    pub id: u64,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub name: String,
    pub image: Option<String>,
}

impl From<&MatchPlayer> for PlayerRef {
    fn from(p: &MatchPlayer) -> Self {
        Self {
            key: p.key(),
            id: p.id,
            record_type: p.record_type,
            name: p.name.clone(),
            image: p.image.clone(),
        }
    }
}

/// Game identity after linked-game resolution, with display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRef {
    pub key: StatKey,
    pub id: u64,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub name: String,
    pub image: Option<String>,
}

/// Compact description of a match for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub key: StatKey,
    pub name: String,
    pub date: DateTime<Utc>,
    pub game: GameRef,
    pub duration: u64,
    pub win_condition: WinCondition,
    pub location_name: Option<String>,
}

impl MatchSummary {
    pub fn new(m: &PlayerMatch, game: GameRef) -> Self {
        Self {
            key: m.key(),
            name: m.name.clone(),
            date: m.date,
            game,
            duration: m.duration,
            win_condition: m.scoresheet.win_condition,
            location_name: m.location_name.clone(),
        }
    }
}

/// Per-game statistics nested inside a player's aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub game: GameRef,
    pub plays: u32,
    pub wins: u32,
    pub win_rate: f64,
    pub best_score: Option<f64>,
    pub worst_score: Option<f64>,
    pub average_score: Option<f64>,
    /// Seconds
    pub playtime: u64,
    pub scores: Vec<f64>,
}

/// Running totals for one player across their finished matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAggregateStats {
    pub player: PlayerRef,
    pub is_user: bool,
    pub plays: u32,
    pub wins: u32,
    pub win_rate: f64,
    /// Placement number -> count
    pub placements: BTreeMap<u32, u32>,
    /// Seconds
    pub playtime: u64,
    pub streaks: Streaks,
    /// Chronological, most recent last
    pub recent_form: Vec<MatchOutcome>,
    pub game_stats: Vec<GameStats>,
}

impl PlayerAggregateStats {
    /// Keep only the last `window` results of `recent_form`.
    pub fn with_recent_form_window(mut self, window: usize) -> Self {
        let len = self.recent_form.len();
        if len > window {
            self.recent_form.drain(..len - window);
        }
        self
    }
}

/// Per-game slice of a head-to-head record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadToHeadGame {
    pub game: GameRef,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub matches: u32,
}

/// Record of the current player against a single opponent.
///
/// `wins + losses + ties` can be less than `matches` when a match gives no
/// winner flag and no comparable placements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadToHeadEntry {
    pub player: PlayerRef,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub matches: u32,
    pub games: Vec<HeadToHeadGame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeammateFrequencyEntry {
    pub player: PlayerRef,
    pub count: u32,
    /// Matches where both the current player and this teammate won
    pub wins: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMatch {
    pub team_name: String,
    #[serde(rename = "match")]
    pub match_summary: MatchSummary,
    pub result: MatchOutcome,
    pub players: Vec<PlayerRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub total_team_games: u32,
    pub team_wins: u32,
    pub team_win_rate: f64,
    pub team_matches: Vec<TeamMatch>,
}

/// Scoring breakdown for one round of a scoresheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundStats {
    pub round_id: u64,
    pub name: String,
    pub order: u32,
    pub count: u32,
    pub average_score: Option<f64>,
    pub best_score: Option<f64>,
    pub worst_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoresheetPlayerStats {
    pub player: PlayerRef,
    pub plays: u32,
    pub wins: u32,
    pub win_rate: f64,
    pub best_score: Option<f64>,
    pub worst_score: Option<f64>,
    pub average_score: Option<f64>,
}

/// Statistics for a game's plays under a single scoresheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoresheetStats {
    pub scoresheet_id: Option<u64>,
    pub name: String,
    pub win_condition: WinCondition,
    pub is_coop: bool,
    pub plays: u32,
    pub best_score: Option<f64>,
    pub worst_score: Option<f64>,
    pub average_score: Option<f64>,
    pub average_winning_score: Option<f64>,
    pub players: Vec<ScoresheetPlayerStats>,
    pub rounds: Vec<RoundStats>,
}
