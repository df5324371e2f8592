use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::{parse_key, ApiError};
use crate::calculate::{
    aggregate_player_stats, get_team_stats, head_to_head_stats, teammate_frequency,
    TracingDiagnostics,
};
use crate::models::{
    HeadToHeadEntry, PlayerAggregateStats, StatKey, TeamStats, TeammateFrequencyEntry,
};
use crate::storage;

// ── Player Aggregates ───────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PlayerStatsResponse {
    pub players: Vec<PlayerAggregateStats>,
    pub total_matches: u32,
}

pub async fn player_stats(
    State(state): State<AppState>,
) -> Result<Json<PlayerStatsResponse>, ApiError> {
    let matches = storage::read_matches(&state.storage)?;
    let window = state.config.stats.recent_form_window;

    let players = aggregate_player_stats(&matches)
        .into_iter()
        .map(|p| p.with_recent_form_window(window))
        .collect();

    Ok(Json(PlayerStatsResponse {
        players,
        total_matches: matches.iter().filter(|m| m.finished).count() as u32,
    }))
}

// ── Relational Stats ────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HeadToHeadResponse {
    pub player: StatKey,
    pub opponents: Vec<HeadToHeadEntry>,
}

pub async fn head_to_head(
    State(state): State<AppState>,
    Path((record_type, id)): Path<(String, u64)>,
) -> Result<Json<HeadToHeadResponse>, ApiError> {
    let player = parse_key(&record_type, id)?;
    let matches = storage::read_matches_for_player(&state.storage, &player)?;

    Ok(Json(HeadToHeadResponse {
        player,
        opponents: head_to_head_stats(&matches, &player, &TracingDiagnostics),
    }))
}

#[derive(Debug, Serialize)]
pub struct TeammatesResponse {
    pub player: StatKey,
    pub teammates: Vec<TeammateFrequencyEntry>,
}

pub async fn teammates(
    State(state): State<AppState>,
    Path((record_type, id)): Path<(String, u64)>,
) -> Result<Json<TeammatesResponse>, ApiError> {
    let player = parse_key(&record_type, id)?;
    let matches = storage::read_matches_for_player(&state.storage, &player)?;

    Ok(Json(TeammatesResponse {
        player,
        teammates: teammate_frequency(&matches, &player, &TracingDiagnostics),
    }))
}

#[derive(Debug, Serialize)]
pub struct TeamStatsResponse {
    pub player: StatKey,
    #[serde(flatten)]
    pub stats: TeamStats,
}

pub async fn teams(
    State(state): State<AppState>,
    Path((record_type, id)): Path<(String, u64)>,
) -> Result<Json<TeamStatsResponse>, ApiError> {
    let player = parse_key(&record_type, id)?;
    let matches = storage::read_matches_for_player(&state.storage, &player)?;

    Ok(Json(TeamStatsResponse {
        player,
        stats: get_team_stats(&matches, &player, &TracingDiagnostics),
    }))
}
