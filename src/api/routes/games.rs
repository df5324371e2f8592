use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::{parse_key, ApiError};
use crate::calculate::scoresheet_stats;
use crate::models::{ScoresheetStats, StatKey};
use crate::storage;

#[derive(Debug, Serialize)]
pub struct ScoresheetsResponse {
    pub game: StatKey,
    pub scoresheets: Vec<ScoresheetStats>,
}

pub async fn scoresheets(
    State(state): State<AppState>,
    Path((record_type, id)): Path<(String, u64)>,
) -> Result<Json<ScoresheetsResponse>, ApiError> {
    let game = parse_key(&record_type, id)?;
    let matches = storage::read_matches(&state.storage)?;

    Ok(Json(ScoresheetsResponse {
        game,
        scoresheets: scoresheet_stats(&matches, &game),
    }))
}
