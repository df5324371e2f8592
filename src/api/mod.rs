//! REST API endpoints.
//!
//! Axum-based read-only HTTP API serving derived statistics over the stored
//! match history. Every request re-reads the store and recomputes.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::models::{KeyParseError, StatKey};
use crate::storage::StorageError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<KeyParseError> for ApiError {
    fn from(e: KeyParseError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Build a stat key from `/:record_type/:id` path segments.
pub fn parse_key(record_type: &str, id: u64) -> Result<StatKey, ApiError> {
    Ok(StatKey::new(record_type.parse()?, id))
}

fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::new().allow_origin(AllowOrigin::any());
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new().allow_origin(AllowOrigin::exact(value)),
        Err(e) => {
            warn!("Invalid CORS origin {:?} ({}); allowing any", origin, e);
            CorsLayer::new().allow_origin(AllowOrigin::any())
        }
    }
}

/// Assemble the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/players/stats", get(routes::players::player_stats))
        .route(
            "/api/players/:record_type/:id/head-to-head",
            get(routes::players::head_to_head),
        )
        .route(
            "/api/players/:record_type/:id/teammates",
            get(routes::players::teammates),
        )
        .route(
            "/api/players/:record_type/:id/teams",
            get(routes::players::teams),
        )
        .route(
            "/api/games/:record_type/:id/scoresheets",
            get(routes::games::scoresheets),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
