//! Health check handler.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub cache_healthy: bool,
}

/// Reports service liveness and cache reachability.
///
/// # Endpoint
///
/// `GET /health` (public)
///
/// An unhealthy cache does not degrade the overall status: redirects keep
/// working against the store alone.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        cache_healthy: state.cache.health_check().await,
    })
}
