//! Handlers for link maintenance endpoints (expired listing, cleanup).

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::api::dto::LinkResponse;
use crate::api::middleware::CurrentOwner;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the caller's expired links.
///
/// # Endpoint
///
/// `GET /links/expired`
///
/// Expired records are not deleted automatically; this endpoint surfaces
/// them for inspection or explicit removal. Results are scoped to the
/// caller.
pub async fn expired_links_handler(
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
) -> Result<Json<Vec<LinkResponse>>, AppError> {
    let links = state.link_service.list_expired(owner_id).await?;

    Ok(Json(links.into_iter().map(LinkResponse::from).collect()))
}

#[derive(Debug, Deserialize)]
pub struct CleanupParams {
    pub days: i64,
}

/// Deletes the caller's links not clicked within the last `days` days.
///
/// # Endpoint
///
/// `DELETE /links/cleanup?days=30`
///
/// Links that were never clicked count as stale. Each deletion invalidates
/// its cache entry best-effort; a cache failure does not stop the sweep.
///
/// # Errors
///
/// - 422 if `days` is not a positive integer
pub async fn cleanup_handler(
    Query(params): Query<CleanupParams>,
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
) -> Result<StatusCode, AppError> {
    state.link_service.cleanup(params.days, owner_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
