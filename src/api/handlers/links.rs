//! Handlers for link mutation endpoints (update, delete).

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::{LinkResponse, UpdateLinkRequest};
use crate::api::middleware::CurrentOwner;
use crate::error::AppError;
use crate::state::AppState;

/// Replaces the destination URL of a caller-owned link.
///
/// # Endpoint
///
/// `PUT /links/{code}`
///
/// The cache entry is refreshed so the next redirect uses the new
/// destination without waiting for TTL expiry.
///
/// # Errors
///
/// - 404 if the link doesn't exist or belongs to another owner
///   (indistinguishable by design)
/// - 422 if the new URL is malformed
pub async fn update_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .update_link(&code, payload.original_url, owner_id)
        .await?;

    Ok(Json(link.into()))
}

/// Deletes a caller-owned link.
///
/// # Endpoint
///
/// `DELETE /links/{code}`
///
/// The cache entry is invalidated best-effort; redirects within the cache
/// TTL may still resolve until the entry lapses if invalidation fails.
///
/// # Errors
///
/// - 404 if the link doesn't exist or belongs to another owner
pub async fn delete_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
) -> Result<StatusCode, AppError> {
    state.link_service.delete_link(&code, owner_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
