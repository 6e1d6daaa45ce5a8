//! Handlers for link inspection endpoints (stats, search).

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::dto::LinkResponse;
use crate::api::middleware::CurrentOwner;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the full record of a caller-owned link, click counters included.
///
/// # Endpoint
///
/// `GET /links/{code}/stats`
///
/// # Errors
///
/// - 404 if the link doesn't exist or belongs to another owner
pub async fn stats_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.stats(&code, owner_id).await?;

    Ok(Json(link.into()))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub original_url: String,
}

/// Finds the caller's link for an exact destination URL.
///
/// # Endpoint
///
/// `GET /links/search?original_url=https://example.com`
///
/// # Errors
///
/// - 404 if the caller has no link for this URL
/// - 422 if the URL is malformed
pub async fn search_handler(
    Query(params): Query<SearchParams>,
    State(state): State<AppState>,
    CurrentOwner(owner_id): CurrentOwner,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state
        .link_service
        .search_by_url(&params.original_url, owner_id)
        .await?;

    Ok(Json(link.into()))
}
