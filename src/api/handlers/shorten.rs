//! Handler for the link creation endpoint.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::{LinkResponse, ShortenRequest};
use crate::api::middleware::MaybeOwner;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /links/shorten`
///
/// Authentication is optional here: an anonymous caller gets an ownerless
/// link that can be redirected to but never updated, deleted or inspected.
/// A present-but-invalid bearer token is still rejected with 401.
///
/// # Request Body
///
/// ```json
/// {
///   "original_url": "https://example.com/some/long/path",
///   "custom_alias": "my-link",                 // optional
///   "expires_at": "2026-12-31T23:59:59Z"       // optional
/// }
/// ```
///
/// # Errors
///
/// - 422 if the URL or alias is malformed
/// - 400 if the requested alias is already taken
pub async fn shorten_handler(
    State(state): State<AppState>,
    MaybeOwner(owner_id): MaybeOwner,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_link(
            payload.original_url,
            payload.custom_alias,
            payload.expires_at,
            owner_id,
        )
        .await?;

    Ok(Json(link.into()))
}
