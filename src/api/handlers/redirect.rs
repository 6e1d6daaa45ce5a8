//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its destination URL.
///
/// # Endpoint
///
/// `GET /{code}` (public, unauthenticated)
///
/// # Request Flow
///
/// The resolution state machine lives in
/// [`crate::application::services::RedirectService`]: cache lookup first,
/// store lookup on miss with atomic click accounting and best-effort cache
/// repopulation. Cache hits skip click accounting by design.
///
/// # Errors
///
/// - 404 if the short code doesn't exist
/// - 410 if the link exists but has expired
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let url = state.redirect_service.resolve(&code).await?;

    Ok(Redirect::temporary(&url))
}
