//! Link management route configuration.
//!
//! All routes here are nested under `/links`. Authentication is enforced
//! per-handler via extractors: every endpoint requires a bearer identity
//! except creation, where it is optional.

use crate::api::handlers::{
    cleanup_handler, delete_link_handler, expired_links_handler, search_handler, shorten_handler,
    stats_handler, update_link_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Link management routes.
///
/// # Endpoints
///
/// - `POST   /shorten`        - Create a short link (auth optional)
/// - `GET    /expired`        - List the caller's expired links
/// - `DELETE /cleanup`        - Delete the caller's stale links
/// - `GET    /search`         - Find the caller's link by destination URL
/// - `PUT    /{code}`         - Replace a link's destination
/// - `DELETE /{code}`         - Delete a link
/// - `GET    /{code}/stats`   - Click statistics for a link
///
/// Static segments (`shorten`, `expired`, `cleanup`, `search`) take
/// priority over the `{code}` capture, so those words cannot be reached as
/// short codes here; the allocator reserves them as aliases too.
pub fn link_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/expired", get(expired_links_handler))
        .route("/cleanup", delete(cleanup_handler))
        .route("/search", get(search_handler))
        .route(
            "/{code}",
            put(update_link_handler).delete(delete_link_handler),
        )
        .route("/{code}/stats", get(stats_handler))
}
