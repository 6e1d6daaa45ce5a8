//! Bearer token authentication extractors.
//!
//! Owner identity comes from an `Authorization: Bearer <token>` header
//! resolved against stored token hashes. Credential issuance lives in the
//! admin CLI; handlers only ever see the resolved opaque owner id.

use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::{error::AppError, state::AppState};

/// Extractor for endpoints that require an authenticated owner.
///
/// Rejects with 401 before the handler runs when the header is missing,
/// malformed, or resolves to no live token.
pub struct CurrentOwner(pub i64);

impl FromRequestParts<AppState> for CurrentOwner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthBearer(token) = AuthBearer::from_request_parts(parts, &())
            .await
            .map_err(|_| {
                AppError::unauthorized(
                    "Unauthorized",
                    json!({ "reason": "Authorization header is missing or invalid" }),
                )
            })?;

        let owner_id = state.auth_service.authenticate(&token).await?;

        Ok(CurrentOwner(owner_id))
    }
}

/// Extractor for endpoints where authentication is optional.
///
/// No `Authorization` header yields an anonymous caller; a header that is
/// present but invalid still rejects with 401 rather than silently
/// downgrading to anonymous.
pub struct MaybeOwner(pub Option<i64>);

impl FromRequestParts<AppState> for MaybeOwner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(header::AUTHORIZATION) {
            return Ok(MaybeOwner(None));
        }

        let CurrentOwner(owner_id) = CurrentOwner::from_request_parts(parts, state).await?;

        Ok(MaybeOwner(Some(owner_id)))
    }
}
