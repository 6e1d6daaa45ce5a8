//! Application error taxonomy and HTTP mapping.
//!
//! Every failure a caller can observe maps to a stable status code and a
//! structured JSON body; internal detail never leaks past [`AppError`].
//! Cache failures are absorbed at the cache boundary and never reach this
//! type (see [`crate::infrastructure::cache`]).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error payload returned to API clients.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Application-level error with a stable HTTP mapping.
///
/// - `Validation` → 422 (malformed URL, bad alias, bad query parameter)
/// - `NotFound` → 404 (entity absent, or present but owned by someone else)
/// - `Gone` → 410 (link exists but has expired)
/// - `Conflict` → 400 (requested alias already taken)
/// - `Unauthorized` → 401 (missing/invalid bearer token)
/// - `Internal` → 500 (store errors, code allocation exhausted)
#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    NotFound { message: String, details: Value },
    Gone { message: String, details: Value },
    Conflict { message: String, details: Value },
    Unauthorized { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn validation(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn gone(message: impl Into<String>, details: Value) -> Self {
        Self::Gone {
            message: message.into(),
            details,
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }

    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    fn parts(self) -> (StatusCode, &'static str, String, Value) {
        match self {
            AppError::Validation { message, details } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                message,
                details,
            ),
            AppError::NotFound { message, details } => {
                (StatusCode::NOT_FOUND, "not_found", message, details)
            }
            AppError::Gone { message, details } => (StatusCode::GONE, "gone", message, details),
            AppError::Conflict { message, details } => {
                (StatusCode::BAD_REQUEST, "conflict", message, details)
            }
            AppError::Unauthorized { message, details } => {
                (StatusCode::UNAUTHORIZED, "unauthorized", message, details)
            }
            AppError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                details,
            ),
        }
    }

    /// Converts into the serializable payload without consuming the error.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, message, details) = match self {
            AppError::Validation { message, details } => ("validation_error", message, details),
            AppError::NotFound { message, details } => ("not_found", message, details),
            AppError::Gone { message, details } => ("gone", message, details),
            AppError::Conflict { message, details } => ("conflict", message, details),
            AppError::Unauthorized { message, details } => ("unauthorized", message, details),
            AppError::Internal { message, details } => ("internal_error", message, details),
        };

        ErrorInfo {
            code,
            message: message.clone(),
            details: details.clone(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Gone { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::Unauthorized { message, .. }
            | AppError::Internal { message, .. } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::validation(
            "Request validation failed",
            serde_json::to_value(&errors).unwrap_or_else(|_| json!({})),
        )
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

/// Maps sqlx errors to the application taxonomy.
///
/// A unique violation on `links_short_code_key` is the authoritative signal
/// that a short code is already taken; everything else is internal.
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() && db.constraint() == Some("links_short_code_key") {
            return AppError::conflict(
                "Custom alias already taken",
                json!({ "constraint": "links_short_code_key" }),
            );
        }
        if db.is_unique_violation() {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }
    }

    tracing::error!(error = %e, "Database error");
    AppError::internal("Database error", json!({}))
}
