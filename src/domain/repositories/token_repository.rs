//! Repository trait for API token authentication.

use crate::domain::entities::ApiToken;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for API token storage.
///
/// Tokens are keyed-hashed before storage and lookup; the raw value never
/// reaches this layer.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTokenRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Resolves a token hash to the owning principal.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(owner_id))` if the token exists and is not revoked
    /// - `Ok(None)` otherwise
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn resolve_owner(&self, token_hash: &str) -> Result<Option<i64>, AppError>;

    /// Updates the `last_used_at` timestamp for a token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn touch_last_used(&self, token_hash: &str) -> Result<(), AppError>;

    /// Stores a new token hash for an owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the hash already exists.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create_token(
        &self,
        owner_id: i64,
        name: &str,
        token_hash: &str,
    ) -> Result<ApiToken, AppError>;

    /// Lists all issued tokens.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError>;

    /// Revokes a token by id, preventing further authentication.
    ///
    /// Returns `Ok(false)` if no token matched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn revoke_token(&self, id: i64) -> Result<bool, AppError>;
}
