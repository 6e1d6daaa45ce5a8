//! Authentication service resolving bearer tokens to owner identities.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::repositories::TokenRepository;
use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Service resolving API bearer tokens to the opaque owner identity the
/// core operates on.
///
/// Tokens are hashed with HMAC-SHA256 (keyed by `signing_secret`) before
/// storage and comparison, so read-only database access is not enough to
/// verify or forge a token.
pub struct AuthService {
    tokens: Arc<dyn TokenRepository>,
    signing_secret: String,
}

impl AuthService {
    /// Creates a new authentication service.
    ///
    /// `signing_secret` must match the value used when tokens were issued.
    pub fn new(tokens: Arc<dyn TokenRepository>, signing_secret: String) -> Self {
        Self {
            tokens,
            signing_secret,
        }
    }

    /// Hashes a raw token with HMAC-SHA256 using the server signing secret.
    ///
    /// Returns a 64-character lowercase hex-encoded MAC.
    pub fn hash_token(&self, token: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(token.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Resolves a raw token to its owner id.
    ///
    /// On success, updates the token's `last_used_at` timestamp best-effort.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is unknown or
    /// revoked; [`AppError::Internal`] on database errors.
    pub async fn authenticate(&self, token: &str) -> Result<i64, AppError> {
        let token_hash = self.hash_token(token);

        let owner_id = self
            .tokens
            .resolve_owner(&token_hash)
            .await?
            .ok_or_else(|| {
                AppError::unauthorized(
                    "Unauthorized",
                    json!({ "reason": "Invalid or revoked token" }),
                )
            })?;

        let _ = self.tokens.touch_last_used(&token_hash).await;

        Ok(owner_id)
    }
}
