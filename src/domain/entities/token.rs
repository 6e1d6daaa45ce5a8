//! API token entity.

use chrono::{DateTime, Utc};

/// An issued API token, stored as a keyed hash.
///
/// The raw token is shown once at issuance and never persisted; `owner_id`
/// is the opaque principal every authenticated request resolves to.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiToken {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ApiToken {
    /// Returns true if the token has been revoked.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}
