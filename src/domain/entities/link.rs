//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL link with click accounting metadata.
///
/// `short_code` is immutable after creation; `click_count` and `last_click`
/// are only ever written together by a single atomic store update.
/// `owner_id` is the opaque principal that created the link; `None` means
/// the link was created anonymously and cannot be mutated afterwards.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Link {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_count: i64,
    pub last_click: Option<DateTime<Utc>>,
    pub owner_id: Option<i64>,
}

impl Link {
    /// Returns true if the link has passed its expiry time at `now`.
    ///
    /// Expiration is a derived predicate, not a stored state: the record
    /// stays in the store until explicitly deleted or cleaned up.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| e < now)
    }

    /// Returns true if `owner` may mutate or inspect this link.
    ///
    /// Ownerless links never match: anonymous links are write-locked after
    /// creation.
    pub fn is_owned_by(&self, owner: i64) -> bool {
        self.owner_id == Some(owner)
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub short_code: String,
    pub original_url: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub owner_id: Option<i64>,
}
