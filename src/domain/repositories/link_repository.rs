//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for the link store, the single source of truth for
/// link metadata, click counters and ownership.
///
/// Single-record operations are transactionally atomic; the multi-record
/// queries (`find_expired_for_owner`, `find_stale`) are read-only snapshots
/// with no consistency guarantee against concurrent writes.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code already exists; the
    /// store's unique constraint is the authoritative conflict detector, so
    /// concurrent creates of the same code cannot both succeed.
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError>;

    /// Finds a link by its exact original URL, scoped to one owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_original_url(
        &self,
        original_url: &str,
        owner_id: i64,
    ) -> Result<Option<Link>, AppError>;

    /// Records one click against a link.
    ///
    /// Increments `click_count` and sets `last_click = now` in a single
    /// atomic statement; N concurrent calls increment by exactly N.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn record_click(&self, id: i64, now: DateTime<Utc>) -> Result<(), AppError>;

    /// Replaces the destination URL of a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches `id`.
    /// Returns [`AppError::Internal`] on database errors.
    async fn update_url(&self, id: i64, original_url: &str) -> Result<Link, AppError>;

    /// Deletes a link record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Lists an owner's links whose `expires_at` is set and in the past.
    ///
    /// Expired records are not removed automatically; this is how they are
    /// surfaced for inspection or cleanup.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_expired_for_owner(
        &self,
        owner_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Link>, AppError>;

    /// Lists an owner's links never clicked or not clicked since `cutoff`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_stale(
        &self,
        owner_id: i64,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Link>, AppError>;
}
