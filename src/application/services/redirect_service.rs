//! Redirect resolution service.
//!
//! Implements the hot-path state machine behind `GET /{code}`:
//!
//! ```text
//! CACHE_LOOKUP  -- hit --------------------------> redirect (no click recorded)
//!    | miss or cache error
//! STORE_LOOKUP  -- absent -----------------------> NotFound
//!    |          -- expired ----------------------> Gone (no click recorded)
//!    | valid
//! ACCOUNT_CLICK (atomic increment + last_click)
//!    |
//! CACHE_REPOPULATE (best-effort, failure ignored)
//!    |
//! redirect
//! ```
//!
//! Cache hits deliberately skip click accounting: hot links undercount
//! while cached, and the store re-synchronizes on the next miss once the
//! entry's TTL lapses. For the same reason a cached entry can outlive its
//! record's expiration or an update by up to the cache TTL; that staleness
//! window is bounded and accepted.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Service resolving short codes to destination URLs.
pub struct RedirectService {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    cache_ttl_seconds: u64,
}

impl RedirectService {
    /// Creates a new redirect service.
    pub fn new(
        links: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        cache_ttl_seconds: u64,
    ) -> Self {
        Self {
            links,
            cache,
            cache_ttl_seconds,
        }
    }

    /// Resolves a short code to its destination URL, recording the click.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if no link has this code
    /// - [`AppError::Gone`] if the link exists but `expires_at` has passed
    /// - [`AppError::Internal`] on store errors
    ///
    /// Cache failures never surface here; a broken cache only changes
    /// latency and which path records the click.
    pub async fn resolve(&self, short_code: &str) -> Result<String, AppError> {
        match self.cache.get_url(short_code).await {
            Ok(Some(url)) => {
                debug!(short_code, "Serving redirect from cache");
                return Ok(url);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(short_code, error = %e, "Cache lookup failed, falling back to store");
            }
        }

        let link = self
            .links
            .find_by_code(short_code)
            .await?
            .ok_or_else(|| {
                AppError::not_found("link not found", json!({ "short_code": short_code }))
            })?;

        let now = Utc::now();
        if link.is_expired_at(now) {
            return Err(AppError::gone(
                "link has expired",
                json!({ "short_code": short_code, "expired_at": link.expires_at }),
            ));
        }

        self.links.record_click(link.id, now).await?;

        if let Err(e) = self
            .cache
            .set_url(short_code, &link.original_url, Some(self.cache_ttl_seconds))
            .await
        {
            warn!(short_code, error = %e, "Cache repopulation failed, skipping");
        }

        Ok(link.original_url)
    }
}
