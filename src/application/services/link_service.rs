//! Link lifecycle service: create, update, delete, stats, search, cleanup.
//!
//! Every mutation writes the link store first and then best-effort
//! propagates to the resolution cache; a cache failure never rolls back or
//! fails the store operation.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::{info, warn};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_allocator::{generate_code, validate_custom_alias};
use crate::utils::url_normalizer::normalize_url;

/// Attempts at drawing a free random code before giving up.
const MAX_ALLOCATION_ATTEMPTS: usize = 5;

/// Service for managing the lifecycle of short links.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    cache_ttl_seconds: u64,
}

impl LinkService {
    /// Creates a new link service.
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

    /// Creates a short link, allocating a code via the requested alias or
    /// random generation.
    ///
    /// The pre-insert existence check on a requested alias is a fast path
    /// only; the store's unique constraint is the authoritative conflict
    /// detector, so a concurrent create of the same alias still fails with
    /// [`AppError::Conflict`].
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for a malformed URL or alias
    /// - [`AppError::Conflict`] if the requested alias is taken
    /// - [`AppError::Internal`] if random allocation exhausts its attempts
    pub async fn create_link(
        &self,
        original_url: String,
        custom_alias: Option<String>,
        expires_at: Option<DateTime<Utc>>,
        owner_id: Option<i64>,
    ) -> Result<Link, AppError> {
        let normalized_url = normalize_url(&original_url).map_err(|e| {
            AppError::validation("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        let short_code = self.allocate_code(custom_alias).await?;

        let link = self
            .links
            .create(NewLink {
                short_code,
                original_url: normalized_url,
                expires_at,
                owner_id,
            })
            .await?;

        info!(short_code = %link.short_code, owner_id = ?link.owner_id, "Link created");
        Ok(link)
    }

    /// Replaces the destination URL of a caller-owned link and refreshes
    /// the cache entry so the new destination takes effect immediately.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the link is absent or not the caller's
    /// - [`AppError::Validation`] for a malformed URL
    pub async fn update_link(
        &self,
        short_code: &str,
        new_url: String,
        caller: i64,
    ) -> Result<Link, AppError> {
        let link = self.fetch_owned(short_code, caller).await?;

        let normalized_url = normalize_url(&new_url).map_err(|e| {
            AppError::validation("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        let updated = self.links.update_url(link.id, &normalized_url).await?;

        if let Err(e) = self
            .cache
            .set_url(short_code, &updated.original_url, Some(self.cache_ttl_seconds))
            .await
        {
            warn!(short_code, error = %e, "Cache refresh after update failed, skipping");
        }

        Ok(updated)
    }

    /// Deletes a caller-owned link and invalidates its cache entry.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the link is absent or not the caller's
    pub async fn delete_link(&self, short_code: &str, caller: i64) -> Result<(), AppError> {
        let link = self.fetch_owned(short_code, caller).await?;

        self.links.delete(link.id).await?;

        if let Err(e) = self.cache.invalidate(short_code).await {
            warn!(short_code, error = %e, "Cache invalidation after delete failed, skipping");
        }

        info!(short_code, caller, "Link deleted");
        Ok(())
    }

    /// Returns the full record, click counters included, of a caller-owned
    /// link.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the link is absent or not the caller's
    pub async fn stats(&self, short_code: &str, caller: i64) -> Result<Link, AppError> {
        self.fetch_owned(short_code, caller).await
    }

    /// Finds the caller's link for an exact destination URL.
    ///
    /// The input is normalized the same way as at creation, so lookups are
    /// insensitive to host case, default ports and fragments.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the caller has no link for this URL
    /// - [`AppError::Validation`] for a malformed URL
    pub async fn search_by_url(&self, original_url: &str, caller: i64) -> Result<Link, AppError> {
        let normalized_url = normalize_url(original_url).map_err(|e| {
            AppError::validation("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        self.links
            .find_by_original_url(&normalized_url, caller)
            .await?
            .ok_or_else(|| {
                AppError::not_found("link not found", json!({ "original_url": normalized_url }))
            })
    }

    /// Lists the caller's links whose expiry has passed.
    ///
    /// Expired records are kept until explicitly deleted or cleaned up;
    /// this is how they are surfaced.
    pub async fn list_expired(&self, caller: i64) -> Result<Vec<Link>, AppError> {
        self.links.find_expired_for_owner(caller, Utc::now()).await
    }

    /// Deletes every caller-owned link not clicked within the last `days`
    /// days (or never clicked), invalidating each cache entry.
    ///
    /// Cache invalidation failures are logged and do not abort the
    /// remaining deletions. Returns the number of links deleted.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if `days` is not positive
    pub async fn cleanup(&self, days: i64, caller: i64) -> Result<usize, AppError> {
        if days <= 0 {
            return Err(AppError::validation(
                "days must be a positive integer",
                json!({ "days": days }),
            ));
        }

        let cutoff = Utc::now() - Duration::days(days);
        let stale = self.links.find_stale(caller, cutoff).await?;
        let mut deleted = 0;

        for link in stale {
            self.links.delete(link.id).await?;
            deleted += 1;

            if let Err(e) = self.cache.invalidate(&link.short_code).await {
                warn!(
                    short_code = %link.short_code,
                    error = %e,
                    "Cache invalidation during cleanup failed, continuing"
                );
            }
        }

        info!(caller, days, deleted, "Cleanup finished");
        Ok(deleted)
    }

    /// Fetches a link and enforces ownership.
    ///
    /// Absence and foreign ownership are deliberately indistinguishable so
    /// the API never reveals whether another owner's code exists. Ownerless
    /// links match no caller.
    async fn fetch_owned(&self, short_code: &str, caller: i64) -> Result<Link, AppError> {
        let not_found = || {
            AppError::not_found(
                "link not found or not yours",
                json!({ "short_code": short_code }),
            )
        };

        let link = self
            .links
            .find_by_code(short_code)
            .await?
            .ok_or_else(not_found)?;

        if !link.is_owned_by(caller) {
            return Err(not_found());
        }

        Ok(link)
    }

    /// Allocates a short code per the requested alias, or randomly.
    async fn allocate_code(&self, custom_alias: Option<String>) -> Result<String, AppError> {
        if let Some(alias) = custom_alias {
            validate_custom_alias(&alias)?;

            if self.links.find_by_code(&alias).await?.is_some() {
                return Err(AppError::conflict(
                    "Custom alias already taken",
                    json!({ "alias": alias }),
                ));
            }

            return Ok(alias);
        }

        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let code = generate_code();

            if self.links.find_by_code(&code).await?.is_none() {
                return Ok(code);
            }
        }

        Err(AppError::internal(
            "Failed to allocate a unique short code",
            json!({ "attempts": MAX_ALLOCATION_ATTEMPTS }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::infrastructure::cache::{CacheError, MockCacheService};

    const TTL: u64 = 3600;

    fn link(id: i64, code: &str, url: &str, owner_id: Option<i64>) -> Link {
        Link {
            id,
            short_code: code.to_string(),
            original_url: url.to_string(),
            created_at: Utc::now(),
            expires_at: None,
            click_count: 0,
            last_click: None,
            owner_id,
        }
    }

    fn service(repo: MockLinkRepository, cache: MockCacheService) -> LinkService {
        LinkService::new(Arc::new(repo), Arc::new(cache), TTL)
    }

    #[tokio::test]
    async fn test_create_with_custom_alias() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .withf(|code| code == "my-alias")
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_create()
            .withf(|new_link| new_link.short_code == "my-alias")
            .times(1)
            .returning(|n| {
                Ok(link(
                    1,
                    &n.short_code,
                    &n.original_url,
                    n.owner_id,
                ))
            });

        let svc = service(repo, MockCacheService::new());

        let created = svc
            .create_link(
                "https://example.com".to_string(),
                Some("my-alias".to_string()),
                None,
                Some(9),
            )
            .await
            .unwrap();

        assert_eq!(created.short_code, "my-alias");
        assert_eq!(created.owner_id, Some(9));
    }

    #[tokio::test]
    async fn test_create_alias_taken() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .times(1)
            .returning(|_| Ok(Some(link(5, "my-alias", "https://other.com/", Some(2)))));
        repo.expect_create().times(0);

        let svc = service(repo, MockCacheService::new());

        let err = svc
            .create_link(
                "https://example.com".to_string(),
                Some("my-alias".to_string()),
                None,
                Some(9),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_create_invalid_alias() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code().times(0);
        repo.expect_create().times(0);

        let svc = service(repo, MockCacheService::new());

        let err = svc
            .create_link(
                "https://example.com".to_string(),
                Some("a b".to_string()),
                None,
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_invalid_url() {
        let repo = MockLinkRepository::new();
        let svc = service(repo, MockCacheService::new());

        let err = svc
            .create_link("not-a-url".to_string(), None, None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_allocation_exhausted_after_five_collisions() {
        let mut repo = MockLinkRepository::new();
        // Every random draw collides with an existing code.
        repo.expect_find_by_code()
            .times(MAX_ALLOCATION_ATTEMPTS)
            .returning(|code| Ok(Some(link(1, code, "https://taken.com/", None))));
        repo.expect_create().times(0);

        let svc = service(repo, MockCacheService::new());

        let err = svc
            .create_link("https://example.com".to_string(), None, None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_create_generated_code_is_six_alphanumerics() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .withf(|code| code.len() == 6 && code.chars().all(|c| c.is_ascii_alphanumeric()))
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_create()
            .times(1)
            .returning(|n| Ok(link(1, &n.short_code, &n.original_url, n.owner_id)));

        let svc = service(repo, MockCacheService::new());

        assert!(
            svc.create_link("https://example.com".to_string(), None, None, None)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_update_by_owner_refreshes_cache() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .times(1)
            .returning(|_| Ok(Some(link(4, "abc123", "https://old.com/", Some(7)))));
        repo.expect_update_url()
            .withf(|id, url| *id == 4 && url == "https://new.com/")
            .times(1)
            .returning(|id, url| Ok(link(id, "abc123", url, Some(7))));

        let mut cache = MockCacheService::new();
        cache
            .expect_set_url()
            .withf(|code, url, _| code == "abc123" && url == "https://new.com/")
            .times(1)
            .returning(|_, _, _| Ok(()));

        let svc = service(repo, cache);

        let updated = svc
            .update_link("abc123", "https://new.com".to_string(), 7)
            .await
            .unwrap();

        assert_eq!(updated.original_url, "https://new.com/");
    }

    #[tokio::test]
    async fn test_update_by_non_owner_is_not_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .times(1)
            .returning(|_| Ok(Some(link(4, "abc123", "https://old.com/", Some(7)))));
        repo.expect_update_url().times(0);

        let svc = service(repo, MockCacheService::new());

        let err = svc
            .update_link("abc123", "https://new.com".to_string(), 8)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
        assert_eq!(err.to_string(), "link not found or not yours");
    }

    #[tokio::test]
    async fn test_ownerless_link_cannot_be_mutated() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .times(1)
            .returning(|_| Ok(Some(link(4, "abc123", "https://a.com/", None))));
        repo.expect_delete().times(0);

        let svc = service(repo, MockCacheService::new());

        let err = svc.delete_link("abc123", 7).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_invalidates_cache() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .times(1)
            .returning(|_| Ok(Some(link(4, "abc123", "https://a.com/", Some(7)))));
        repo.expect_delete()
            .withf(|id| *id == 4)
            .times(1)
            .returning(|_| Ok(()));

        let mut cache = MockCacheService::new();
        cache
            .expect_invalidate()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(|_| Ok(()));

        let svc = service(repo, cache);

        assert!(svc.delete_link("abc123", 7).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_succeeds_when_cache_invalidation_fails() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .times(1)
            .returning(|_| Ok(Some(link(4, "abc123", "https://a.com/", Some(7)))));
        repo.expect_delete().times(1).returning(|_| Ok(()));

        let mut cache = MockCacheService::new();
        cache
            .expect_invalidate()
            .times(1)
            .returning(|_| Err(CacheError::OperationError("down".into())));

        let svc = service(repo, cache);

        assert!(svc.delete_link("abc123", 7).await.is_ok());
    }

    #[tokio::test]
    async fn test_stats_for_missing_and_foreign_links_look_identical() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .withf(|code| code == "missing")
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_find_by_code()
            .withf(|code| code == "foreign")
            .times(1)
            .returning(|_| Ok(Some(link(4, "foreign", "https://a.com/", Some(99)))));

        let svc = service(repo, MockCacheService::new());

        let missing = svc.stats("missing", 7).await.unwrap_err();
        let foreign = svc.stats("foreign", 7).await.unwrap_err();

        assert_eq!(missing.to_string(), foreign.to_string());
        assert!(matches!(missing, AppError::NotFound { .. }));
        assert!(matches!(foreign, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_search_normalizes_before_lookup() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_original_url()
            .withf(|url, owner| url == "https://example.com/path" && *owner == 7)
            .times(1)
            .returning(|url, owner| Ok(Some(link(4, "abc123", url, Some(owner)))));

        let svc = service(repo, MockCacheService::new());

        let found = svc
            .search_by_url("HTTPS://EXAMPLE.COM:443/path", 7)
            .await
            .unwrap();

        assert_eq!(found.short_code, "abc123");
    }

    #[tokio::test]
    async fn test_search_miss_is_not_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_original_url()
            .times(1)
            .returning(|_, _| Ok(None));

        let svc = service(repo, MockCacheService::new());

        let err = svc.search_by_url("https://nope.com", 7).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_cleanup_rejects_non_positive_days() {
        let svc = service(MockLinkRepository::new(), MockCacheService::new());

        assert!(matches!(
            svc.cleanup(0, 7).await.unwrap_err(),
            AppError::Validation { .. }
        ));
        assert!(matches!(
            svc.cleanup(-3, 7).await.unwrap_err(),
            AppError::Validation { .. }
        ));
    }

    #[tokio::test]
    async fn test_cleanup_continues_past_cache_failures() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_stale()
            .withf(|owner, _| *owner == 7)
            .times(1)
            .returning(|_, _| {
                Ok(vec![
                    link(1, "stale1", "https://a.com/", Some(7)),
                    link(2, "stale2", "https://b.com/", Some(7)),
                ])
            });
        repo.expect_delete().times(2).returning(|_| Ok(()));

        let mut cache = MockCacheService::new();
        // First invalidation fails; the second link must still be deleted.
        cache
            .expect_invalidate()
            .times(2)
            .returning(|_| Err(CacheError::OperationError("down".into())));

        let svc = service(repo, cache);

        let deleted = svc.cleanup(30, 7).await.unwrap();
        assert_eq!(deleted, 2);
    }
}
