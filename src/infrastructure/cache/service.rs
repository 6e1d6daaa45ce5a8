//! Cache service trait and error types.

use async_trait::async_trait;
use std::fmt;

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching short code → destination URL mappings.
///
/// The cache is a pure optimization: it is never authoritative, may be
/// absent or stale within its TTL, and its unavailability must never block
/// or corrupt a store operation. Production implementations absorb their own
/// failures (logged, degraded to a miss/no-op) so callers can treat every
/// error as a miss.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the destination URL for a short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(url))` on cache hit
    /// - `Ok(None)` on cache miss or absorbed error (fail-open)
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>>;

    /// Stores a URL mapping with a TTL, refreshing the TTL on every write.
    ///
    /// # Arguments
    ///
    /// - `ttl_seconds` - entry lifespan; `None` uses the implementation default
    ///
    /// # Errors
    ///
    /// Production implementations log failures and return `Ok(())` so a slow
    /// or dead cache cannot fail the surrounding request.
    async fn set_url(
        &self,
        short_code: &str,
        original_url: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Removes a cached mapping after a link is deleted or modified.
    async fn invalidate(&self, short_code: &str) -> CacheResult<()>;

    /// Checks if the cache backend is reachable.
    async fn health_check(&self) -> bool;
}
