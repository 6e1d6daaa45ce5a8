//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Redis cache for fast redirect lookups.
///
/// Uses `ConnectionManager` for connection reuse. All operations are
/// fail-open and bounded by a short per-call timeout: a Redis outage or a
/// hung connection degrades to cache misses instead of slow or failed
/// responses.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: u64,
    op_timeout: Duration,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis, validates the connection with a PING, and
    /// configures the default TTL and per-operation timeout.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails.
    pub async fn connect(
        redis_url: &str,
        default_ttl_seconds: u64,
        op_timeout_ms: u64,
    ) -> CacheResult<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_seconds,
            op_timeout: Duration::from_millis(op_timeout_ms),
            key_prefix: "url:".to_string(),
        })
    }

    fn build_key(&self, short_code: &str) -> String {
        format!("{}{}", self.key_prefix, short_code)
    }

    /// Runs a cache operation under the configured timeout.
    ///
    /// An elapsed timeout is reported as an operation error so callers see
    /// the same degraded result as for any other cache failure.
    async fn bounded<T, F>(&self, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, redis::RedisError>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CacheError::OperationError(e.to_string())),
            Err(_) => Err(CacheError::OperationError(format!(
                "timed out after {:?}",
                self.op_timeout
            ))),
        }
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        match self.bounded(conn.get::<_, Option<String>>(key)).await {
            Ok(Some(url)) => {
                debug!(short_code, "Cache HIT");
                Ok(Some(url))
            }
            Ok(None) => {
                debug!(short_code, "Cache MISS");
                Ok(None)
            }
            Err(e) => {
                warn!(short_code, error = %e, "Redis GET failed, treating as miss");
                Ok(None)
            }
        }
    }

    async fn set_url(
        &self,
        short_code: &str,
        original_url: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();
        let ttl = ttl_seconds.unwrap_or(self.default_ttl);

        match self
            .bounded(conn.set_ex::<_, _, ()>(key, original_url, ttl))
            .await
        {
            Ok(()) => {
                debug!(short_code, ttl, "Cache SET");
                Ok(())
            }
            Err(e) => {
                warn!(short_code, error = %e, "Redis SET failed, skipping");
                Ok(())
            }
        }
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        match self.bounded(conn.del::<_, i32>(key)).await {
            Ok(deleted) => {
                if deleted > 0 {
                    debug!(short_code, "Cache INVALIDATE");
                }
                Ok(())
            }
            Err(e) => {
                warn!(short_code, error = %e, "Redis DEL failed, skipping");
                Ok(())
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        self.bounded(conn.ping::<()>()).await.is_ok()
    }
}
