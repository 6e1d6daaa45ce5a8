//! HTTP server initialization and runtime setup.
//!
//! Handles database connection, migrations, cache setup and the Axum
//! server lifecycle.

use crate::application::services::{AuthService, LinkService, RedirectService};
use crate::config::Config;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::{PgLinkRepository, PgTokenRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool (connect retried with backoff)
/// - Migrations
/// - Redis cache, or `NullCache` fallback when Redis is unconfigured or
///   unreachable; a missing cache never blocks startup
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if the database stays unreachable, migrations fail, or
/// the listener cannot bind.
pub async fn run(config: Config) -> Result<()> {
    let retry_strategy = ExponentialBackoff::from_millis(200).map(jitter).take(5);

    let pool = Retry::spawn(retry_strategy, || {
        PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
            .connect(&config.database_url)
    })
    .await
    .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let cache: Arc<dyn CacheService> = if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(
            redis_url,
            config.cache_ttl_seconds,
            config.cache_op_timeout_ms,
        )
        .await
        {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    };

    let pool = Arc::new(pool);
    let link_repository = Arc::new(PgLinkRepository::new(pool.clone()));
    let token_repository = Arc::new(PgTokenRepository::new(pool.clone()));

    let state = AppState {
        link_service: Arc::new(LinkService::new(
            link_repository.clone(),
            cache.clone(),
            config.cache_ttl_seconds,
        )),
        redirect_service: Arc::new(RedirectService::new(
            link_repository,
            cache.clone(),
            config.cache_ttl_seconds,
        )),
        auth_service: Arc::new(AuthService::new(
            token_repository,
            config.token_signing_secret.clone(),
        )),
        cache,
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .await?;

    Ok(())
}
