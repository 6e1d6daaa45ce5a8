//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::{AppError, map_sqlx_error};
use serde_json::json;

const LINK_COLUMNS: &str =
    "id, short_code, original_url, created_at, expires_at, click_count, last_click, owner_id";

/// PostgreSQL repository for link storage and retrieval.
///
/// Per-record atomicity comes from single-statement updates; the unique
/// index on `short_code` enforces code uniqueness at insert time.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let sql = format!(
            "INSERT INTO links (short_code, original_url, expires_at, owner_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {LINK_COLUMNS}"
        );

        sqlx::query_as::<_, Link>(&sql)
            .bind(&new_link.short_code)
            .bind(&new_link.original_url)
            .bind(new_link.expires_at)
            .bind(new_link.owner_id)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE short_code = $1");

        sqlx::query_as::<_, Link>(&sql)
            .bind(short_code)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_by_original_url(
        &self,
        original_url: &str,
        owner_id: i64,
    ) -> Result<Option<Link>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE original_url = $1 AND owner_id = $2 \
             ORDER BY created_at LIMIT 1"
        );

        sqlx::query_as::<_, Link>(&sql)
            .bind(original_url)
            .bind(owner_id)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)
    }

    async fn record_click(&self, id: i64, now: DateTime<Utc>) -> Result<(), AppError> {
        // One statement keeps the counter and timestamp a single atomic unit;
        // concurrent clicks serialize on the row, none are lost.
        sqlx::query("UPDATE links SET click_count = click_count + 1, last_click = $2 WHERE id = $1")
            .bind(id)
            .bind(now)
            .execute(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update_url(&self, id: i64, original_url: &str) -> Result<Link, AppError> {
        let sql = format!(
            "UPDATE links SET original_url = $2 WHERE id = $1 RETURNING {LINK_COLUMNS}"
        );

        sqlx::query_as::<_, Link>(&sql)
            .bind(id)
            .bind(original_url)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?
            .ok_or_else(|| AppError::not_found("link not found", json!({ "id": id })))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_expired_for_owner(
        &self,
        owner_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Link>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE owner_id = $1 AND expires_at IS NOT NULL AND expires_at < $2 \
             ORDER BY expires_at"
        );

        sqlx::query_as::<_, Link>(&sql)
            .bind(owner_id)
            .bind(now)
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_stale(
        &self,
        owner_id: i64,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Link>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE owner_id = $1 AND (last_click IS NULL OR last_click < $2) \
             ORDER BY created_at"
        );

        sqlx::query_as::<_, Link>(&sql)
            .bind(owner_id)
            .bind(cutoff)
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)
    }
}
