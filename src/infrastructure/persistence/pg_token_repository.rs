//! PostgreSQL implementation of the token repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::ApiToken;
use crate::domain::repositories::TokenRepository;
use crate::error::{AppError, map_sqlx_error};

const TOKEN_COLUMNS: &str =
    "id, owner_id, name, token_hash, created_at, last_used_at, revoked_at";

/// PostgreSQL repository for API token storage.
pub struct PgTokenRepository {
    pool: Arc<PgPool>,
}

impl PgTokenRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn resolve_owner(&self, token_hash: &str) -> Result<Option<i64>, AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT owner_id FROM api_tokens WHERE token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(token_hash)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)
    }

    async fn touch_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE api_tokens SET last_used_at = now() WHERE token_hash = $1")
            .bind(token_hash)
            .execute(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn create_token(
        &self,
        owner_id: i64,
        name: &str,
        token_hash: &str,
    ) -> Result<ApiToken, AppError> {
        let sql = format!(
            "INSERT INTO api_tokens (owner_id, name, token_hash) \
             VALUES ($1, $2, $3) \
             RETURNING {TOKEN_COLUMNS}"
        );

        sqlx::query_as::<_, ApiToken>(&sql)
            .bind(owner_id)
            .bind(name)
            .bind(token_hash)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        let sql = format!("SELECT {TOKEN_COLUMNS} FROM api_tokens ORDER BY created_at");

        sqlx::query_as::<_, ApiToken>(&sql)
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)
    }

    async fn revoke_token(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE api_tokens SET revoked_at = now() WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .execute(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
