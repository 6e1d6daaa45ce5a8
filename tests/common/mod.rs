#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::routing::get;
use chrono::{DateTime, Utc};
use serde_json::json;

use shortly::api::handlers::{health_handler, redirect_handler};
use shortly::api::routes::link_routes;
use shortly::application::services::{AuthService, LinkService, RedirectService};
use shortly::domain::entities::{ApiToken, Link, NewLink};
use shortly::domain::repositories::{LinkRepository, TokenRepository};
use shortly::error::AppError;
use shortly::infrastructure::cache::{CacheError, CacheResult, CacheService};
use shortly::state::AppState;

pub const TEST_SECRET: &str = "test-signing-secret";
pub const CACHE_TTL: u64 = 3600;

/// Computes the same keyed token hash the server uses, so tests can seed
/// tokens directly into the repository.
pub fn hash_token(token: &str) -> String {
    use hmac::{Hmac, Mac};
    let mut mac =
        Hmac::<sha2::Sha256>::new_from_slice(TEST_SECRET.as_bytes()).expect("any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

// ── In-memory link repository ───────────────────────────────────────────────

#[derive(Default)]
struct LinkState {
    links: Vec<Link>,
    next_id: i64,
}

/// In-memory link store with the same contract as the PostgreSQL
/// repository: unique short codes enforced at insert, click updates atomic
/// under the lock.
#[derive(Default)]
pub struct MemoryLinkRepository {
    inner: Mutex<LinkState>,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a link by code, for asserting on store state.
    pub fn get(&self, short_code: &str) -> Option<Link> {
        let state = self.inner.lock().unwrap();
        state
            .links
            .iter()
            .find(|l| l.short_code == short_code)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().links.len()
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut state = self.inner.lock().unwrap();

        if state
            .links
            .iter()
            .any(|l| l.short_code == new_link.short_code)
        {
            return Err(AppError::conflict(
                "Custom alias already taken",
                json!({ "constraint": "links_short_code_key" }),
            ));
        }

        state.next_id += 1;
        let link = Link {
            id: state.next_id,
            short_code: new_link.short_code,
            original_url: new_link.original_url,
            created_at: Utc::now(),
            expires_at: new_link.expires_at,
            click_count: 0,
            last_click: None,
            owner_id: new_link.owner_id,
        };
        state.links.push(link.clone());

        Ok(link)
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError> {
        Ok(self.get(short_code))
    }

    async fn find_by_original_url(
        &self,
        original_url: &str,
        owner_id: i64,
    ) -> Result<Option<Link>, AppError> {
        let state = self.inner.lock().unwrap();
        Ok(state
            .links
            .iter()
            .find(|l| l.original_url == original_url && l.owner_id == Some(owner_id))
            .cloned())
    }

    async fn record_click(&self, id: i64, now: DateTime<Utc>) -> Result<(), AppError> {
        let mut state = self.inner.lock().unwrap();
        if let Some(link) = state.links.iter_mut().find(|l| l.id == id) {
            link.click_count += 1;
            link.last_click = Some(now);
        }
        Ok(())
    }

    async fn update_url(&self, id: i64, original_url: &str) -> Result<Link, AppError> {
        let mut state = self.inner.lock().unwrap();
        let link = state
            .links
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| AppError::not_found("link not found", json!({ "id": id })))?;
        link.original_url = original_url.to_string();
        Ok(link.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut state = self.inner.lock().unwrap();
        state.links.retain(|l| l.id != id);
        Ok(())
    }

    async fn find_expired_for_owner(
        &self,
        owner_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Link>, AppError> {
        let state = self.inner.lock().unwrap();
        Ok(state
            .links
            .iter()
            .filter(|l| l.owner_id == Some(owner_id) && l.expires_at.is_some_and(|e| e < now))
            .cloned()
            .collect())
    }

    async fn find_stale(
        &self,
        owner_id: i64,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Link>, AppError> {
        let state = self.inner.lock().unwrap();
        Ok(state
            .links
            .iter()
            .filter(|l| {
                l.owner_id == Some(owner_id) && l.last_click.is_none_or(|t| t < cutoff)
            })
            .cloned()
            .collect())
    }
}

// ── In-memory token repository ──────────────────────────────────────────────

/// In-memory token store mapping token hashes to owner ids.
#[derive(Default)]
pub struct MemoryTokenRepository {
    owners_by_hash: Mutex<HashMap<String, i64>>,
}

impl MemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw token for an owner, hashing it the way the server does.
    pub fn insert_token(&self, raw_token: &str, owner_id: i64) {
        self.owners_by_hash
            .lock()
            .unwrap()
            .insert(hash_token(raw_token), owner_id);
    }
}

#[async_trait]
impl TokenRepository for MemoryTokenRepository {
    async fn resolve_owner(&self, token_hash: &str) -> Result<Option<i64>, AppError> {
        Ok(self.owners_by_hash.lock().unwrap().get(token_hash).copied())
    }

    async fn touch_last_used(&self, _token_hash: &str) -> Result<(), AppError> {
        Ok(())
    }

    async fn create_token(
        &self,
        owner_id: i64,
        name: &str,
        token_hash: &str,
    ) -> Result<ApiToken, AppError> {
        self.owners_by_hash
            .lock()
            .unwrap()
            .insert(token_hash.to_string(), owner_id);

        Ok(ApiToken {
            id: 1,
            owner_id,
            name: name.to_string(),
            token_hash: token_hash.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        })
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        Ok(Vec::new())
    }

    async fn revoke_token(&self, _id: i64) -> Result<bool, AppError> {
        Ok(false)
    }
}

// ── Cache fakes ─────────────────────────────────────────────────────────────

/// Deterministic in-memory cache: stores mappings, ignores TTLs.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_entry(&self, short_code: &str) -> Option<String> {
        self.entries.lock().unwrap().get(short_code).cloned()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.lock().unwrap().get(short_code).cloned())
    }

    async fn set_url(
        &self,
        short_code: &str,
        original_url: &str,
        _ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(short_code.to_string(), original_url.to_string());
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        self.entries.lock().unwrap().remove(short_code);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

/// Cache whose every operation fails, for resilience tests.
pub struct FailingCache;

#[async_trait]
impl CacheService for FailingCache {
    async fn get_url(&self, _short_code: &str) -> CacheResult<Option<String>> {
        Err(CacheError::OperationError("cache unavailable".into()))
    }

    async fn set_url(
        &self,
        _short_code: &str,
        _original_url: &str,
        _ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        Err(CacheError::OperationError("cache unavailable".into()))
    }

    async fn invalidate(&self, _short_code: &str) -> CacheResult<()> {
        Err(CacheError::OperationError("cache unavailable".into()))
    }

    async fn health_check(&self) -> bool {
        false
    }
}

// ── State and router builders ───────────────────────────────────────────────

pub struct TestContext {
    pub state: AppState,
    pub links: Arc<MemoryLinkRepository>,
    pub tokens: Arc<MemoryTokenRepository>,
}

/// Builds application state over in-memory repositories and the given cache.
pub fn create_test_state(cache: Arc<dyn CacheService>) -> TestContext {
    let links = Arc::new(MemoryLinkRepository::new());
    let tokens = Arc::new(MemoryTokenRepository::new());

    let state = AppState {
        link_service: Arc::new(LinkService::new(links.clone(), cache.clone(), CACHE_TTL)),
        redirect_service: Arc::new(RedirectService::new(
            links.clone(),
            cache.clone(),
            CACHE_TTL,
        )),
        auth_service: Arc::new(AuthService::new(tokens.clone(), TEST_SECRET.to_string())),
        cache,
    };

    TestContext {
        state,
        links,
        tokens,
    }
}

/// Test router with the production routes minus the rate limiter, which
/// needs socket connect info the test server doesn't provide.
pub fn test_app(state: AppState) -> Router {
    Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/links", link_routes())
        .with_state(state)
}

/// Seeds a link directly into the store.
pub async fn seed_link(
    links: &MemoryLinkRepository,
    short_code: &str,
    original_url: &str,
    owner_id: Option<i64>,
    expires_at: Option<DateTime<Utc>>,
) -> Link {
    links
        .create(NewLink {
            short_code: short_code.to_string(),
            original_url: original_url.to_string(),
            expires_at,
            owner_id,
        })
        .await
        .unwrap()
}
