use std::sync::Arc;

use crate::application::services::{AuthService, LinkService, RedirectService};
use crate::infrastructure::cache::CacheService;

/// Shared application state injected into all handlers.
///
/// The cache handle lives here, owned by the composition root and passed by
/// reference into the services; no module-global connection state exists.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub redirect_service: Arc<RedirectService>,
    pub auth_service: Arc<AuthService>,
    pub cache: Arc<dyn CacheService>,
}
