//! JSON representation of a link returned by the API.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::Link;

/// Link payload returned by shorten, update, stats, search and expired
/// listing. Ownership is never exposed.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_count: i64,
    pub last_click: Option<DateTime<Utc>>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            short_code: link.short_code,
            original_url: link.original_url,
            created_at: link.created_at,
            expires_at: link.expires_at,
            click_count: link.click_count,
            last_click: link.last_click,
        }
    }
}
