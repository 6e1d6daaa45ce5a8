//! DTOs for the link creation endpoint.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use validator::Validate;

/// Compiled regex for custom alias validation.
static CUSTOM_ALIAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Request to shorten a URL.
///
/// One creation shape: the alias is an explicit optional field, and the
/// assigned `short_code` in the response is either the alias or a generated
/// code.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The destination URL (must be valid HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    pub original_url: String,

    /// Optional caller-requested short code.
    #[validate(length(min = 4, max = 32))]
    #[validate(regex(path = "*CUSTOM_ALIAS_REGEX"))]
    pub custom_alias: Option<String>,

    /// Optional expiry timestamp. After this time, redirects return 410 Gone.
    pub expires_at: Option<DateTime<Utc>>,
}
