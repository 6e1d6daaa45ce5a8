//! DTO for the link update endpoint.

use serde::Deserialize;
use validator::Validate;

/// Request to replace the destination URL of a link.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    #[validate(url(message = "Invalid URL format"))]
    pub original_url: String,
}
