//! Request and response shapes for the REST API.

pub mod link;
pub mod shorten;
pub mod update_link;

pub use link::LinkResponse;
pub use shorten::ShortenRequest;
pub use update_link::UpdateLinkRequest;
