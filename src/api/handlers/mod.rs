//! HTTP request handlers.

mod health;
mod links;
mod maintenance;
mod redirect;
mod shorten;
mod stats;

pub use health::health_handler;
pub use links::{delete_link_handler, update_link_handler};
pub use maintenance::{cleanup_handler, expired_links_handler};
pub use redirect::redirect_handler;
pub use shorten::shorten_handler;
pub use stats::{search_handler, stats_handler};
