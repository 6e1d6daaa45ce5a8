//! Core business entities.

mod link;
mod token;

pub use link::{Link, NewLink};
pub use token::ApiToken;
