//! API middleware: authentication extractors, rate limiting, tracing.

pub mod auth;
pub mod rate_limit;
pub mod tracing;

pub use auth::{CurrentOwner, MaybeOwner};
