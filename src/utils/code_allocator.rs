//! Short code generation and custom alias validation.

use crate::error::AppError;
use rand::{Rng, distr::Alphanumeric};
use serde_json::json;

/// Length of generated short codes.
pub const CODE_LENGTH: usize = 6;

/// Codes that would shadow service routes and cannot be used as aliases.
const RESERVED_CODES: &[&str] = &["links", "health"];

/// Generates a random alphanumeric short code.
///
/// Codes are identifiers, not secrets, so a non-cryptographic generator is
/// sufficient. Uniqueness is enforced against the link store by the caller.
pub fn generate_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_LENGTH)
        .map(char::from)
        .collect()
}

/// Validates a caller-requested custom alias.
///
/// # Rules
///
/// - Length: 4-32 characters
/// - Allowed characters: ASCII letters, digits, hyphens, underscores
/// - Cannot be a reserved route word
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_alias(alias: &str) -> Result<(), AppError> {
    if alias.len() < 4 || alias.len() > 32 {
        return Err(AppError::validation(
            "Custom alias must be 4-32 characters",
            json!({ "provided_length": alias.len() }),
        ));
    }

    if !alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::validation(
            "Custom alias can only contain letters, digits, hyphens, and underscores",
            json!({ "alias": alias }),
        ));
    }

    if RESERVED_CODES.contains(&alias) {
        return Err(AppError::validation(
            "This alias is reserved",
            json!({ "alias": alias }),
        ));
    }

    Ok(())
}
