//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! All checks run in the handlers before any persistence call.

use shared::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Blog titles
pub const MAX_TITLE_LEN: usize = 200;

/// Blog body text
pub const MAX_CONTENT_LEN: usize = 50_000;

/// Category names
pub const MAX_CATEGORY_LEN: usize = 100;

/// Comment text
pub const MAX_COMMENT_LEN: usize = 2_000;

/// Usernames
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 50;

/// Passwords (before hashing)
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is non-empty and within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value {
        validate_required_text(v, field, max_len)?;
    }
    Ok(())
}

/// Validate that a string falls inside a length range (credentials).
pub fn validate_text_range(
    value: &str,
    field: &str,
    min_len: usize,
    max_len: usize,
) -> Result<(), AppError> {
    if value.len() < min_len {
        return Err(AppError::validation(format!(
            "{field} is too short (min {min_len} chars)"
        )));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}
