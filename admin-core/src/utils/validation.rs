//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! Limits follow the column sizes of the admin schema.

use crate::utils::{AppError, ErrorCode};
use validator::ValidateEmail;

// ── Text length limits ──────────────────────────────────────────────

/// Login names and real names
pub const MAX_USERNAME_LEN: usize = 32;

/// Entity names and codes: role, menu, menu icon
pub const MAX_NAME_LEN: usize = 32;

/// Menu routes
pub const MAX_URL_LEN: usize = 101;

/// Avatar URLs
pub const MAX_AVATAR_LEN: usize = 255;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Memo / notes
pub const MAX_NOTE_LEN: usize = 500;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::required(field));
    }
    validate_text(value, field, max_len)
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    match value {
        Some(v) => validate_text(v, field, max_len),
        None => Ok(()),
    }
}

/// Validate a string's length; empty is allowed.
pub fn validate_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    let len = value.chars().count();
    if len > max_len {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} is too long ({len} chars, max {max_len})"),
        )
        .with_detail("field", field)
        .with_detail("max_len", max_len));
    }
    Ok(())
}

/// Validate an email address; empty means "no email".
pub fn validate_email(value: &str) -> Result<(), AppError> {
    if value.is_empty() {
        return Ok(());
    }
    validate_text(value, "email", MAX_EMAIL_LEN)?;
    if !value.validate_email() {
        return Err(AppError::with_message(
            ErrorCode::InvalidFormat,
            format!("'{value}' is not a valid email"),
        )
        .with_detail("field", "email"));
    }
    Ok(())
}
