//! Input validation helpers
//!
//! Centralized text length constants and validation functions used by the
//! create/update handlers.

use shared::error::{AppError, AppResult, ErrorCode};
use validator::ValidateEmail;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: food, category, topping, location, staff, customer names
pub const MAX_NAME_LEN: usize = 200;

/// Message subjects
pub const MAX_SUBJECT_LEN: usize = 200;

/// Message bodies, cart instructions, order notes
pub const MAX_NOTE_LEN: usize = 2000;

/// Phone numbers, gender and similar short values
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Minimum password length (identity service rule)
pub const MIN_PASSWORD_LEN: usize = 6;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            format!("{field} must not be empty"),
        )
        .with_detail("field", field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(value: &Option<String>, field: &str, max_len: usize) -> AppResult<()> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate an email address format and length
pub fn validate_email(email: &str) -> AppResult<()> {
    validate_required_text(email, "email", MAX_EMAIL_LEN)?;
    if !email.trim().validate_email() {
        return Err(
            AppError::with_message(ErrorCode::InvalidFormat, "Invalid email address")
                .with_detail("field", "email"),
        );
    }
    Ok(())
}

/// Validate a new password
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooShort));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password is too long (max {MAX_PASSWORD_LEN})"
        )));
    }
    Ok(())
}
