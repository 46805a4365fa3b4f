//! Input validation helpers
//!
//! Centralized text length constants and validation functions. Limits are
//! chosen for reasonable UX and to keep remote-store payloads small.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::Profile;

// ── Text length limits ──────────────────────────────────────────────

/// Customer and item names
pub const MAX_NAME_LEN: usize = 200;

/// Notes and preparation instructions
pub const MAX_NOTE_LEN: usize = 500;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Phone numbers
pub const MAX_PHONE_LEN: usize = 20;

/// Minimum digits for a dialable mobile-money number
pub const MIN_PHONE_DIGITS: usize = 9;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
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

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(value: &Option<String>, field: &str, max_len: usize) -> AppResult<()> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a customer profile before it is stored or used at checkout.
pub fn validate_profile(profile: &Profile) -> AppResult<()> {
    let invalid = |field: &str, reason: &str| {
        AppError::new(ErrorCode::ProfileInvalid)
            .with_detail("field", field)
            .with_detail("reason", reason)
    };

    validate_required_text(&profile.name, "name", MAX_NAME_LEN)
        .map_err(|_| invalid("name", "required"))?;

    let email = profile.email.trim();
    if email.is_empty() || email.len() > MAX_EMAIL_LEN {
        return Err(invalid("email", "required"));
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(invalid("email", "missing @"));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(invalid("email", "malformed"));
    }

    let phone = profile.phone.trim();
    if phone.len() > MAX_PHONE_LEN {
        return Err(invalid("phone", "too long"));
    }
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < MIN_PHONE_DIGITS {
        return Err(invalid("phone", "too short"));
    }
    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || c == '+' || c == ' ' || c == '-')
    {
        return Err(invalid("phone", "invalid characters"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, email: &str, phone: &str) -> Profile {
        Profile::new(name, email, phone)
    }

    #[test]
    fn test_valid_profile_passes() {
        assert!(validate_profile(&profile("Bwalya M", "bwalya@example.com", "+260 97 1234567")).is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = validate_profile(&profile("  ", "a@b.co", "0971234567")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProfileInvalid);
    }

    #[test]
    fn test_malformed_email_rejected() {
        assert!(validate_profile(&profile("A", "not-an-email", "0971234567")).is_err());
        assert!(validate_profile(&profile("A", "a@nodot", "0971234567")).is_err());
        assert!(validate_profile(&profile("A", "@example.com", "0971234567")).is_err());
    }

    #[test]
    fn test_short_phone_rejected() {
        assert!(validate_profile(&profile("A", "a@b.co", "12345")).is_err());
    }

    #[test]
    fn test_phone_with_letters_rejected() {
        assert!(validate_profile(&profile("A", "a@b.co", "09712345ab")).is_err());
    }

    #[test]
    fn test_required_text_limits() {
        assert!(validate_required_text("ok", "field", 10).is_ok());
        assert!(validate_required_text("", "field", 10).is_err());
        assert!(validate_required_text(&"x".repeat(11), "field", 10).is_err());
    }

    #[test]
    fn test_optional_text_limits() {
        assert!(validate_optional_text(&None, "field", 5).is_ok());
        assert!(validate_optional_text(&Some("ok".into()), "field", 5).is_ok());
        assert!(validate_optional_text(&Some("too long".into()), "field", 5).is_err());
    }
}
