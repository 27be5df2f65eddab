//! Staff account rules.

use crate::error::CoreError;

/// Minimum password length for new and reset passwords.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Emails are the login identifier and compared case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_password(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Minimal shape check used where `validator` derive is not available
/// (CSV rows): one `@` with text on both sides and a dot in the domain.
pub fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Staff ids (e.g. `BECS020`) are non-blank, alphanumeric plus `-`/`_`.
pub fn validate_staff_id(staff_id: &str) -> Result<(), CoreError> {
    let staff_id = staff_id.trim();
    if staff_id.is_empty() {
        return Err(CoreError::Validation("Staff id is required".to_string()));
    }
    if staff_id.len() > 50
        || !staff_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(CoreError::Validation(format!(
            "Invalid staff id '{staff_id}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  Jane.Smith@BECS.co.ke "), "jane.smith@becs.co.ke");
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("john.doe@becs.co.ke"));
        assert!(!looks_like_email("john.doe"));
        assert!(!looks_like_email("@becs.co.ke"));
        assert!(!looks_like_email("john@localhost"));
        assert!(!looks_like_email("john doe@becs.co.ke"));
    }

    #[test]
    fn password_length() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn staff_ids() {
        assert!(validate_staff_id("BECS020").is_ok());
        assert!(validate_staff_id("").is_err());
        assert!(validate_staff_id("BECS 020").is_err());
    }
}
