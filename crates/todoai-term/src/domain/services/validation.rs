//! Field validation shared by the dashboard and the auth session.
//!
//! Lengths count characters, not bytes.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;
pub const MIN_PASSWORD_CHARS: usize = 8;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title cannot be empty")]
    EmptyTitle,
    #[error("Title exceeds 200 characters")]
    TitleTooLong,
    #[error("Description exceeds 1000 characters")]
    DescriptionTooLong,
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Password must be at least 8 characters")]
    PasswordTooShort,
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(ValidationError::TitleTooLong);
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(ValidationError::DescriptionTooLong);
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_rules() {
        assert_eq!(validate_title("   "), Err(ValidationError::EmptyTitle));
        assert_eq!(validate_title("Buy milk"), Ok(()));
        assert_eq!(validate_title(&"a".repeat(200)), Ok(()));
        assert_eq!(
            validate_title(&"a".repeat(201)),
            Err(ValidationError::TitleTooLong)
        );
        // Surrounding whitespace does not count against the limit.
        assert_eq!(validate_title(&format!("  {}  ", "a".repeat(200))), Ok(()));
    }

    #[test]
    fn description_counts_characters() {
        assert_eq!(validate_description(""), Ok(()));
        assert_eq!(validate_description(&"é".repeat(1000)), Ok(()));
        assert_eq!(
            validate_description(&"é".repeat(1001)),
            Err(ValidationError::DescriptionTooLong)
        );
    }

    #[test]
    fn email_rules() {
        assert_eq!(validate_email("user@example.com"), Ok(()));
        assert_eq!(validate_email("user@example"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("us er@example.com"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("@example.com"), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn password_rules() {
        assert_eq!(validate_password("1234567"), Err(ValidationError::PasswordTooShort));
        assert_eq!(validate_password("12345678"), Ok(()));
        assert_eq!(
            ValidationError::PasswordTooShort.to_string(),
            "Password must be at least 8 characters"
        );
    }
}
