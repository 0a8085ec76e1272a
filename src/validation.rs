//! Input validation and field limits.
//!
//! This module centralizes the validation rules for user-supplied fields:
//! registration data, post content, comment text, and search queries.
//! Limits are deliberately generous for content fields and strict for
//! identity fields (usernames, emails, passwords).

use crate::error::{Result, SociableError};

/// Minimum allowed username length.
pub const MIN_USER_NAME_LEN: usize = 3;

/// Maximum allowed username length.
pub const MAX_USER_NAME_LEN: usize = 20;

/// Maximum allowed first/last name length.
pub const MAX_PERSON_NAME_LEN: usize = 100;

/// Maximum allowed email length (RFC 5321 limit).
pub const MAX_EMAIL_LEN: usize = 254;

/// Minimum allowed password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Maximum allowed password length.
pub const MAX_PASSWORD_LEN: usize = 128;

/// Maximum allowed post caption size in bytes.
pub const MAX_CAPTION_SIZE: usize = 4 * 1024;

/// Maximum allowed comment text size in bytes.
pub const MAX_COMMENT_SIZE: usize = 2 * 1024;

/// Maximum allowed media URL length.
pub const MAX_URL_LEN: usize = 2048;

/// Maximum allowed location string length.
pub const MAX_LOCATION_LEN: usize = 255;

/// Maximum allowed search query length.
pub const MAX_SEARCH_QUERY_LEN: usize = 100;

/// Validation functions for user-supplied fields.
pub struct Validator;

impl Validator {
    /// Validates a username.
    ///
    /// Usernames are 3-20 characters of lowercase ASCII letters, digits,
    /// and underscores. This keeps them unambiguous as unique handles.
    pub fn validate_user_name(user_name: &str) -> Result<()> {
        if user_name.len() < MIN_USER_NAME_LEN || user_name.len() > MAX_USER_NAME_LEN {
            return Err(SociableError::invalid_input(format!(
                "Username must be between {} and {} characters",
                MIN_USER_NAME_LEN, MAX_USER_NAME_LEN
            )));
        }
        if !user_name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(SociableError::invalid_input(
                "Username can only contain lowercase letters, numbers, and underscores",
            ));
        }
        Ok(())
    }

    /// Validates a first or last name.
    pub fn validate_person_name(field: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(SociableError::invalid_input(format!(
                "{} is required",
                field
            )));
        }
        if value.len() > MAX_PERSON_NAME_LEN {
            return Err(SociableError::invalid_input(format!(
                "{} exceeds maximum length of {} characters",
                field, MAX_PERSON_NAME_LEN
            )));
        }
        if value.chars().any(char::is_control) {
            return Err(SociableError::invalid_input(format!(
                "{} contains invalid control characters",
                field
            )));
        }
        Ok(())
    }

    /// Validates an email address structurally.
    ///
    /// Checks for exactly one `@` with a non-empty local part and a domain
    /// containing an interior dot. This is a structural sanity check, not
    /// full RFC 5322 parsing.
    pub fn validate_email(email: &str) -> Result<()> {
        if email.is_empty() {
            return Err(SociableError::invalid_input("Email is required"));
        }
        if email.len() > MAX_EMAIL_LEN {
            return Err(SociableError::invalid_input(format!(
                "Email exceeds maximum length of {} characters",
                MAX_EMAIL_LEN
            )));
        }
        if email.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(SociableError::invalid_input(
                "Email cannot contain whitespace",
            ));
        }
        let mut parts = email.splitn(2, '@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        if local.is_empty()
            || domain.is_empty()
            || domain.contains('@')
            || !domain.contains('.')
            || domain.starts_with('.')
            || domain.ends_with('.')
        {
            return Err(SociableError::invalid_input("Invalid email format"));
        }
        Ok(())
    }

    /// Validates password strength.
    ///
    /// Requires at least one lowercase letter, one uppercase letter, one
    /// digit, and one non-alphanumeric character.
    pub fn validate_password(password: &str) -> Result<()> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(SociableError::invalid_input(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if password.len() > MAX_PASSWORD_LEN {
            return Err(SociableError::invalid_input(format!(
                "Password exceeds maximum length of {} characters",
                MAX_PASSWORD_LEN
            )));
        }
        let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        let has_special = password.chars().any(|c| !c.is_ascii_alphanumeric());
        if !(has_lower && has_upper && has_digit && has_special) {
            return Err(SociableError::invalid_input(
                "Password must contain at least one uppercase letter, one lowercase letter, \
                 one number, and one special character",
            ));
        }
        Ok(())
    }

    /// Validates a post caption.
    pub fn validate_caption(caption: &str) -> Result<()> {
        if caption.trim().is_empty() {
            return Err(SociableError::invalid_input("Post caption cannot be empty"));
        }
        if caption.len() > MAX_CAPTION_SIZE {
            return Err(SociableError::invalid_input(format!(
                "Post caption exceeds maximum size of {} bytes",
                MAX_CAPTION_SIZE
            )));
        }
        Ok(())
    }

    /// Validates comment text.
    pub fn validate_comment_text(text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(SociableError::invalid_input("Comment text cannot be empty"));
        }
        if text.len() > MAX_COMMENT_SIZE {
            return Err(SociableError::invalid_input(format!(
                "Comment text exceeds maximum size of {} bytes",
                MAX_COMMENT_SIZE
            )));
        }
        Ok(())
    }

    /// Validates an optional media URL.
    pub fn validate_media_url(url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(SociableError::invalid_input("Media URL cannot be blank"));
        }
        if url.len() > MAX_URL_LEN {
            return Err(SociableError::invalid_input(format!(
                "Media URL exceeds maximum length of {} characters",
                MAX_URL_LEN
            )));
        }
        if url.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(SociableError::invalid_input(
                "Media URL cannot contain whitespace",
            ));
        }
        Ok(())
    }

    /// Validates an optional location string.
    pub fn validate_location(location: &str) -> Result<()> {
        if location.len() > MAX_LOCATION_LEN {
            return Err(SociableError::invalid_input(format!(
                "Location exceeds maximum length of {} characters",
                MAX_LOCATION_LEN
            )));
        }
        Ok(())
    }

    /// Validates a search query.
    pub fn validate_search_query(query: &str) -> Result<()> {
        if query.len() > MAX_SEARCH_QUERY_LEN {
            return Err(SociableError::invalid_input(format!(
                "Search query exceeds maximum length of {} characters",
                MAX_SEARCH_QUERY_LEN
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_name_validation() {
        assert!(Validator::validate_user_name("alice_01").is_ok());
        assert!(Validator::validate_user_name("bob").is_ok());

        // Too short / too long
        assert!(Validator::validate_user_name("ab").is_err());
        assert!(Validator::validate_user_name(&"a".repeat(MAX_USER_NAME_LEN + 1)).is_err());

        // Invalid characters
        assert!(Validator::validate_user_name("Alice").is_err());
        assert!(Validator::validate_user_name("alice-01").is_err());
        assert!(Validator::validate_user_name("alice 01").is_err());
    }

    #[test]
    fn test_email_validation() {
        assert!(Validator::validate_email("alice@example.com").is_ok());
        assert!(Validator::validate_email("a.b+c@mail.example.org").is_ok());

        assert!(Validator::validate_email("").is_err());
        assert!(Validator::validate_email("alice").is_err());
        assert!(Validator::validate_email("alice@").is_err());
        assert!(Validator::validate_email("@example.com").is_err());
        assert!(Validator::validate_email("alice@example").is_err());
        assert!(Validator::validate_email("alice@.example.com").is_err());
        assert!(Validator::validate_email("alice @example.com").is_err());
    }

    #[test]
    fn test_password_validation() {
        assert!(Validator::validate_password("Str0ng!pass").is_ok());

        // Too short
        assert!(Validator::validate_password("S1!a").is_err());
        // Missing character classes
        assert!(Validator::validate_password("alllowercase1!").is_err());
        assert!(Validator::validate_password("ALLUPPERCASE1!").is_err());
        assert!(Validator::validate_password("NoDigits!!").is_err());
        assert!(Validator::validate_password("NoSpecial11").is_err());
    }

    #[test]
    fn test_caption_validation() {
        assert!(Validator::validate_caption("sunset").is_ok());
        assert!(Validator::validate_caption("").is_err());
        assert!(Validator::validate_caption("   ").is_err());
        assert!(Validator::validate_caption(&"x".repeat(MAX_CAPTION_SIZE + 1)).is_err());
    }

    #[test]
    fn test_comment_text_validation() {
        assert!(Validator::validate_comment_text("nice shot").is_ok());
        assert!(Validator::validate_comment_text(" ").is_err());
        assert!(Validator::validate_comment_text(&"x".repeat(MAX_COMMENT_SIZE + 1)).is_err());
    }

    #[test]
    fn test_media_url_validation() {
        assert!(Validator::validate_media_url("https://cdn.example.com/p/1.jpg").is_ok());
        assert!(Validator::validate_media_url("").is_err());
        assert!(Validator::validate_media_url("http://a b").is_err());
        assert!(Validator::validate_media_url(&"u".repeat(MAX_URL_LEN + 1)).is_err());
    }
}
