//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Maximum length of a post or report body
pub const MAX_TEXT_LEN: usize = 2000;

/// Maximum length of a bio or location field
pub const MAX_PROFILE_FIELD_LEN: usize = 280;

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.len() < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }

    if username.len() > 32 {
        return Err("Username must be at most 32 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err("Username can only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate an optional free-text body (post text, report text)
pub fn validate_text(text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err("Text must not be blank".to_string());
    }

    if text.len() > MAX_TEXT_LEN {
        return Err(format!("Text must be at most {} characters long", MAX_TEXT_LEN));
    }

    Ok(())
}

/// Validate a bio or location field
pub fn validate_profile_field(name: &str, value: &str) -> Result<(), String> {
    if value.len() > MAX_PROFILE_FIELD_LEN {
        return Err(format!(
            "{} must be at most {} characters long",
            name, MAX_PROFILE_FIELD_LEN
        ));
    }

    Ok(())
}

/// Validate an external profile picture URL
pub fn validate_picture_url(url: &str) -> Result<(), String> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err("Profile picture URL must be http or https".to_string());
    }

    if url.len() > 2048 {
        return Err("Profile picture URL is too long".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("bob_42").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
        assert!(validate_username("bob smith").is_err());
        assert!(validate_username("bob!").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("bob@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("bob@").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("hunter22hunter22").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_text() {
        assert!(validate_text("why did the chicken cross the road").is_ok());
        assert!(validate_text("   ").is_err());
        assert!(validate_text(&"x".repeat(MAX_TEXT_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_picture_url() {
        assert!(validate_picture_url("https://example.com/me.png").is_ok());
        assert!(validate_picture_url("ftp://example.com/me.png").is_err());
    }
}
