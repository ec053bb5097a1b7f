//! Input validation for sprint and session data.

use crate::error::{Result, SprigError};

/// Maximum allowed length for a story or action item title.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum allowed length for free text (descriptions, updates, feedback).
pub const MAX_BODY_LENGTH: usize = 50_000;

/// Maximum allowed length for a session or story id.
pub const MAX_ID_LENGTH: usize = 100;

pub const MAX_NAME_LENGTH: usize = 100;

/// Characters forbidden in ids to prevent path traversal.
const FORBIDDEN_ID_CHARS: &[char] = &['/', '\\', '\0'];

pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(SprigError::Validation("Title cannot be empty".to_string()));
    }
    if title.len() > MAX_TITLE_LENGTH {
        return Err(SprigError::Validation(format!(
            "Title exceeds maximum length of {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}

/// Validates a free-text field. `field` names it in the error.
pub fn validate_body(field: &str, body: &str) -> Result<()> {
    if body.len() > MAX_BODY_LENGTH {
        return Err(SprigError::Validation(format!(
            "{} exceeds maximum length of {} characters",
            field, MAX_BODY_LENGTH
        )));
    }
    Ok(())
}

/// Validates a required free-text field.
pub fn validate_required(field: &str, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(SprigError::Validation(format!("{} cannot be empty", field)));
    }
    validate_body(field, text)
}

/// Validates a person or team name.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SprigError::Validation("Name cannot be empty".to_string()));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(SprigError::Validation(format!(
            "Name exceeds maximum length of {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

/// Validates a session or story id to prevent path traversal attacks.
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(SprigError::Validation("ID cannot be empty".to_string()));
    }
    if id.len() > MAX_ID_LENGTH {
        return Err(SprigError::Validation(format!(
            "ID exceeds maximum length of {} characters",
            MAX_ID_LENGTH
        )));
    }
    if id.contains("..") {
        return Err(SprigError::Validation(
            "ID cannot contain '..' (path traversal)".to_string(),
        ));
    }
    for c in FORBIDDEN_ID_CHARS {
        if id.contains(*c) {
            return Err(SprigError::Validation(format!("ID cannot contain '{}'", c)));
        }
    }
    Ok(())
}

/// Retrospective sentiment is scored 1 to 10.
pub fn validate_sentiment(score: u8) -> Result<()> {
    if !(1..=10).contains(&score) {
        return Err(SprigError::Validation(format!(
            "Sentiment must be between 1 and 10, got {}",
            score
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title_empty() {
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
    }

    #[test]
    fn test_validate_title_valid() {
        assert!(validate_title("A valid title").is_ok());
    }

    #[test]
    fn test_validate_title_too_long() {
        let long_title = "a".repeat(MAX_TITLE_LENGTH + 1);
        assert!(validate_title(&long_title).is_err());
    }

    #[test]
    fn test_validate_required_names_field() {
        let err = validate_required("Yesterday", "").unwrap_err();
        assert!(err.to_string().contains("Yesterday cannot be empty"));
    }

    #[test]
    fn test_validate_id_path_traversal() {
        assert!(validate_id("../../../etc/passwd").is_err());
        assert!(validate_id("AlphaTeam_Sprint_3").is_ok());
    }

    #[test]
    fn test_validate_id_forbidden_chars() {
        assert!(validate_id("US/001").is_err());
        assert!(validate_id("US\\001").is_err());
    }

    #[test]
    fn test_validate_sentiment_bounds() {
        assert!(validate_sentiment(0).is_err());
        assert!(validate_sentiment(1).is_ok());
        assert!(validate_sentiment(10).is_ok());
        assert!(validate_sentiment(11).is_err());
    }
}
