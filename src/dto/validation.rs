//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::engine::codes;

/// Maximum accepted length for a submitted word, after trimming.
pub const MAX_WORD_LENGTH: usize = 64;

/// Validates that a join code has the expected shape after normalization.
///
/// # Examples
///
/// ```ignore
/// validate_join_code("ab2c") // Ok - normalized to AB2C
/// validate_join_code("AB0C") // Err - ambiguous character
/// validate_join_code("ABC")  // Err - too short
/// ```
pub fn validate_join_code(code: &str) -> Result<(), ValidationError> {
    let normalized = codes::normalize(code);
    if !codes::is_valid(&normalized) {
        let mut err = ValidationError::new("join_code_format");
        err.message = Some(
            format!(
                "Join code must be {} characters from the unambiguous alphabet",
                codes::CODE_LENGTH
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

/// Validates that a word is non-empty and reasonably sized once trimmed.
pub fn validate_word_text(text: &str) -> Result<(), ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("word_empty");
        err.message = Some("Word must not be empty".into());
        return Err(err);
    }
    if trimmed.chars().count() > MAX_WORD_LENGTH {
        let mut err = ValidationError::new("word_too_long");
        err.message =
            Some(format!("Word must be at most {MAX_WORD_LENGTH} characters").into());
        return Err(err);
    }
    Ok(())
}
