//! Form-level rules for todo payloads.
//!
//! The store forwards whatever it is given; these checks are for the layer
//! that builds requests from user input. The mock server enforces the same
//! limits on its side.

use thiserror::Error;

pub const MAX_TITLE_LEN: usize = 1000;
pub const MAX_DESCRIPTION_LEN: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title is required")]
    EmptyTitle,

    #[error("Title must be at most {max} characters (got {0})", max = MAX_TITLE_LEN)]
    TitleTooLong(usize),

    #[error("Description must be at most {max} characters (got {0})", max = MAX_DESCRIPTION_LEN)]
    DescriptionTooLong(usize),
}

/// Trim `title` and check it against the length limits.
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    let len = title.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(ValidationError::TitleTooLong(len));
    }
    Ok(title.to_string())
}

pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::DescriptionTooLong(len));
    }
    Ok(())
}

/// Trimmed description, or `None` when it is blank.
pub fn normalize_description(description: &str) -> Option<String> {
    let trimmed = description.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
