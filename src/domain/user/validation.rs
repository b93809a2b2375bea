//! User validation utilities

use thiserror::Error;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("User ID cannot be empty")]
    EmptyId,

    #[error("User ID exceeds maximum length of {0} characters")]
    IdTooLong(usize),

    #[error("User ID cannot contain whitespace")]
    IdContainsWhitespace,
}

const MAX_USER_ID_LENGTH: usize = 255;

/// Validate a user ID
///
/// IDs are opaque and caller-assigned, so only the shape the store can hold
/// is checked:
/// - Cannot be empty
/// - Maximum 255 characters
/// - No whitespace
pub fn validate_user_id(id: &str) -> Result<(), UserValidationError> {
    if id.is_empty() {
        return Err(UserValidationError::EmptyId);
    }

    if id.chars().count() > MAX_USER_ID_LENGTH {
        return Err(UserValidationError::IdTooLong(MAX_USER_ID_LENGTH));
    }

    if id.chars().any(char::is_whitespace) {
        return Err(UserValidationError::IdContainsWhitespace);
    }

    Ok(())
}
