use thiserror::Error;

use crate::domain::deadline::DeadlineExceeded;
use crate::domain::errors::FieldError;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("username is required")]
    Missing,

    #[error("username must be at least {min} characters")]
    TooShort { min: usize, actual: usize },

    #[error("username must be at most {max} characters")]
    TooLong { max: usize, actual: usize },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("email is required")]
    Missing,

    #[error("email must be at most {max} characters")]
    TooLong { max: usize, actual: usize },

    #[error("email is invalid: {0}")]
    InvalidFormat(String),
}

/// Error for Password policy failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password is required")]
    Missing,

    #[error("password must be at least {min} characters")]
    TooShort { min: usize },
}

/// Error for Role parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown role: {0}")]
pub struct RoleError(pub String);

/// Top-level error for user management operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserError {
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("user not found")]
    NotFound(String),

    /// Field-level failures, e.g. an email or username already taken.
    #[error("validation failed: {}", .0.first().map(|e| e.error.as_str()).unwrap_or("invalid input"))]
    Validation(Vec<FieldError>),

    /// Unexpected store or hashing failure; the payload is a caller-safe context.
    #[error("{0}")]
    Internal(String),
}

impl From<DeadlineExceeded> for UserError {
    fn from(err: DeadlineExceeded) -> Self {
        UserError::Internal(format!("{} timed out", err.operation))
    }
}
