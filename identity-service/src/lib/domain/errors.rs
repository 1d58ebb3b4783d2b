use serde::Serialize;
use thiserror::Error;

/// Error for persistence operations.
///
/// `NotFound` carries no context; each call site decides whether a miss
/// means "available" or "invalid credential".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    /// A unique constraint rejected the write; carries the offending field name.
    #[error("Unique constraint violated on {0}")]
    UniqueViolation(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Validation failure attached to a single input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub error: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            error: error.into(),
        }
    }

    /// The uniqueness collision reported for `email` or `username`.
    pub fn already_exists(field: &str) -> Self {
        Self::new(field, format!("{} already exists", field))
    }
}

/// Failure of the password hashing collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Password hashing failed: {0}")]
pub struct HashingError(pub String);
