use thiserror::Error;

use crate::domain::deadline::DeadlineExceeded;
use crate::domain::errors::FieldError;

/// Returned for both an unknown username and a wrong password.
pub const INVALID_CREDENTIALS: &str = "username or password is incorrect";

/// Returned for any refresh token that cannot be redeemed.
pub const INVALID_REFRESH_TOKEN: &str = "refresh token not valid";

/// Returned when an access token does not resolve to a live user.
pub const UNAUTHORIZED: &str = "unauthorized";

/// Error for token signing and validation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Token rejected: {0}")]
    Rejected(String),
}

/// Top-level error for authentication flows
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("validation failed: {}", .0.first().map(|e| e.error.as_str()).unwrap_or("invalid input"))]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    Internal(String),
}

impl AuthError {
    pub fn invalid_credentials() -> Self {
        AuthError::Unauthorized(INVALID_CREDENTIALS.to_string())
    }

    pub fn invalid_refresh_token() -> Self {
        AuthError::Unauthorized(INVALID_REFRESH_TOKEN.to_string())
    }

    pub fn unauthorized() -> Self {
        AuthError::Unauthorized(UNAUTHORIZED.to_string())
    }
}

impl From<DeadlineExceeded> for AuthError {
    fn from(err: DeadlineExceeded) -> Self {
        AuthError::Internal(format!("{} timed out", err.operation))
    }
}
