use thiserror::Error;

/// Error type for JWT operations.
///
/// Callers facing end users should collapse every decoding variant into a
/// single "unauthorized" outcome; the variants exist for logging.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Failed to decode token: {0}")]
    DecodingFailed(String),

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token uses a disallowed algorithm")]
    InvalidAlgorithm,
}
