use thiserror::Error;

pub mod argon2;

pub use self::argon2::PasswordHasher;

/// Error type for password operations.
///
/// A wrong password is not an error; see [`PasswordHasher::verify`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Password verification failed: {0}")]
    VerificationFailed(String),
}
