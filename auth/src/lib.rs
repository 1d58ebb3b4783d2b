//! Authentication utilities library
//!
//! Provides the credential primitives used by the identity service:
//! - Password hashing (Argon2id)
//! - Access and refresh token issuing/validation (HS256 JWT, one secret per kind)
//! - SHA-256 digests for storing refresh tokens at rest
//!
//! The service defines its own hashing/signing ports and adapts these implementations,
//! so the concrete algorithms can be swapped without touching domain logic.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Access and Refresh Tokens
//! ```
//! use auth::TokenIssuer;
//!
//! let issuer = TokenIssuer::new(
//!     b"access_secret_at_least_32_bytes_long!",
//!     b"refresh_secret_at_least_32_bytes_long",
//! );
//!
//! let access = issuer.issue_access_token("user123", "alice").unwrap();
//! let claims = issuer.validate_access_token(&access.token).unwrap();
//! assert_eq!(claims.sub, "user123");
//! assert_eq!(claims.username, "alice");
//!
//! let refresh = issuer.issue_refresh_token("user123").unwrap();
//! assert!(issuer.validate_access_token(&refresh.token).is_err());
//! ```

pub mod digest;
pub mod jwt;
pub mod password;
pub mod tokens;

// Re-export commonly used items
pub use digest::token_digest;
pub use jwt::AccessClaims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::RefreshClaims;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use tokens::IssuedToken;
pub use tokens::TokenIssuer;
