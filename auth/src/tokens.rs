use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::AccessClaims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::RefreshClaims;

/// A freshly signed token together with its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates the access/refresh token pair.
///
/// Access and refresh tokens are signed with distinct secrets, so a refresh
/// token can never be presented where an access token is expected (and vice
/// versa).
pub struct TokenIssuer {
    access: JwtHandler,
    refresh: JwtHandler,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub const DEFAULT_ACCESS_TTL_MINUTES: i64 = 15;
    pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;

    /// Create a token issuer with the default lifetimes (15 minutes / 7 days).
    ///
    /// # Arguments
    /// * `access_secret` - Secret for signing access tokens
    /// * `refresh_secret` - Secret for signing refresh tokens
    pub fn new(access_secret: &[u8], refresh_secret: &[u8]) -> Self {
        Self {
            access: JwtHandler::new(access_secret),
            refresh: JwtHandler::new(refresh_secret),
            access_ttl: Duration::minutes(Self::DEFAULT_ACCESS_TTL_MINUTES),
            refresh_ttl: Duration::days(Self::DEFAULT_REFRESH_TTL_DAYS),
        }
    }

    /// Override token lifetimes.
    pub fn with_ttl(mut self, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        self.access_ttl = access_ttl;
        self.refresh_ttl = refresh_ttl;
        self
    }

    /// Sign a short-lived access token carrying user id and username.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue_access_token(
        &self,
        user_id: impl ToString,
        username: &str,
    ) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let claims = AccessClaims::new(user_id, username, now, self.access_ttl);
        let token = self.access.encode(&claims)?;

        Ok(IssuedToken {
            token,
            expires_at: now + self.access_ttl,
        })
    }

    /// Sign a long-lived refresh token carrying only the user id.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue_refresh_token(&self, user_id: impl ToString) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let claims = RefreshClaims::new(user_id, now, self.refresh_ttl);
        let token = self.refresh.encode(&claims)?;

        Ok(IssuedToken {
            token,
            expires_at: now + self.refresh_ttl,
        })
    }

    /// Verify an access token and return its claims.
    ///
    /// # Errors
    /// Any `JwtError` decoding variant (malformed, expired, bad signature,
    /// wrong algorithm).
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, JwtError> {
        self.access.decode(token)
    }

    /// Verify a refresh token and return its claims.
    ///
    /// # Errors
    /// Any `JwtError` decoding variant.
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, JwtError> {
        self.refresh.decode(token)
    }
}
