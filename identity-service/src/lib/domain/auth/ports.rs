use async_trait::async_trait;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::TokenError;
use crate::domain::auth::models::Credentials;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::RefreshToken;
use crate::domain::auth::models::SignedToken;
use crate::domain::errors::StoreError;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;

/// Port for authentication flows.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Exchange a username and password for a fresh token pair.
    ///
    /// # Errors
    /// * `Unauthorized` - Unknown username or wrong password (same message)
    /// * `Internal` - Store, hashing or signing failure
    async fn login(&self, command: LoginCommand) -> Result<Credentials, AuthError>;

    /// Create a member account. Does not log the user in.
    ///
    /// # Errors
    /// * `Validation` - Email or username already taken (email reported first)
    /// * `Internal` - Store or hashing failure
    async fn register(&self, command: CreateUserCommand) -> Result<(), AuthError>;

    /// Rotate a refresh token: the presented token is consumed and a new
    /// pair is issued.
    ///
    /// # Errors
    /// * `Unauthorized` - Token is forged, expired, unknown or already used
    /// * `Internal` - Store or signing failure; no new token is issued
    async fn refresh(&self, refresh_token: &str) -> Result<Credentials, AuthError>;

    /// Revoke a refresh token. Unknown tokens are not an error.
    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError>;

    /// Resolve an access token to the user it was issued for.
    ///
    /// # Errors
    /// * `Unauthorized` - Token invalid or user no longer exists
    /// * `Internal` - Store failure
    async fn authenticate(&self, access_token: &str) -> Result<User, AuthError>;
}

/// Persistence operations for refresh token records.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync + 'static {
    async fn create(&self, token: RefreshToken) -> Result<RefreshToken, StoreError>;

    /// # Errors
    /// * `NotFound` - No record carries this digest
    async fn find_by_hash(&self, token_hash: &str) -> Result<RefreshToken, StoreError>;

    /// Single-statement delete; exactly one of several concurrent callers
    /// sees `Ok`.
    ///
    /// # Errors
    /// * `NotFound` - Zero rows affected
    async fn delete_by_hash(&self, token_hash: &str) -> Result<(), StoreError>;
}

/// Signing and validation of access and refresh tokens.
pub trait TokenSigning: Send + Sync + 'static {
    fn issue_access_token(
        &self,
        user_id: &UserId,
        username: &Username,
    ) -> Result<SignedToken, TokenError>;

    fn issue_refresh_token(&self, user_id: &UserId) -> Result<SignedToken, TokenError>;

    fn validate_access_token(&self, token: &str) -> Result<UserId, TokenError>;

    fn validate_refresh_token(&self, token: &str) -> Result<UserId, TokenError>;
}
