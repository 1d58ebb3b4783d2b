//! Adapters binding the `auth` crate to the domain's hashing and signing ports.

use auth::PasswordHasher;
use auth::TokenIssuer;

use crate::domain::auth::errors::TokenError;
use crate::domain::auth::models::SignedToken;
use crate::domain::auth::ports::TokenSigning;
use crate::domain::errors::HashingError;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::PasswordHashing;

impl PasswordHashing for PasswordHasher {
    fn hash_password(&self, password: &str) -> Result<String, HashingError> {
        self.hash(password)
            .map_err(|e| HashingError(e.to_string()))
    }

    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, HashingError> {
        self.verify(password, hash)
            .map_err(|e| HashingError(e.to_string()))
    }
}

fn subject(sub: &str) -> Result<UserId, TokenError> {
    UserId::from_string(sub).map_err(|e| TokenError::Rejected(e.to_string()))
}

impl TokenSigning for TokenIssuer {
    fn issue_access_token(
        &self,
        user_id: &UserId,
        username: &Username,
    ) -> Result<SignedToken, TokenError> {
        TokenIssuer::issue_access_token(self, user_id, username.as_str())
            .map(|issued| SignedToken {
                token: issued.token,
                expires_at: issued.expires_at,
            })
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn issue_refresh_token(&self, user_id: &UserId) -> Result<SignedToken, TokenError> {
        TokenIssuer::issue_refresh_token(self, user_id)
            .map(|issued| SignedToken {
                token: issued.token,
                expires_at: issued.expires_at,
            })
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn validate_access_token(&self, token: &str) -> Result<UserId, TokenError> {
        let claims = TokenIssuer::validate_access_token(self, token)
            .map_err(|e| TokenError::Rejected(e.to_string()))?;
        subject(&claims.sub)
    }

    fn validate_refresh_token(&self, token: &str) -> Result<UserId, TokenError> {
        let claims = TokenIssuer::validate_refresh_token(self, token)
            .map_err(|e| TokenError::Rejected(e.to_string()))?;
        subject(&claims.sub)
    }
}
