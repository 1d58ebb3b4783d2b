use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::user::models::UserId;

/// Access and refresh token pair handed to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
}

/// A signed token together with the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Persisted trace of an issued refresh token.
///
/// Only the SHA-256 digest of the token is stored. A record is deleted
/// when it is rotated, revoked, or found expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: UserId,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn new(user_id: UserId, token_hash: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            created_at: Utc::now(),
            expires_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Raw login input. Not validated: an unknown or malformed username is
/// indistinguishable from a wrong password.
#[derive(Clone)]
pub struct LoginCommand {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCommand")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_refresh_token_expiry_boundary() {
        let now = Utc::now();
        let mut record = RefreshToken::new(UserId::new(), "digest".to_string(), now);

        assert!(record.is_expired(now));

        record.expires_at = now + Duration::seconds(1);
        assert!(!record.is_expired(now));
    }

    #[test]
    fn test_login_command_debug_hides_password() {
        let command = LoginCommand {
            username: "alice".to_string(),
            password: "hunter22".to_string(),
        };

        let printed = format!("{:?}", command);
        assert!(printed.contains("alice"));
        assert!(!printed.contains("hunter22"));
    }
}
