use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::Credentials;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::RefreshToken;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::RefreshTokenRepository;
use crate::domain::auth::ports::TokenSigning;
use crate::domain::deadline::with_deadline;
use crate::domain::deadline::DEFAULT_OPERATION_TIMEOUT;
use crate::domain::errors::FieldError;
use crate::domain::errors::StoreError;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::ports::PasswordHashing;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::service::first_conflict;

fn internal(operation: &'static str, err: impl std::fmt::Display) -> AuthError {
    tracing::error!(operation, error = %err, "Authentication dependency failed");
    AuthError::Internal(format!("failed to {}", operation.replace('_', " ")))
}

/// Orchestrates login, registration, refresh rotation and logout.
pub struct AuthService<UR, TR, PH, TS>
where
    UR: UserRepository,
    TR: RefreshTokenRepository,
    PH: PasswordHashing,
    TS: TokenSigning,
{
    users: Arc<UR>,
    tokens: Arc<TR>,
    password_hasher: Arc<PH>,
    signer: Arc<TS>,
    timeout: Duration,
}

impl<UR, TR, PH, TS> AuthService<UR, TR, PH, TS>
where
    UR: UserRepository,
    TR: RefreshTokenRepository,
    PH: PasswordHashing,
    TS: TokenSigning,
{
    pub fn new(users: Arc<UR>, tokens: Arc<TR>, password_hasher: Arc<PH>, signer: Arc<TS>) -> Self {
        Self {
            users,
            tokens,
            password_hasher,
            signer,
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Override the per-operation deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Mint a token pair for `user` and persist the refresh token digest.
    async fn issue_credentials(&self, user: &User) -> Result<Credentials, AuthError> {
        let access = self
            .signer
            .issue_access_token(&user.id, &user.username)
            .map_err(|e| internal("issue_access_token", e))?;
        let refresh = self
            .signer
            .issue_refresh_token(&user.id)
            .map_err(|e| internal("issue_refresh_token", e))?;

        let record = RefreshToken::new(
            user.id,
            ::auth::token_digest(&refresh.token),
            refresh.expires_at,
        );
        self.tokens
            .create(record)
            .await
            .map_err(|e| internal("store_refresh_token", e))?;

        Ok(Credentials {
            access_token: access.token,
            refresh_token: refresh.token,
        })
    }

    async fn login_user(&self, command: LoginCommand) -> Result<Credentials, AuthError> {
        let user = match self.users.find_by_username(&command.username).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                tracing::debug!(username = %command.username, "Login for unknown username");
                return Err(AuthError::invalid_credentials());
            }
            Err(e) => return Err(internal("find_user", e)),
        };

        let matches = self
            .password_hasher
            .verify_password(&command.password, &user.password_hash)
            .map_err(|e| internal("verify_password", e))?;
        if !matches {
            tracing::debug!(user_id = %user.id, "Login with wrong password");
            return Err(AuthError::invalid_credentials());
        }

        let credentials = self.issue_credentials(&user).await?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(credentials)
    }

    async fn register_user(&self, command: CreateUserCommand) -> Result<(), AuthError> {
        if let Some(conflict) =
            first_conflict(&*self.users, &command.email, &command.username, None)
                .await
                .map_err(|e| internal("register_user", e))?
        {
            return Err(AuthError::Validation(vec![conflict]));
        }

        let password_hash = self
            .password_hasher
            .hash_password(command.password.as_str())
            .map_err(|e| internal("hash_password", e))?;

        let user = User::new(command.email, command.username, password_hash, Role::Member);

        let created = self.users.create(user).await.map_err(|e| match e {
            StoreError::UniqueViolation(field) => {
                AuthError::Validation(vec![FieldError::already_exists(&field)])
            }
            other => internal("register_user", other),
        })?;

        tracing::info!(user_id = %created.id, username = %created.username, "User registered");
        Ok(())
    }

    async fn rotate(&self, refresh_token: &str) -> Result<Credentials, AuthError> {
        let subject = self
            .signer
            .validate_refresh_token(refresh_token)
            .map_err(|e| {
                tracing::debug!(error = %e, "Refresh token rejected");
                AuthError::invalid_refresh_token()
            })?;

        let token_hash = ::auth::token_digest(refresh_token);
        let record = match self.tokens.find_by_hash(&token_hash).await {
            Ok(record) => record,
            Err(StoreError::NotFound) => return Err(AuthError::invalid_refresh_token()),
            Err(e) => return Err(internal("find_refresh_token", e)),
        };

        if record.user_id != subject {
            tracing::warn!(user_id = %subject, "Refresh token owner mismatch");
            return Err(AuthError::invalid_refresh_token());
        }

        if record.is_expired(Utc::now()) {
            match self.tokens.delete_by_hash(&token_hash).await {
                Ok(()) | Err(StoreError::NotFound) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to purge expired refresh token");
                }
            }
            return Err(AuthError::invalid_refresh_token());
        }

        let user = match self.users.find_by_id(&record.user_id).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => return Err(AuthError::invalid_refresh_token()),
            Err(e) => return Err(internal("find_user", e)),
        };

        match self.tokens.delete_by_hash(&token_hash).await {
            Ok(()) => {}
            Err(StoreError::NotFound) => {
                tracing::debug!(user_id = %user.id, "Refresh token already consumed");
                return Err(AuthError::invalid_refresh_token());
            }
            Err(e) => return Err(internal("delete_refresh_token", e)),
        }

        let credentials = self.issue_credentials(&user).await?;
        tracing::info!(user_id = %user.id, "Refresh token rotated");
        Ok(credentials)
    }

    async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError> {
        let token_hash = ::auth::token_digest(refresh_token);
        match self.tokens.delete_by_hash(&token_hash).await {
            Ok(()) => {
                tracing::info!("Refresh token revoked");
                Ok(())
            }
            Err(StoreError::NotFound) => Ok(()),
            Err(e) => Err(internal("delete_refresh_token", e)),
        }
    }

    async fn resolve(&self, access_token: &str) -> Result<User, AuthError> {
        let user_id = self
            .signer
            .validate_access_token(access_token)
            .map_err(|e| {
                tracing::debug!(error = %e, "Access token rejected");
                AuthError::unauthorized()
            })?;

        match self.users.find_by_id(&user_id).await {
            Ok(user) => Ok(user),
            Err(StoreError::NotFound) => Err(AuthError::unauthorized()),
            Err(e) => Err(internal("find_user", e)),
        }
    }
}

#[async_trait]
impl<UR, TR, PH, TS> AuthServicePort for AuthService<UR, TR, PH, TS>
where
    UR: UserRepository,
    TR: RefreshTokenRepository,
    PH: PasswordHashing,
    TS: TokenSigning,
{
    async fn login(&self, command: LoginCommand) -> Result<Credentials, AuthError> {
        with_deadline("login", self.timeout, self.login_user(command)).await
    }

    async fn register(&self, command: CreateUserCommand) -> Result<(), AuthError> {
        with_deadline("register", self.timeout, self.register_user(command)).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Credentials, AuthError> {
        with_deadline("refresh", self.timeout, self.rotate(refresh_token)).await
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        with_deadline("logout", self.timeout, self.revoke(refresh_token)).await
    }

    async fn authenticate(&self, access_token: &str) -> Result<User, AuthError> {
        with_deadline("authenticate", self.timeout, self.resolve(access_token)).await
    }
}
