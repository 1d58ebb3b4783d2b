//! Development data seeding.
//!
//! Populates the user store either with a fixed set of well-known accounts
//! or with generated ones. Accounts whose email or username is already taken
//! are skipped, so running the seeder twice is harmless.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::deadline::with_deadline;
use crate::domain::deadline::DeadlineExceeded;
use crate::domain::errors::HashingError;
use crate::domain::errors::StoreError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::domain::user::service::first_conflict;
use crate::user::ports::PasswordHashing;
use crate::user::ports::UserRepository;

/// Password given to every seeded account.
pub const DEFAULT_PASSWORD: &str = "password123";

/// Upper bound on a whole seeding run.
pub const SEED_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid seed account {username}: {reason}")]
    InvalidAccount { username: String, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Hashing(#[from] HashingError),

    #[error(transparent)]
    Deadline(#[from] DeadlineExceeded),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedAccount {
    pub email: String,
    pub username: String,
    pub role: Role,
}

impl SeedAccount {
    pub fn new(email: &str, username: &str, role: Role) -> Self {
        Self {
            email: email.to_string(),
            username: username.to_string(),
            role,
        }
    }

    fn generated(role: Role) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        let username = format!("user_{}", &suffix[..10]);
        Self {
            email: format!("{}@example.com", username),
            username,
            role,
        }
    }
}

/// The well-known development accounts.
pub fn fixed_accounts() -> Vec<SeedAccount> {
    vec![
        SeedAccount::new("admin@example.com", "admin", Role::Admin),
        SeedAccount::new("member@example.com", "member", Role::Member),
        SeedAccount::new("alfian@example.com", "alfian57", Role::Member),
    ]
}

/// One generated admin followed by `count - 1` generated members.
pub fn factory_accounts(count: usize) -> Vec<SeedAccount> {
    if count == 0 {
        return Vec::new();
    }

    let mut accounts = Vec::with_capacity(count);
    accounts.push(SeedAccount::generated(Role::Admin));
    accounts.extend((1..count).map(|_| SeedAccount::generated(Role::Member)));
    accounts
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
}

pub struct UserSeeder<UR, PH>
where
    UR: UserRepository,
    PH: PasswordHashing,
{
    users: Arc<UR>,
    password_hasher: Arc<PH>,
    timeout: Duration,
}

impl<UR, PH> UserSeeder<UR, PH>
where
    UR: UserRepository,
    PH: PasswordHashing,
{
    pub fn new(users: Arc<UR>, password_hasher: Arc<PH>) -> Self {
        Self {
            users,
            password_hasher,
            timeout: SEED_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Insert `accounts`, all sharing [`DEFAULT_PASSWORD`].
    ///
    /// Stops at the first store failure; accounts created before it stay.
    pub async fn seed(&self, accounts: &[SeedAccount]) -> Result<SeedReport, SeedError> {
        tracing::info!(accounts = accounts.len(), "Starting user seeding");

        let report = with_deadline("seed_users", self.timeout, self.seed_all(accounts)).await?;

        tracing::info!(
            created = report.created,
            skipped = report.skipped,
            "User seeding completed"
        );
        Ok(report)
    }

    async fn seed_all(&self, accounts: &[SeedAccount]) -> Result<SeedReport, SeedError> {
        let mut report = SeedReport::default();
        if accounts.is_empty() {
            return Ok(report);
        }

        let password_hash = self.password_hasher.hash_password(DEFAULT_PASSWORD)?;

        for account in accounts {
            let invalid = |reason: String| SeedError::InvalidAccount {
                username: account.username.clone(),
                reason,
            };
            let email =
                EmailAddress::new(account.email.clone()).map_err(|e| invalid(e.to_string()))?;
            let username =
                Username::new(account.username.clone()).map_err(|e| invalid(e.to_string()))?;

            let conflict = first_conflict(self.users.as_ref(), &email, &username, None).await?;
            if let Some(conflict) = conflict {
                tracing::info!(
                    username = %username,
                    field = %conflict.field,
                    "User already exists, skipping"
                );
                report.skipped += 1;
                continue;
            }

            let user = User::new(email, username, password_hash.clone(), account.role);
            match self.users.create(user).await {
                Ok(created) => {
                    tracing::debug!(
                        user_id = %created.id,
                        username = %created.username,
                        "Seeded user"
                    );
                    report.created += 1;
                }
                Err(StoreError::UniqueViolation(field)) => {
                    tracing::info!(
                        username = %account.username,
                        field = %field,
                        "User already exists, skipping"
                    );
                    report.skipped += 1;
                }
                Err(e) => {
                    tracing::error!(
                        username = %account.username,
                        error = %e,
                        "Failed to create user"
                    );
                    return Err(e.into());
                }
            }
        }

        Ok(report)
    }
}
