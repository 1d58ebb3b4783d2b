use async_trait::async_trait;

use crate::domain::errors::HashingError;
use crate::domain::errors::StoreError;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::ListUsersQuery;
use crate::domain::user::models::Page;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Port for user management operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// List users matching `query`, one page at a time.
    ///
    /// # Returns
    /// The requested page plus its pagination metadata
    ///
    /// # Errors
    /// * `Internal` - Store failure or deadline exceeded
    async fn list_users(&self, query: ListUsersQuery) -> Result<Page<User>, UserError>;

    /// Create a member account.
    ///
    /// # Arguments
    /// * `command` - Validated email, username and password
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `Validation` - Email or username already taken (email reported first)
    /// * `Internal` - Hashing or store failure
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `Internal` - Store failure
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Replace a user's email and username.
    ///
    /// Uniqueness is checked against every other user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `Validation` - New email or username belongs to someone else
    /// * `Internal` - Store failure
    async fn update_user(&self, id: &UserId, command: UpdateUserCommand)
        -> Result<User, UserError>;

    /// Permanently remove a user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `Internal` - Store failure
    async fn delete_user(&self, id: &UserId) -> Result<(), UserError>;
}

/// Persistence operations for user aggregate.
///
/// Lookups report a miss as `StoreError::NotFound`; mutations report zero
/// affected rows the same way.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `UniqueViolation` - Email or username collided at insert time
    /// * `Database` - Database operation failed
    async fn create(&self, user: User) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: &UserId) -> Result<User, StoreError>;

    /// Exact, case-sensitive match.
    async fn find_by_username(&self, username: &str) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<User, StoreError>;

    /// Write back email, username and `updated_at`.
    ///
    /// # Errors
    /// * `NotFound` - No row with this id
    /// * `UniqueViolation` - Email or username collided at write time
    /// * `Database` - Database operation failed
    async fn update(&self, user: User) -> Result<User, StoreError>;

    async fn delete(&self, id: &UserId) -> Result<(), StoreError>;

    /// Rows for the page described by `query`.
    async fn list(&self, query: &ListUsersQuery) -> Result<Vec<User>, StoreError>;

    /// Total rows matching the search of `query`, ignoring the window.
    async fn count(&self, query: &ListUsersQuery) -> Result<u64, StoreError>;
}

/// One-way password hashing.
pub trait PasswordHashing: Send + Sync + 'static {
    fn hash_password(&self, password: &str) -> Result<String, HashingError>;

    /// A mismatch is `Ok(false)`; only an unreadable hash is an error.
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, HashingError>;
}
