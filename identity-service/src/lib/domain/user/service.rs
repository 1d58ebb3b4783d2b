use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::deadline::with_deadline;
use crate::domain::deadline::DEFAULT_OPERATION_TIMEOUT;
use crate::domain::errors::FieldError;
use crate::domain::errors::StoreError;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::ListUsersQuery;
use crate::domain::user::models::Page;
use crate::domain::user::models::Pagination;
use crate::domain::user::models::Role;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::PasswordHashing;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Find the first uniqueness collision, checking email before username.
///
/// A row owned by `except` is not a collision. `NotFound` from the store
/// means the value is free.
pub(crate) async fn first_conflict<UR>(
    repository: &UR,
    email: &EmailAddress,
    username: &Username,
    except: Option<&UserId>,
) -> Result<Option<FieldError>, StoreError>
where
    UR: UserRepository + ?Sized,
{
    match repository.find_by_email(email.as_str()).await {
        Ok(existing) if Some(&existing.id) != except => {
            return Ok(Some(FieldError::already_exists("email")))
        }
        Ok(_) | Err(StoreError::NotFound) => {}
        Err(e) => return Err(e),
    }

    match repository.find_by_username(username.as_str()).await {
        Ok(existing) if Some(&existing.id) != except => {
            Ok(Some(FieldError::already_exists("username")))
        }
        Ok(_) | Err(StoreError::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Log a store failure and hide it behind a caller-safe message.
fn internal(operation: &'static str, err: StoreError) -> UserError {
    tracing::error!(operation, error = %err, "User store operation failed");
    UserError::Internal(format!("failed to {}", operation.replace('_', " ")))
}

/// Domain service implementation for user management.
pub struct UserService<UR, PH>
where
    UR: UserRepository,
    PH: PasswordHashing,
{
    repository: Arc<UR>,
    password_hasher: Arc<PH>,
    timeout: Duration,
}

impl<UR, PH> UserService<UR, PH>
where
    UR: UserRepository,
    PH: PasswordHashing,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `password_hasher` - Hashing for newly created accounts
    pub fn new(repository: Arc<UR>, password_hasher: Arc<PH>) -> Self {
        Self {
            repository,
            password_hasher,
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Override the per-operation deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn list(&self, query: ListUsersQuery) -> Result<Page<User>, UserError> {
        let items = self
            .repository
            .list(&query)
            .await
            .map_err(|e| internal("list_users", e))?;
        let total = self
            .repository
            .count(&query)
            .await
            .map_err(|e| internal("count_users", e))?;

        Ok(Page {
            items,
            pagination: Pagination::new(query.page, query.limit, total),
        })
    }

    async fn create(&self, command: CreateUserCommand) -> Result<User, UserError> {
        if let Some(conflict) =
            first_conflict(&*self.repository, &command.email, &command.username, None)
                .await
                .map_err(|e| internal("create_user", e))?
        {
            return Err(UserError::Validation(vec![conflict]));
        }

        let password_hash = self
            .password_hasher
            .hash_password(command.password.as_str())
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing failed");
                UserError::Internal("failed to create user".to_string())
            })?;

        let user = User::new(command.email, command.username, password_hash, Role::Member);

        let created = self.repository.create(user).await.map_err(|e| match e {
            StoreError::UniqueViolation(field) => {
                UserError::Validation(vec![FieldError::already_exists(&field)])
            }
            other => internal("create_user", other),
        })?;

        tracing::info!(user_id = %created.id, username = %created.username, "User created");
        Ok(created)
    }

    async fn get(&self, id: &UserId) -> Result<User, UserError> {
        self.repository.find_by_id(id).await.map_err(|e| match e {
            StoreError::NotFound => UserError::NotFound(id.to_string()),
            other => internal("get_user", other),
        })
    }

    async fn update(&self, id: &UserId, command: UpdateUserCommand) -> Result<User, UserError> {
        let mut user = self.get(id).await?;

        if let Some(conflict) =
            first_conflict(&*self.repository, &command.email, &command.username, Some(id))
                .await
                .map_err(|e| internal("update_user", e))?
        {
            return Err(UserError::Validation(vec![conflict]));
        }

        user.email = command.email;
        user.username = command.username;
        user.updated_at = Utc::now();

        self.repository.update(user).await.map_err(|e| match e {
            StoreError::NotFound => UserError::NotFound(id.to_string()),
            StoreError::UniqueViolation(field) => {
                UserError::Validation(vec![FieldError::already_exists(&field)])
            }
            other => internal("update_user", other),
        })
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.delete(id).await.map_err(|e| match e {
            StoreError::NotFound => UserError::NotFound(id.to_string()),
            other => internal("delete_user", other),
        })?;

        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}

#[async_trait]
impl<UR, PH> UserServicePort for UserService<UR, PH>
where
    UR: UserRepository,
    PH: PasswordHashing,
{
    async fn list_users(&self, query: ListUsersQuery) -> Result<Page<User>, UserError> {
        with_deadline("list_users", self.timeout, self.list(query)).await
    }

    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError> {
        with_deadline("create_user", self.timeout, self.create(command)).await
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        with_deadline("get_user", self.timeout, self.get(id)).await
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        with_deadline("update_user", self.timeout, self.update(id, command)).await
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        with_deadline("delete_user", self.timeout, self.delete(id)).await
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;

    use super::*;
    use crate::domain::errors::HashingError;
    use crate::domain::user::models::Password;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, StoreError>;
            async fn find_by_id(&self, id: &UserId) -> Result<User, StoreError>;
            async fn find_by_username(&self, username: &str) -> Result<User, StoreError>;
            async fn find_by_email(&self, email: &str) -> Result<User, StoreError>;
            async fn update(&self, user: User) -> Result<User, StoreError>;
            async fn delete(&self, id: &UserId) -> Result<(), StoreError>;
            async fn list(&self, query: &ListUsersQuery) -> Result<Vec<User>, StoreError>;
            async fn count(&self, query: &ListUsersQuery) -> Result<u64, StoreError>;
        }
    }

    mock! {
        pub TestHasher {}

        impl PasswordHashing for TestHasher {
            fn hash_password(&self, password: &str) -> Result<String, HashingError>;
            fn verify_password(&self, password: &str, hash: &str) -> Result<bool, HashingError>;
        }
    }

    fn user(email: &str, username: &str) -> User {
        User::new(
            EmailAddress::new(email.to_string()).unwrap(),
            Username::new(username.to_string()).unwrap(),
            "$argon2id$stub".to_string(),
            Role::Member,
        )
    }

    fn create_command(email: &str, username: &str) -> CreateUserCommand {
        CreateUserCommand::new(
            EmailAddress::new(email.to_string()).unwrap(),
            Username::new(username.to_string()).unwrap(),
            Password::new("password123".to_string()).unwrap(),
        )
    }

    fn hasher() -> MockTestHasher {
        let mut hasher = MockTestHasher::new();
        hasher
            .expect_hash_password()
            .returning(|p| Ok(format!("hashed:{}", p)));
        hasher
    }

    #[tokio::test]
    async fn test_create_user_success() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_email()
            .withf(|email| email == "bob@example.com")
            .times(1)
            .returning(|_| Err(StoreError::NotFound));
        repository
            .expect_find_by_username()
            .withf(|username| username == "bob")
            .times(1)
            .returning(|_| Err(StoreError::NotFound));
        repository
            .expect_create()
            .withf(|user| {
                user.username.as_str() == "bob"
                    && user.password_hash == "hashed:password123"
                    && user.role == Role::Member
            })
            .times(1)
            .returning(Ok);

        let service = UserService::new(Arc::new(repository), Arc::new(hasher()));

        let created = service
            .create_user(create_command("bob@example.com", "bob"))
            .await
            .unwrap();

        assert_eq!(created.email.as_str(), "bob@example.com");
        assert_eq!(created.role, Role::Member);
    }

    #[tokio::test]
    async fn test_create_user_reports_email_before_username() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_email()
            .returning(|_| Ok(user("bob@example.com", "someone")));
        repository.expect_find_by_username().times(0);
        repository.expect_create().times(0);

        let service = UserService::new(Arc::new(repository), Arc::new(MockTestHasher::new()));

        let result = service
            .create_user(create_command("bob@example.com", "bob"))
            .await;

        assert_eq!(
            result,
            Err(UserError::Validation(vec![FieldError::new(
                "email",
                "email already exists"
            )]))
        );
    }

    #[tokio::test]
    async fn test_create_user_duplicate_username() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_email()
            .returning(|_| Err(StoreError::NotFound));
        repository
            .expect_find_by_username()
            .returning(|_| Ok(user("other@example.com", "bob")));
        repository.expect_create().times(0);

        let service = UserService::new(Arc::new(repository), Arc::new(MockTestHasher::new()));

        let result = service
            .create_user(create_command("bob@example.com", "bob"))
            .await;

        assert_eq!(
            result,
            Err(UserError::Validation(vec![FieldError::already_exists(
                "username"
            )]))
        );
    }

    #[tokio::test]
    async fn test_create_user_insert_race_becomes_validation() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_email()
            .returning(|_| Err(StoreError::NotFound));
        repository
            .expect_find_by_username()
            .returning(|_| Err(StoreError::NotFound));
        repository
            .expect_create()
            .returning(|_| Err(StoreError::UniqueViolation("username".to_string())));

        let service = UserService::new(Arc::new(repository), Arc::new(hasher()));

        let result = service
            .create_user(create_command("bob@example.com", "bob"))
            .await;

        assert_eq!(
            result,
            Err(UserError::Validation(vec![FieldError::already_exists(
                "username"
            )]))
        );
    }

    #[tokio::test]
    async fn test_store_failure_is_hidden_as_internal() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_email()
            .returning(|_| Err(StoreError::Database("connection refused".to_string())));

        let service = UserService::new(Arc::new(repository), Arc::new(MockTestHasher::new()));

        let result = service
            .create_user(create_command("bob@example.com", "bob"))
            .await;

        match result {
            Err(UserError::Internal(message)) => assert!(!message.contains("connection")),
            other => panic!("expected internal error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .returning(|_| Err(StoreError::NotFound));

        let service = UserService::new(Arc::new(repository), Arc::new(MockTestHasher::new()));
        let id = UserId::new();

        let result = service.get_user(&id).await;

        assert_eq!(result, Err(UserError::NotFound(id.to_string())));
    }

    #[tokio::test]
    async fn test_update_user_keeps_own_email() {
        let existing = user("bob@example.com", "bob");
        let id = existing.id;

        let mut repository = MockTestUserRepository::new();
        let found = existing.clone();
        repository
            .expect_find_by_id()
            .returning(move |_| Ok(found.clone()));
        let owner = existing.clone();
        repository
            .expect_find_by_email()
            .returning(move |_| Ok(owner.clone()));
        repository
            .expect_find_by_username()
            .returning(|_| Err(StoreError::NotFound));
        repository
            .expect_update()
            .withf(|user| user.username.as_str() == "robert")
            .times(1)
            .returning(Ok);

        let service = UserService::new(Arc::new(repository), Arc::new(MockTestHasher::new()));

        let updated = service
            .update_user(
                &id,
                UpdateUserCommand {
                    email: EmailAddress::new("bob@example.com".to_string()).unwrap(),
                    username: Username::new("robert".to_string()).unwrap(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.username.as_str(), "robert");
        assert_eq!(updated.password_hash, existing.password_hash);
        assert!(updated.updated_at >= existing.updated_at);
    }

    #[tokio::test]
    async fn test_update_user_rejects_other_users_username() {
        let existing = user("bob@example.com", "bob");
        let id = existing.id;

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .returning(move |_| Ok(existing.clone()));
        repository
            .expect_find_by_email()
            .returning(|_| Err(StoreError::NotFound));
        repository
            .expect_find_by_username()
            .returning(|_| Ok(user("carol@example.com", "carol")));
        repository.expect_update().times(0);

        let service = UserService::new(Arc::new(repository), Arc::new(MockTestHasher::new()));

        let result = service
            .update_user(
                &id,
                UpdateUserCommand {
                    email: EmailAddress::new("bob@example.com".to_string()).unwrap(),
                    username: Username::new("carol".to_string()).unwrap(),
                },
            )
            .await;

        assert_eq!(
            result,
            Err(UserError::Validation(vec![FieldError::already_exists(
                "username"
            )]))
        );
    }

    #[tokio::test]
    async fn test_delete_user_not_found() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_delete()
            .returning(|_| Err(StoreError::NotFound));

        let service = UserService::new(Arc::new(repository), Arc::new(MockTestHasher::new()));

        let result = service.delete_user(&UserId::new()).await;

        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_users_builds_pagination() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_list()
            .withf(|query| query.page == 2 && query.limit == 2)
            .returning(|_| Ok(vec![user("c@example.com", "ccc"), user("d@example.com", "ddd")]));
        repository.expect_count().returning(|_| Ok(5));

        let service = UserService::new(Arc::new(repository), Arc::new(MockTestHasher::new()));

        let page = service
            .list_users(ListUsersQuery {
                page: 2,
                limit: 2,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.total_items, 5);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(page.pagination.has_next);
        assert!(page.pagination.has_prev);
    }
}
