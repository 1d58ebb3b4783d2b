#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::TokenIssuer;
use identity_service::config::CorsConfig;
use identity_service::domain::auth::models::RefreshToken;
use identity_service::domain::auth::ports::RefreshTokenRepository;
use identity_service::domain::auth::service::AuthService;
use identity_service::domain::errors::HashingError;
use identity_service::domain::errors::StoreError;
use identity_service::domain::user::models::EmailAddress;
use identity_service::domain::user::models::ListUsersQuery;
use identity_service::domain::user::models::Role;
use identity_service::domain::user::models::SortDirection;
use identity_service::domain::user::models::User;
use identity_service::domain::user::models::UserId;
use identity_service::domain::user::models::UserOrderBy;
use identity_service::domain::user::models::Username;
use identity_service::domain::user::ports::PasswordHashing;
use identity_service::domain::user::ports::UserRepository;
use identity_service::domain::user::service::UserService;
use identity_service::inbound::http::handlers::auth::cookies::CookieSettings;
use identity_service::inbound::http::router::cors_layer;
use identity_service::inbound::http::router::create_router;
use identity_service::inbound::http::router::AppState;
use serde_json::json;
use serde_json::Value;

pub const ACCESS_SECRET: &[u8] = b"test-access-secret-at-least-32-bytes";
pub const REFRESH_SECRET: &[u8] = b"test-refresh-secret-at-least-32-bytes";
pub const PASSWORD: &str = "password123";

/// User store keeping rows in memory, enforcing the same uniqueness rules
/// as the `users` table.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    fn check_unique(users: &HashMap<UserId, User>, candidate: &User) -> Result<(), StoreError> {
        for existing in users.values().filter(|u| u.id != candidate.id) {
            if existing.email == candidate.email {
                return Err(StoreError::UniqueViolation("email".to_string()));
            }
            if existing.username == candidate.username {
                return Err(StoreError::UniqueViolation("username".to_string()));
            }
        }
        Ok(())
    }

    fn matching(&self, query: &ListUsersQuery) -> Vec<User> {
        let users = self.users.lock().unwrap();
        let term = query.search.as_deref().unwrap_or("").to_lowercase();
        users
            .values()
            .filter(|u| u.username.as_str().to_lowercase().contains(&term))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        Self::check_unique(&users, &user)?;
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<User, StoreError> {
        self.users
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_username(&self, username: &str) -> Result<User, StoreError> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.username.as_str() == username)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email.as_str() == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        if !users.contains_key(&user.id) {
            return Err(StoreError::NotFound);
        }
        Self::check_unique(&users, &user)?;
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: &UserId) -> Result<(), StoreError> {
        self.users
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self, query: &ListUsersQuery) -> Result<Vec<User>, StoreError> {
        let mut users = self.matching(query);
        users.sort_by(|a, b| {
            let ordering = match query.order_by {
                UserOrderBy::Username => a.username.as_str().cmp(b.username.as_str()),
                UserOrderBy::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            let ordering = match query.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            ordering.then_with(|| a.id.0.cmp(&b.id.0))
        });

        Ok(users
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn count(&self, query: &ListUsersQuery) -> Result<u64, StoreError> {
        Ok(self.matching(query).len() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryRefreshTokenRepository {
    tokens: Mutex<HashMap<String, RefreshToken>>,
    fail_deletes: AtomicBool,
}

impl InMemoryRefreshTokenRepository {
    pub fn len(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }

    /// Make every subsequent `delete_by_hash` fail as if the database were down.
    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn create(&self, token: RefreshToken) -> Result<RefreshToken, StoreError> {
        let mut tokens = self.tokens.lock().unwrap();
        if tokens.contains_key(&token.token_hash) {
            return Err(StoreError::UniqueViolation("token_hash".to_string()));
        }
        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<RefreshToken, StoreError> {
        self.tokens
            .lock()
            .unwrap()
            .get(token_hash)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn delete_by_hash(&self, token_hash: &str) -> Result<(), StoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Database("connection refused".to_string()));
        }
        self.tokens
            .lock()
            .unwrap()
            .remove(token_hash)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

/// Reversible stand-in for Argon2 so tests stay fast.
pub struct PlainHasher;

impl PasswordHashing for PlainHasher {
    fn hash_password(&self, password: &str) -> Result<String, HashingError> {
        Ok(format!("plain:{}", password))
    }

    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, HashingError> {
        Ok(hash == format!("plain:{}", password))
    }
}

/// Test application that spawns a real server over in-memory stores
pub struct TestApp {
    pub address: String,
    pub users: Arc<InMemoryUserRepository>,
    pub tokens: Arc<InMemoryRefreshTokenRepository>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let users = Arc::new(InMemoryUserRepository::default());
        let tokens = Arc::new(InMemoryRefreshTokenRepository::default());
        let hasher = Arc::new(PlainHasher);
        let issuer = Arc::new(TokenIssuer::new(ACCESS_SECRET, REFRESH_SECRET));

        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&users),
            Arc::clone(&tokens),
            Arc::clone(&hasher),
            issuer,
        ));
        let user_service = Arc::new(UserService::new(Arc::clone(&users), hasher));

        let state = AppState::new(auth_service, user_service, CookieSettings::default());
        let cors = cors_layer(&CorsConfig {
            allow_origins: vec!["*".to_string()],
            allow_credentials: true,
        });
        let router = create_router(state, cors);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            users,
            tokens,
            api_client: Self::new_client(),
        }
    }

    /// A client with its own cookie jar.
    pub fn new_client() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create reqwest client")
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(self.url(path))
    }

    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(self.url(path))
    }

    /// Insert a user directly into the store, bypassing registration.
    pub async fn insert_user(&self, username: &str, role: Role) -> User {
        let user = User::new(
            EmailAddress::new(format!("{}@example.com", username)).unwrap(),
            Username::new(username.to_string()).unwrap(),
            format!("plain:{}", PASSWORD),
            role,
        );
        self.users.create(user).await.expect("Failed to insert user")
    }

    pub async fn register(&self, email: &str, username: &str) -> reqwest::Response {
        self.post("/register")
            .json(&json!({
                "email": email,
                "username": username,
                "password": PASSWORD,
                "password_confirmation": PASSWORD
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in on the shared client and return the response body.
    pub async fn login(&self, username: &str) -> Value {
        let response = self
            .post("/login")
            .json(&json!({ "username": username, "password": PASSWORD }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.expect("Failed to parse response")
    }

    /// Insert an admin, log in as them and keep their cookies on the shared client.
    pub async fn login_as_admin(&self) -> User {
        let admin = self.insert_user("root", Role::Admin).await;
        self.login("root").await;
        admin
    }
}
