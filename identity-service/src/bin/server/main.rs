use std::sync::Arc;

use auth::PasswordHasher;
use auth::TokenIssuer;
use identity_service::config::Config;
use identity_service::domain::auth::service::AuthService;
use identity_service::domain::user::service::UserService;
use identity_service::inbound::http::handlers::auth::cookies::CookieSettings;
use identity_service::inbound::http::router::cors_layer;
use identity_service::inbound::http::router::create_router;
use identity_service::inbound::http::router::AppState;
use identity_service::outbound::repositories::PostgresRefreshTokenRepository;
use identity_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        max_connections = config.database.max_connections,
        access_ttl_minutes = config.jwt.access_ttl_minutes,
        refresh_ttl_days = config.jwt.refresh_ttl_days,
        secure_cookies = config.server.secure_cookies,
        "Configuration loaded"
    );

    for name in config.jwt.placeholder_secrets() {
        tracing::warn!(setting = name, "Signing secret left at placeholder value");
    }

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let token_repository = Arc::new(PostgresRefreshTokenRepository::new(pg_pool));
    let password_hasher = Arc::new(PasswordHasher::new());
    let token_issuer = Arc::new(
        TokenIssuer::new(
            config.jwt.access_secret.as_bytes(),
            config.jwt.refresh_secret.as_bytes(),
        )
        .with_ttl(config.jwt.access_ttl(), config.jwt.refresh_ttl()),
    );

    let timeout = config.server.operation_timeout();
    let auth_service = Arc::new(
        AuthService::new(
            Arc::clone(&user_repository),
            token_repository,
            Arc::clone(&password_hasher),
            token_issuer,
        )
        .with_timeout(timeout),
    );
    let user_service =
        Arc::new(UserService::new(user_repository, password_hasher).with_timeout(timeout));

    let state = AppState::new(
        auth_service,
        user_service,
        CookieSettings::new(
            config.server.secure_cookies,
            config.jwt.access_ttl(),
            config.jwt.refresh_ttl(),
        ),
    );
    let application = create_router(state, cors_layer(&config.cors));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server exited successfully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
