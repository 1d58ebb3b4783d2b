use std::sync::Arc;

use auth::PasswordHasher;
use clap::Parser;
use identity_service::config::Config;
use identity_service::outbound::repositories::PostgresUserRepository;
use identity_service::seeder::factory_accounts;
use identity_service::seeder::fixed_accounts;
use identity_service::seeder::UserSeeder;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Seed the user store with development accounts.
#[derive(Debug, Parser)]
#[command(name = "seeder", version)]
struct Args {
    /// Generate accounts instead of the fixed admin/member set
    #[arg(long)]
    factory: bool,

    /// Number of accounts to generate in factory mode
    #[arg(long, default_value_t = 10)]
    users: usize,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::load()?;

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;

    sqlx::migrate!("./migrations").run(&pg_pool).await?;

    let accounts = if args.factory {
        tracing::info!(users = args.users, "Seeding generated users");
        factory_accounts(args.users)
    } else {
        tracing::info!("Seeding fixed users");
        fixed_accounts()
    };

    let seeder = UserSeeder::new(
        Arc::new(PostgresUserRepository::new(pg_pool)),
        Arc::new(PasswordHasher::new()),
    );
    seeder.seed(&accounts).await?;

    tracing::info!("Database seeding completed");
    Ok(())
}
