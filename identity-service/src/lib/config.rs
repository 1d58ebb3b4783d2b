use std::env;
use std::time::Duration;

use config::builder::ConfigBuilder as Builder;
use config::builder::DefaultState;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Signing secret used when none is configured.
pub const PLACEHOLDER_SECRET: &str = "secret";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    /// Marks auth cookies `Secure`; leave off for plain-http development.
    pub secure_cookies: bool,
    pub operation_timeout_secs: u64,
}

impl ServerConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

impl JwtConfig {
    pub fn access_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.access_ttl_minutes)
    }

    pub fn refresh_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.refresh_ttl_days)
    }

    /// Names of the secrets still set to the placeholder value.
    pub fn placeholder_secrets(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.access_secret == PLACEHOLDER_SECRET {
            names.push("jwt.access_secret");
        }
        if self.refresh_secret == PLACEHOLDER_SECRET {
            names.push("jwt.refresh_secret");
        }
        names
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// Exact origins, or `*` to mirror whatever origin calls.
    pub allow_origins: Vec<String>,
    pub allow_credentials: bool,
}

fn with_defaults() -> Result<Builder<DefaultState>, ConfigError> {
    ConfigBuilder::builder()
        .set_default("database.max_connections", 5)?
        .set_default("server.http_port", 8000)?
        .set_default("server.secure_cookies", false)?
        .set_default("server.operation_timeout_secs", 5)?
        .set_default("jwt.access_secret", PLACEHOLDER_SECRET)?
        .set_default("jwt.refresh_secret", PLACEHOLDER_SECRET)?
        .set_default("jwt.access_ttl_minutes", 15)?
        .set_default("jwt.refresh_ttl_days", 7)?
        .set_default("cors.allow_origins", vec!["*"])?
        .set_default("cors.allow_credentials", true)
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__ACCESS_SECRET, etc.)
    /// 2. Environment-specific config file (config/{RUN_MODE}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        with_defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // DATABASE__URL=postgres://... overrides database.url
            .add_source(
                Environment::default()
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allow_origins")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Parse a TOML document layered over the built-in defaults.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        with_defaults()?
            .add_source(File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
