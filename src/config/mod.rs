use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// When unset the server keeps users in memory.
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Signing secret for auth tokens. Empty means unconfigured.
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    /// Idle lifetime of server-side session state.
    pub session_ttl_minutes: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default values
            .set_default("environment", "development")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("database.max_connections", 5)?
            .set_default("auth.token_ttl_minutes", 120)?
            .set_default("auth.session_ttl_minutes", 1440)?
            .set_default("auth.cookie_secure", false)?
            // Deployments that predate the APP_ prefix export the secret as PRIVATE_KEY
            .set_default("auth.jwt_secret", env::var("PRIVATE_KEY").unwrap_or_default())?

            // Add in settings from the config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))

            // Add in settings from environment variables (with prefix "APP_")
            // E.g., `APP_SERVER__PORT=5001` would set `Settings.server.port`
            .add_source(
                Environment::with_prefix("app")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        s.try_deserialize()
    }

    /// Fixed settings for tests: in-memory stores and a known secret.
    pub fn new_for_test() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("environment", "test")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.workers", 1)?
            .set_default("database.max_connections", 2)?
            .set_default("auth.jwt_secret", "test_secret")?
            .set_default("auth.token_ttl_minutes", 120)?
            .set_default("auth.session_ttl_minutes", 1440)?
            .set_default("auth.cookie_secure", false)?
            .build()?
            .try_deserialize()
    }
}
