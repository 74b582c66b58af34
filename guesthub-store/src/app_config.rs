use serde::Deserialize;
use std::env;
use std::time::Duration;

use guesthub_core::booking::BookingRules;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub bookings: BookingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Upper bound on any single store call.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 { 5 }
fn default_call_timeout_ms() -> u64 { 3000 }
fn default_run_migrations() -> bool { true }

impl DatabaseConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BookingConfig {
    #[serde(default)]
    pub enforce_checkout_after_checkin: bool,
}

impl BookingConfig {
    pub fn rules(&self) -> BookingRules {
        BookingRules {
            enforce_checkout_after_checkin: self.enforce_checkout_after_checkin,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, e.g. config/production.toml
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Untracked developer overrides
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `GUESTHUB_AUTH__JWT_SECRET=...` sets `auth.jwt_secret`
            .add_source(config::Environment::with_prefix("GUESTHUB").separator("__"))
            .build()?;

        let config: Config = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "auth.jwt_secret must not be empty".to_string(),
            ));
        }
        if self.auth.jwt_expiration_seconds == 0 {
            return Err(config::ConfigError::Message(
                "auth.jwt_expiration_seconds must be positive".to_string(),
            ));
        }
        if self.database.backend == StoreBackend::Postgres && self.database.url.is_empty() {
            return Err(config::ConfigError::Message(
                "database.url is required for the postgres backend".to_string(),
            ));
        }
        Ok(())
    }
}
