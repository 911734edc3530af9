//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `ACCOUNT_TRACKER`
//! prefix and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use account_tracker::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().unwrap());
//! ```

mod bus;
mod database;
mod error;
mod redis;
mod server;

pub use bus::BusConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use redis::RedisConfig;
pub use server::ServerConfig;

use serde::Deserialize;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "ACCOUNT_TRACKER";

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL account store)
    pub database: DatabaseConfig,

    /// Redis configuration (broker connection)
    #[serde(default)]
    pub redis: RedisConfig,

    /// Topic routing and delivery
    #[serde(default)]
    pub bus: BusConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads `ACCOUNT_TRACKER__*` variables:
    ///
    /// - `ACCOUNT_TRACKER__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `ACCOUNT_TRACKER__DATABASE__URL=...` -> `database.url = ...`
    /// - `ACCOUNT_TRACKER__BUS__TOPIC_POLICY=per_account`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.bus.validate()?;
        Ok(())
    }
}
