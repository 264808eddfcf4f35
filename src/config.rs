//! Configuration management for Toolcrib server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// The single privileged identity allowed to run administrative operations.
/// Set once at startup, never mutated at runtime.
#[derive(Debug, Deserialize, Clone)]
pub struct OwnerConfig {
    pub identity: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Optional JSON feed file loaded into the equipment table at startup
    pub seed_path: Option<String>,
    /// Upper bound on waiting for a per-equipment write lock
    pub lock_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IdempotencyConfig {
    /// Upper bound on waiting for an in-flight request with the same key
    pub wait_timeout_ms: u64,
    /// Completed entries older than this are pruned; absent means retained
    /// indefinitely
    pub retention_hours: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub owner: OwnerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub idempotency: IdempotencyConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix TOOLCRIB_)
            .add_source(
                Environment::with_prefix("TOOLCRIB")
                    .separator("_")
                    .try_parsing(true),
            )
            // Override owner identity from OWNER_KEY env var if present
            .set_override_option(
                "owner.identity",
                env::var("OWNER_KEY").ok(),
            )?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            owner: OwnerConfig::default(),
            store: StoreConfig::default(),
            idempotency: IdempotencyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for OwnerConfig {
    fn default() -> Self {
        Self {
            identity: "change-this-owner-key-in-production".to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed_path: None,
            lock_timeout_ms: 5000,
        }
    }
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            wait_timeout_ms: 10_000,
            retention_hours: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
