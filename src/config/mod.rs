//! Application configuration.
//!
//! Loaded from YAML files and environment variables; every field has a
//! local-development default.

use serde::Deserialize;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "ALERT_STORE_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "ALERT_STORE";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "ALERT_STORE_LOG";

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name reported in heartbeats.
    pub component_name: String,
    /// Broker configuration.
    pub messaging: MessagingConfig,
    /// Durable store configuration.
    pub storage: StorageConfig,
    /// Live-state cache configuration.
    pub cache: CacheConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            component_name: "alert-store".to_string(),
            messaging: MessagingConfig::default(),
            storage: StorageConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

/// Broker connection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// AMQP connection URL.
    pub url: String,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            url: "amqp://localhost:5672".to_string(),
        }
    }
}

/// Durable store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// MongoDB connection URI.
    pub uri: String,
    /// Database holding the per-chain alert collections.
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "alerts".to_string(),
        }
    }
}

/// Live-state cache configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Redis connection URL.
    pub url: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Sources (later overrides earlier):
    /// 1. `config.yaml` in the current directory (if present)
    /// 2. File named by `ALERT_STORE_CONFIG` (if set)
    /// 3. Environment variables with the `ALERT_STORE__` prefix
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.component_name, "alert-store");
        assert_eq!(config.messaging.url, "amqp://localhost:5672");
        assert_eq!(config.storage.database, "alerts");
        assert_eq!(config.cache.url, "redis://localhost:6379");
    }
}
