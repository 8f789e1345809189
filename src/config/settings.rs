//! Client settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main client configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// REST API endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

/// Participation status cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// How long a cached status stays valid
    pub ttl_ms: u64,
    /// Sweep period for the background cleanup task
    pub cleanup_interval_ms: u64,
}

/// Tracker and bulk-fetch configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Maximum concurrently in-flight status requests per batch
    pub batch_size: usize,
    /// Quiet window before a tracked-id change triggers a bulk fetch
    pub debounce_ms: u64,
    /// Silent refresh period when polling is enabled
    pub poll_interval_ms: u64,
    pub polling_enabled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("ifmeetup").required(false))
            .add_source(config::Environment::with_prefix("IFMEETUP").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::ClientError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "https://api.ifmeetup.example".to_string(),
                timeout_seconds: 10,
            },
            cache: CacheConfig {
                ttl_ms: 30_000,
                cleanup_interval_ms: 30_000,
            },
            sync: SyncConfig {
                batch_size: 5,
                debounce_ms: 300,
                poll_interval_ms: 60_000,
                polling_enabled: false,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
            },
        }
    }
}
