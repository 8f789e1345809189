//! Configuration validation module
//!
//! This module provides validation functions for client configuration
//! to ensure all required settings are properly configured.

use url::Url;

use super::Settings;
use crate::utils::errors::{ClientError, Result};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_api_config(&settings.api)?;
    validate_cache_config(&settings.cache)?;
    validate_sync_config(settings)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate API endpoint configuration
fn validate_api_config(config: &super::ApiConfig) -> Result<()> {
    if config.base_url.is_empty() {
        return Err(ClientError::Config("API base URL is required".to_string()));
    }

    Url::parse(&config.base_url)
        .map_err(|e| ClientError::Config(format!("Invalid API base URL: {}", e)))?;

    if config.timeout_seconds == 0 {
        return Err(ClientError::Config(
            "API timeout must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate cache configuration
fn validate_cache_config(config: &super::CacheConfig) -> Result<()> {
    if config.ttl_ms == 0 {
        return Err(ClientError::Config(
            "Cache TTL must be greater than 0".to_string(),
        ));
    }

    if config.cleanup_interval_ms == 0 {
        return Err(ClientError::Config(
            "Cache cleanup interval must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate tracker configuration
fn validate_sync_config(settings: &Settings) -> Result<()> {
    let config = &settings.sync;

    if config.batch_size == 0 {
        return Err(ClientError::Config(
            "Batch size must be at least 1".to_string(),
        ));
    }

    if config.debounce_ms >= settings.cache.ttl_ms {
        return Err(ClientError::Config(
            "Debounce window must be shorter than the cache TTL".to_string(),
        ));
    }

    if config.polling_enabled && config.poll_interval_ms == 0 {
        return Err(ClientError::Config(
            "Poll interval must be greater than 0 when polling is enabled".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(ClientError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(ClientError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}
