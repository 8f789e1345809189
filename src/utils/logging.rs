//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging
//! utilities for the IFMeetup client.

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::errors::StructuredError;
use crate::utils::errors::Result;

/// Initialize logging based on configuration. Returns the appender guard
/// when file logging is enabled; the caller must keep it alive for the
/// process lifetime.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::new(&config.level);
    let stdout_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    match &config.file_path {
        Some(path) => {
            let file_appender = tracing_appender::rolling::daily(path, "ifmeetup-client.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(stdout_layer)
                .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
                .init();

            info!("Logging initialized with level: {}", config.level);
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stdout_layer)
                .init();

            info!("Logging initialized with level: {}", config.level);
            Ok(None)
        }
    }
}

/// Log a participation action with structured data
pub fn log_participation_action(event_id: i64, user_id: i64, action: &str, success: bool) {
    if success {
        info!(
            event_id = event_id,
            user_id = user_id,
            action = action,
            "Participation action performed"
        );
    } else {
        warn!(
            event_id = event_id,
            user_id = user_id,
            action = action,
            "Participation action failed"
        );
    }
}

/// Log a classified error with its taxonomy fields
pub fn log_structured_error(error: &StructuredError) {
    warn!(
        category = ?error.category,
        severity = ?error.severity,
        code = error.code.as_deref(),
        recovery = ?error.recovery_action,
        can_retry = error.can_retry,
        "Classified error surfaced"
    );
}
