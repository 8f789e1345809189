//! Error classifier
//!
//! Converts any `ClientError` into a `StructuredError`, deterministically.
//! The mapping tables are fixed: the same input always yields the same
//! category, severity and recovery action. This function never fails.

use tracing::debug;
use uuid::Uuid;

use crate::errors::{ErrorCategory, ErrorSeverity, Operation, RecoveryAction, StructuredError};
use crate::utils::errors::ClientError;

const DEFAULT_RETRY_DELAY_MS: u64 = 2_000;
const DEFAULT_MAX_RETRIES: u32 = 3;
const RATE_LIMIT_RETRY_DELAY_MS: u64 = 10_000;

/// Classify a raw error raised during `operation` into the structured
/// taxonomy. The result always carries the operation name and a
/// correlation id in its context.
pub fn classify(error: &ClientError, operation: Operation) -> StructuredError {
    let structured = match error {
        // Already classified upstream: keep as-is, context is merged below
        ClientError::Structured(inner) => inner.clone(),

        ClientError::Api { status, code, message } => match code.as_deref() {
            Some(code) => classify_domain_code(code, *status, operation),
            None => classify_http_status(*status, message.as_deref(), operation),
        },

        ClientError::Http(e) => classify_transport(e, operation),

        ClientError::Serialization(_) => StructuredError::new(
            ErrorCategory::ServerError,
            ErrorSeverity::High,
            message_for(operation, ErrorCategory::ServerError),
            RecoveryAction::Retry,
        )
        .with_code("INVALID_RESPONSE")
        .retryable(DEFAULT_RETRY_DELAY_MS, DEFAULT_MAX_RETRIES),

        ClientError::Config(_) | ClientError::UrlParse(_) | ClientError::InvalidInput(_) => {
            StructuredError::new(
                ErrorCategory::ValidationError,
                ErrorSeverity::Medium,
                message_for(operation, ErrorCategory::ValidationError),
                RecoveryAction::None,
            )
        }
    };

    let result = structured
        .with_context("operation", operation.as_str())
        .with_context("correlation_id", Uuid::new_v4().to_string());

    debug!(
        operation = operation.as_str(),
        category = ?result.category,
        code = result.code.as_deref(),
        "Error classified"
    );

    result
}

/// Fixed per-code mapping for domain error codes. Each code has exactly
/// one outcome.
fn classify_domain_code(code: &str, status: u16, operation: Operation) -> StructuredError {
    match code {
        "already_registered" => StructuredError::new(
            ErrorCategory::BusinessLogicError,
            ErrorSeverity::Medium,
            "You are already registered for this event.",
            RecoveryAction::None,
        )
        .with_code("ALREADY_REGISTERED"),

        "event_full" => StructuredError::new(
            ErrorCategory::BusinessLogicError,
            ErrorSeverity::Medium,
            "This event is full. You can check back later in case a spot frees up.",
            RecoveryAction::None,
        )
        .with_code("EVENT_FULL"),

        "not_registered" => StructuredError::new(
            ErrorCategory::BusinessLogicError,
            ErrorSeverity::Medium,
            "You are not registered for this event.",
            RecoveryAction::None,
        )
        .with_code("NOT_REGISTERED"),

        "event_started" => StructuredError::new(
            ErrorCategory::BusinessLogicError,
            ErrorSeverity::Medium,
            "This event has already started, so registrations can no longer change.",
            RecoveryAction::None,
        )
        .with_code("EVENT_STARTED"),

        "no_permission" => StructuredError::new(
            ErrorCategory::AuthorizationError,
            ErrorSeverity::High,
            "You do not have permission to perform this action.",
            RecoveryAction::ContactSupport,
        )
        .with_code("NO_PERMISSION"),

        // Unknown domain code: fall back to the HTTP status mapping but
        // keep the code for diagnostics
        other => classify_http_status(status, None, operation).with_code(other.to_uppercase()),
    }
}

/// Fixed status -> (category, severity, recovery) table
fn classify_http_status(status: u16, message: Option<&str>, operation: Operation) -> StructuredError {
    let (category, severity, recovery) = match status {
        400 => (ErrorCategory::ValidationError, ErrorSeverity::Medium, RecoveryAction::None),
        401 => (ErrorCategory::AuthenticationError, ErrorSeverity::High, RecoveryAction::LoginAgain),
        403 => (ErrorCategory::AuthorizationError, ErrorSeverity::High, RecoveryAction::ContactSupport),
        404 => (ErrorCategory::ValidationError, ErrorSeverity::Medium, RecoveryAction::RefreshPage),
        408 => (ErrorCategory::TimeoutError, ErrorSeverity::Medium, RecoveryAction::Retry),
        409 | 422 => (ErrorCategory::BusinessLogicError, ErrorSeverity::Medium, RecoveryAction::RefreshPage),
        429 => (ErrorCategory::RateLimitError, ErrorSeverity::Medium, RecoveryAction::WaitAndRetry),
        500 | 502 => (ErrorCategory::ServerError, ErrorSeverity::High, RecoveryAction::Retry),
        503 => (ErrorCategory::MaintenanceError, ErrorSeverity::High, RecoveryAction::WaitAndRetry),
        504 => (ErrorCategory::TimeoutError, ErrorSeverity::High, RecoveryAction::Retry),
        _ => (ErrorCategory::ServerError, ErrorSeverity::High, RecoveryAction::Retry),
    };

    let user_message = message
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| message_for(operation, category).to_string());

    let mut structured = StructuredError::new(category, severity, user_message, recovery)
        .with_code(format!("HTTP_{status}"));

    structured = match category {
        ErrorCategory::RateLimitError | ErrorCategory::MaintenanceError => {
            structured.retryable(RATE_LIMIT_RETRY_DELAY_MS, DEFAULT_MAX_RETRIES)
        }
        ErrorCategory::ServerError | ErrorCategory::TimeoutError => {
            structured.retryable(DEFAULT_RETRY_DELAY_MS, DEFAULT_MAX_RETRIES)
        }
        _ => structured,
    };

    structured
}

/// Transport-level failures: the request never produced a usable response
fn classify_transport(error: &reqwest::Error, operation: Operation) -> StructuredError {
    if error.is_timeout() {
        StructuredError::new(
            ErrorCategory::TimeoutError,
            ErrorSeverity::Medium,
            message_for(operation, ErrorCategory::TimeoutError),
            RecoveryAction::Retry,
        )
        .with_code("REQUEST_TIMEOUT")
        .retryable(DEFAULT_RETRY_DELAY_MS, DEFAULT_MAX_RETRIES)
    } else if error.is_connect() || error.is_request() {
        StructuredError::new(
            ErrorCategory::NetworkError,
            ErrorSeverity::High,
            message_for(operation, ErrorCategory::NetworkError),
            RecoveryAction::CheckConnection,
        )
        .with_code("NETWORK_UNREACHABLE")
        .retryable(DEFAULT_RETRY_DELAY_MS, DEFAULT_MAX_RETRIES)
    } else {
        StructuredError::new(
            ErrorCategory::UnknownError,
            ErrorSeverity::Medium,
            message_for(operation, ErrorCategory::UnknownError),
            RecoveryAction::Retry,
        )
        .retryable(DEFAULT_RETRY_DELAY_MS, DEFAULT_MAX_RETRIES)
    }
}

/// Operation-specific phrasing, falling back to the category default
fn message_for(operation: Operation, category: ErrorCategory) -> &'static str {
    match (operation, category) {
        (Operation::Registration, ErrorCategory::NetworkError) => {
            "Could not reach the server to register you. Check your connection and try again."
        }
        (Operation::Registration, ErrorCategory::TimeoutError) => {
            "Registering took too long. Your registration may not have gone through; please retry."
        }
        (Operation::Registration, ErrorCategory::ServerError) => {
            "Something went wrong on our side while registering you. Please try again."
        }
        (Operation::Cancellation, ErrorCategory::NetworkError) => {
            "Could not reach the server to cancel your registration. Check your connection and try again."
        }
        (Operation::Cancellation, ErrorCategory::TimeoutError) => {
            "Cancelling took too long. Your cancellation may not have gone through; please retry."
        }
        (Operation::Cancellation, ErrorCategory::ServerError) => {
            "Something went wrong on our side while cancelling. Please try again."
        }
        (Operation::StatusCheck, ErrorCategory::NetworkError) => {
            "Could not load participation status. Check your connection."
        }
        (Operation::StatusCheck, ErrorCategory::TimeoutError) => {
            "Loading participation status took too long. Please retry."
        }
        (Operation::Feedback, ErrorCategory::NetworkError) => {
            "Could not send your feedback. Check your connection and try again."
        }
        (_, category) => category_message(category),
    }
}

/// Category-level default messages, never empty
fn category_message(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::NetworkError => "Could not reach the server. Check your connection.",
        ErrorCategory::AuthenticationError => "Your session has expired. Please sign in again.",
        ErrorCategory::AuthorizationError => "You do not have permission to perform this action.",
        ErrorCategory::ValidationError => "The request was invalid. Please review and try again.",
        ErrorCategory::BusinessLogicError => "This action is not possible right now.",
        ErrorCategory::ServerError => "Something went wrong on our side. Please try again.",
        ErrorCategory::TimeoutError => "The request took too long. Please try again.",
        ErrorCategory::RateLimitError => "Too many requests. Please wait a moment and retry.",
        ErrorCategory::MaintenanceError => "The service is under maintenance. Please try again shortly.",
        ErrorCategory::UnknownError => "An unexpected error occurred. Please try again.",
    }
}
