//! Structured error taxonomy
//!
//! Every failure surfaced to a UI is one of these tagged records, produced
//! by the classifier. Call sites never inspect raw transport errors.

pub mod classifier;

pub use classifier::classify;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Closed set of failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    NetworkError,
    AuthenticationError,
    AuthorizationError,
    ValidationError,
    BusinessLogicError,
    ServerError,
    TimeoutError,
    RateLimitError,
    MaintenanceError,
    UnknownError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// What the UI should offer the user after this error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecoveryAction {
    Retry,
    RefreshPage,
    LoginAgain,
    ContactSupport,
    WaitAndRetry,
    CheckConnection,
    None,
}

/// The operation during which an error occurred, used to specialize the
/// user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Registration,
    Cancellation,
    StatusCheck,
    Feedback,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Registration => "registration",
            Operation::Cancellation => "cancellation",
            Operation::StatusCheck => "status_check",
            Operation::Feedback => "feedback",
        }
    }
}

/// Normalized representation of any failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredError {
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    /// Machine-readable identifier, e.g. `HTTP_404` or `EVENT_FULL`
    pub code: Option<String>,
    /// Human-readable message, never empty
    pub user_message: String,
    pub recovery_action: RecoveryAction,
    pub can_retry: bool,
    /// Present iff `can_retry`
    pub retry_delay_ms: Option<u64>,
    /// Present iff `can_retry`
    pub max_retries: Option<u32>,
    /// Operation name, correlation id and relevant entity ids
    pub context: HashMap<String, String>,
}

impl StructuredError {
    pub fn new(
        category: ErrorCategory,
        severity: ErrorSeverity,
        user_message: impl Into<String>,
        recovery_action: RecoveryAction,
    ) -> Self {
        Self {
            category,
            severity,
            code: None,
            user_message: user_message.into(),
            recovery_action,
            can_retry: false,
            retry_delay_ms: None,
            max_retries: None,
            context: HashMap::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn retryable(mut self, delay_ms: u64, max_retries: u32) -> Self {
        self.can_retry = true;
        self.retry_delay_ms = Some(delay_ms);
        self.max_retries = Some(max_retries);
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.category, self.user_message)
    }
}
