//! IFMeetup participation client
//!
//! Client-side participation state engine for the IFMeetup event
//! platform. This library keeps a UI surface's view of event
//! registrations current: a shared TTL status cache, a
//! bounded-concurrency bulk fetcher, a tracker with debounced loads,
//! optimistic updates and optional polling, a deterministic error
//! classifier, and pure eligibility rules for registration and
//! cancellation. All real business decisions (capacity, approval,
//! timing) stay on the server; this crate makes the client's view of
//! them fast and consistent.

pub mod api;
pub mod cache;
pub mod config;
pub mod eligibility;
pub mod errors;
pub mod models;
pub mod sync;
pub mod utils;

// Re-export commonly used types
pub use api::{HttpApiClient, ParticipationApi, ParticipationSnapshot};
pub use cache::{CacheKey, CacheSweeper, StatusCache};
pub use config::Settings;
pub use eligibility::{
    check_cancellation, check_registration, has_permission, DenialReason, EligibilityResult,
};
pub use errors::{classify, ErrorCategory, ErrorSeverity, Operation, RecoveryAction, StructuredError};
pub use models::{EventSnapshot, EventStatus, ParticipationStatus, StatusPatch, UserSnapshot};
pub use sync::{BulkStatusFetcher, ParticipationTracker};
pub use utils::errors::{ClientError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
