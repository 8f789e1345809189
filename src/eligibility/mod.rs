//! Eligibility rules
//!
//! Pure, side-effect-free checks for whether a registration or
//! cancellation is currently allowed, computed from event, user and
//! participation snapshots plus a caller-supplied clock instant.
//!
//! A negative result is an ordinary value with a `reason`, not an error:
//! "the event is full" is an expected business outcome. The server
//! re-validates every mutation; these checks exist so the UI can disable
//! actions and explain why before a round-trip.

pub mod cancellation;
pub mod permissions;
pub mod registration;

pub use cancellation::check_cancellation;
pub use permissions::has_permission;
pub use registration::check_registration;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Registration closes this long before the event starts
pub const REGISTRATION_CUTOFF: Duration = Duration::minutes(30);

/// Cancellation closes this long before the event starts
pub const CANCELLATION_CUTOFF: Duration = Duration::minutes(60);

/// Why an action is not allowed right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialReason {
    AlreadyRegistered,
    NotRegistered,
    EventNotApproved,
    EventCanceled,
    EventConcluded,
    EventInProgress,
    NotPublicEvent,
    EventFull,
    EventPastStartTime,
    RegistrationClosed,
    CancellationClosed,
    NotAuthenticated,
    InsufficientPermissions,
    InvalidEventData,
    InvalidUserData,
}

/// Supporting numbers for an eligibility decision
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EligibilityDetails {
    /// Remaining capacity; None when the event is unlimited
    pub available_spots: Option<i64>,
    /// Last moment the action is still allowed
    pub deadline: Option<DateTime<Utc>>,
}

/// Outcome of an eligibility check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub allowed: bool,
    pub reason: Option<DenialReason>,
    pub details: EligibilityDetails,
}

impl EligibilityResult {
    pub fn allowed(details: EligibilityDetails) -> Self {
        Self {
            allowed: true,
            reason: None,
            details,
        }
    }

    pub fn denied(reason: DenialReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            details: EligibilityDetails::default(),
        }
    }

    pub fn denied_with(reason: DenialReason, details: EligibilityDetails) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            details,
        }
    }
}
