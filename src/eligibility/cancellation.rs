//! Cancellation eligibility
//!
//! Mirrors the registration chain with its own cutoff window. Events that
//! are concluded or canceled cannot have registrations withdrawn; the
//! backend already resolved those registrations.

use chrono::{DateTime, Utc};

use super::{
    has_permission, DenialReason, EligibilityDetails, EligibilityResult, CANCELLATION_CUTOFF,
};
use crate::models::{EventSnapshot, EventStatus, ParticipationStatus, Permission, UserSnapshot};

/// Decide whether `user` may cancel their registration for `event` at
/// instant `now`
pub fn check_cancellation(
    event: &EventSnapshot,
    user: &UserSnapshot,
    status: &ParticipationStatus,
    now: DateTime<Utc>,
) -> EligibilityResult {
    if event.current_participants < 0 {
        return EligibilityResult::denied(DenialReason::InvalidEventData);
    }
    if user.authenticated && user.id <= 0 {
        return EligibilityResult::denied(DenialReason::InvalidUserData);
    }

    if !user.authenticated {
        return EligibilityResult::denied(DenialReason::NotAuthenticated);
    }

    if !status.is_registered {
        return EligibilityResult::denied(DenialReason::NotRegistered);
    }

    match event.status {
        EventStatus::Concluded => {
            return EligibilityResult::denied(DenialReason::EventConcluded);
        }
        EventStatus::CanceledByOrganizer | EventStatus::CanceledByAdmin => {
            return EligibilityResult::denied(DenialReason::EventCanceled);
        }
        _ => {}
    }

    let late_ok = has_permission(user, Permission::LateCancellation);
    let deadline = event.start_time - CANCELLATION_CUTOFF;

    if event.status == EventStatus::InProgress && !late_ok {
        return EligibilityResult::denied(DenialReason::EventInProgress);
    }

    if event.has_started(now) && !late_ok {
        return EligibilityResult::denied(DenialReason::EventPastStartTime);
    }

    if now >= deadline && !late_ok {
        return EligibilityResult::denied_with(
            DenialReason::CancellationClosed,
            EligibilityDetails {
                available_spots: event.available_spots(),
                deadline: Some(deadline),
            },
        );
    }

    EligibilityResult::allowed(EligibilityDetails {
        available_spots: event.available_spots(),
        deadline: Some(deadline),
    })
}
