//! Registration eligibility
//!
//! Short-circuit rule chain: the first failing check determines the
//! denial reason.

use chrono::{DateTime, Utc};

use super::{
    has_permission, DenialReason, EligibilityDetails, EligibilityResult, REGISTRATION_CUTOFF,
};
use crate::models::{EventSnapshot, EventStatus, ParticipationStatus, Permission, UserSnapshot};

/// Decide whether `user` may register for `event` at instant `now`,
/// given their current participation `status`
pub fn check_registration(
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

    if status.is_registered {
        return EligibilityResult::denied(DenialReason::AlreadyRegistered);
    }

    match event.status {
        EventStatus::PendingApproval | EventStatus::Rejected => {
            return EligibilityResult::denied(DenialReason::EventNotApproved);
        }
        EventStatus::CanceledByOrganizer | EventStatus::CanceledByAdmin => {
            return EligibilityResult::denied(DenialReason::EventCanceled);
        }
        EventStatus::Concluded => {
            return EligibilityResult::denied(DenialReason::EventConcluded);
        }
        EventStatus::InProgress => {
            return EligibilityResult::denied(DenialReason::EventInProgress);
        }
        EventStatus::Approved => {}
    }

    if !event.is_public && !has_permission(user, Permission::ParticipatePrivateEvents) {
        return EligibilityResult::denied(DenialReason::NotPublicEvent);
    }

    if event.is_full() && !has_permission(user, Permission::BypassEventCapacity) {
        return EligibilityResult::denied_with(
            DenialReason::EventFull,
            EligibilityDetails {
                available_spots: Some(0),
                deadline: None,
            },
        );
    }

    let late_ok = has_permission(user, Permission::LateRegistration);
    let deadline = event.start_time - REGISTRATION_CUTOFF;

    if event.has_started(now) && !late_ok {
        return EligibilityResult::denied(DenialReason::EventPastStartTime);
    }

    if now >= deadline && !late_ok {
        return EligibilityResult::denied_with(
            DenialReason::RegistrationClosed,
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
