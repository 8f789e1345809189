//! Participation status model
//!
//! `ParticipationStatus` is the unit of state flowing through the cache,
//! the bulk fetcher and the tracker: one snapshot per (event, user) pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's view of their participation in one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipationStatus {
    pub event_id: i64,
    pub is_registered: bool,
    /// Server-reported count of active (non-canceled) registrations
    pub participants_count: i64,
    pub can_register: bool,
    pub last_updated: DateTime<Utc>,
}

impl ParticipationStatus {
    /// Build a status, clamping `can_register` so it is never true while
    /// `is_registered` is true, whatever the server said.
    pub fn new(event_id: i64, is_registered: bool, participants_count: i64, can_register: bool) -> Self {
        Self {
            event_id,
            is_registered,
            participants_count: participants_count.max(0),
            can_register: can_register && !is_registered,
            last_updated: Utc::now(),
        }
    }

    /// Pessimistic placeholder used when a fetch fails: renderable, but
    /// permits no action until a refresh reveals the true state.
    pub fn unknown(event_id: i64) -> Self {
        Self::new(event_id, false, 0, false)
    }

    /// Merge a partial update into this status (optimistic local update)
    pub fn apply(&mut self, patch: &StatusPatch) {
        if let Some(is_registered) = patch.is_registered {
            self.is_registered = is_registered;
        }
        if let Some(count) = patch.participants_count {
            self.participants_count = count.max(0);
        }
        if let Some(can_register) = patch.can_register {
            self.can_register = can_register;
        }
        // Re-clamp: the two flags are mutually exclusive
        if self.is_registered {
            self.can_register = false;
        }
        self.last_updated = Utc::now();
    }
}

/// Partial fields merged into a `ParticipationStatus` by
/// `ParticipationTracker::update_local_status`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusPatch {
    pub is_registered: Option<bool>,
    pub participants_count: Option<i64>,
    pub can_register: Option<bool>,
}

impl StatusPatch {
    pub fn registered() -> Self {
        Self {
            is_registered: Some(true),
            can_register: Some(false),
            ..Default::default()
        }
    }

    pub fn unregistered() -> Self {
        Self {
            is_registered: Some(false),
            ..Default::default()
        }
    }
}
