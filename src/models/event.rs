//! Event model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an event as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    PendingApproval,
    Approved,
    Rejected,
    InProgress,
    Concluded,
    CanceledByOrganizer,
    CanceledByAdmin,
}

impl EventStatus {
    /// True for either cancellation variant
    pub fn is_canceled(&self) -> bool {
        matches!(
            self,
            EventStatus::CanceledByOrganizer | EventStatus::CanceledByAdmin
        )
    }
}

/// Point-in-time view of an event, as consumed by the eligibility rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub id: i64,
    pub title: String,
    pub status: EventStatus,
    pub is_public: bool,
    pub start_time: DateTime<Utc>,
    /// None means unlimited capacity
    pub max_participants: Option<i64>,
    pub current_participants: i64,
}

impl EventSnapshot {
    /// Remaining capacity, if the event is capacity-limited
    pub fn available_spots(&self) -> Option<i64> {
        self.max_participants
            .map(|max| (max - self.current_participants).max(0))
    }

    /// Whether all spots are taken
    pub fn is_full(&self) -> bool {
        match self.max_participants {
            Some(max) => self.current_participants >= max,
            None => false,
        }
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now >= self.start_time
    }
}
