//! User model

use serde::{Deserialize, Serialize};

/// Roles assigned to a user by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    EventManager,
    Organizer,
    Member,
}

/// Fine-grained permissions for participation actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    ParticipatePrivateEvents,
    BypassEventCapacity,
    LateRegistration,
    LateCancellation,
}

/// Point-in-time view of the acting user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: i64,
    pub authenticated: bool,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
}

impl UserSnapshot {
    /// An anonymous (not logged in) user
    pub fn anonymous() -> Self {
        Self {
            id: 0,
            authenticated: false,
            roles: vec![],
            permissions: vec![],
        }
    }

    /// An authenticated user with no special roles or permissions
    pub fn member(id: i64) -> Self {
        Self {
            id,
            authenticated: true,
            roles: vec![Role::Member],
            permissions: vec![],
        }
    }
}
