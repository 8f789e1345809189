//! Permission checks
//!
//! A user holds a permission if it was granted explicitly, or if any of
//! their roles is in the privileged set. The role override is
//! unconditional: an admin passes every permission check, not a curated
//! subset.

use crate::models::{Permission, Role, UserSnapshot};

/// Roles whose holders pass any permission check
pub const PRIVILEGED_ROLES: [Role; 3] = [Role::Admin, Role::EventManager, Role::Organizer];

/// Check whether `user` holds `permission`
pub fn has_permission(user: &UserSnapshot, permission: Permission) -> bool {
    if user.roles.iter().any(|role| PRIVILEGED_ROLES.contains(role)) {
        return true;
    }

    user.permissions.contains(&permission)
}
