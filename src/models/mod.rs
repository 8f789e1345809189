//! Data models for the IFMeetup client

pub mod event;
pub mod participation;
pub mod user;

pub use event::{EventSnapshot, EventStatus};
pub use participation::{ParticipationStatus, StatusPatch};
pub use user::{Permission, Role, UserSnapshot};
