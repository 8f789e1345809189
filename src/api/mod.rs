//! REST API wrapper module

pub mod client;

pub use client::{HttpApiClient, ParticipationApi, ParticipationSnapshot};
