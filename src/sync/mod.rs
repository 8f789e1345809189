//! Participation status synchronization
//!
//! The bulk fetcher and the tracker that together keep a UI surface's
//! view of participation statuses current.

pub mod fetcher;
pub mod tracker;

pub use fetcher::{BulkFetchOutcome, BulkStatusFetcher};
pub use tracker::ParticipationTracker;
