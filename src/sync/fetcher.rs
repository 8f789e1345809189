//! Bulk status fetcher
//!
//! Resolves participation statuses for a set of events with bounded
//! request fan-out: ids are partitioned into fixed-size groups, requests
//! within a group run concurrently, and a group must complete before the
//! next one starts. The bound holds whether or not the backend offers a
//! true batch endpoint.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::api::ParticipationApi;
use crate::cache::{CacheKey, StatusCache};
use crate::errors::{classify, Operation, StructuredError};
use crate::models::ParticipationStatus;

/// Result of a bulk fetch: exactly one status per requested event id.
/// Failed items carry `ParticipationStatus::unknown`, and the first
/// failure is reported as a classified error alongside the map.
#[derive(Debug, Default)]
pub struct BulkFetchOutcome {
    pub statuses: HashMap<i64, ParticipationStatus>,
    /// Ids whose entry in `statuses` is a substituted unknown, so callers
    /// holding an earlier snapshot can prefer their stale data
    pub failed_events: HashSet<i64>,
    pub error: Option<StructuredError>,
}

/// Batched status lookups with bounded concurrency
#[derive(Clone)]
pub struct BulkStatusFetcher {
    api: Arc<dyn ParticipationApi>,
    cache: Arc<StatusCache>,
    batch_size: usize,
}

impl BulkStatusFetcher {
    pub fn new(api: Arc<dyn ParticipationApi>, cache: Arc<StatusCache>, batch_size: usize) -> Self {
        Self {
            api,
            cache,
            batch_size: batch_size.max(1),
        }
    }

    /// Fetch a status for every id in `event_ids` (deduplicated by the
    /// caller). Empty input returns immediately without touching the
    /// network. Successful statuses are written into the shared cache
    /// before being returned.
    pub async fn fetch_statuses(&self, event_ids: &[i64], user_id: i64) -> BulkFetchOutcome {
        if event_ids.is_empty() {
            return BulkFetchOutcome::default();
        }

        debug!(
            count = event_ids.len(),
            batch_size = self.batch_size,
            user_id = user_id,
            "Bulk fetching participation statuses"
        );

        let mut statuses = HashMap::with_capacity(event_ids.len());
        let mut failed_events = HashSet::new();
        let mut first_error: Option<StructuredError> = None;

        for group in event_ids.chunks(self.batch_size) {
            let requests = group.iter().map(|&event_id| {
                let api = self.api.clone();
                async move { (event_id, api.participation_status(event_id, user_id).await) }
            });

            for (event_id, result) in join_all(requests).await {
                match result {
                    Ok(snapshot) => {
                        let status = ParticipationStatus::new(
                            event_id,
                            snapshot.is_registered,
                            snapshot.participants_count,
                            snapshot.can_register,
                        );
                        self.cache
                            .set(CacheKey::new(event_id, user_id), status.clone());
                        statuses.insert(event_id, status);
                    }
                    Err(e) => {
                        warn!(event_id = event_id, error = %e, "Status fetch failed, substituting unknown");
                        if first_error.is_none() {
                            first_error = Some(
                                classify(&e, Operation::StatusCheck)
                                    .with_context("event_id", event_id.to_string())
                                    .with_context("user_id", user_id.to_string()),
                            );
                        }
                        // The UI always gets a renderable status per item
                        statuses.insert(event_id, ParticipationStatus::unknown(event_id));
                        failed_events.insert(event_id);
                    }
                }
            }
        }

        BulkFetchOutcome {
            statuses,
            failed_events,
            error: first_error,
        }
    }
}

impl std::fmt::Debug for BulkStatusFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkStatusFetcher")
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}
