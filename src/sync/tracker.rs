//! Participation tracker
//!
//! The reactive source of truth for one UI surface's view of
//! participation statuses. It mediates between the shared cache, the bulk
//! fetcher and optimistic local mutation, and exposes
//! subscribe/query/command methods instead of framework-bound state:
//! consumers watch a generation counter and re-query on change.
//!
//! Debounce, polling and delayed reconciliation are tokio tasks owned by
//! the tracker. They hold only a weak reference to its state and are
//! aborted on drop, so no update can land after the owning surface is
//! torn down.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::ParticipationApi;
use crate::cache::{CacheKey, StatusCache};
use crate::config::SyncConfig;
use crate::errors::{classify, Operation, StructuredError};
use crate::models::{ParticipationStatus, StatusPatch};
use crate::sync::fetcher::BulkStatusFetcher;

/// How long after a successful mutation the server state is re-fetched
/// to reconcile the optimistic update
const RECONCILE_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Default)]
struct TrackerState {
    statuses: HashMap<i64, ParticipationStatus>,
    tracked: Vec<i64>,
    loading: bool,
    loading_events: HashSet<i64>,
    last_error: Option<StructuredError>,
    generation: u64,
}

struct Inner {
    api: Arc<dyn ParticipationApi>,
    cache: Arc<StatusCache>,
    fetcher: BulkStatusFetcher,
    user_id: i64,
    config: SyncConfig,
    state: Mutex<TrackerState>,
    /// One bulk fetch in flight at a time; overlapping triggers are
    /// dropped and picked up by the debounce
    fetch_in_flight: AtomicBool,
    changed: watch::Sender<u64>,
    debounce_handle: Mutex<Option<JoinHandle<()>>>,
    poll_handle: Mutex<Option<JoinHandle<()>>>,
}

/// Client-side participation state controller for one UI surface
pub struct ParticipationTracker {
    inner: Arc<Inner>,
}

impl ParticipationTracker {
    pub fn new(
        api: Arc<dyn ParticipationApi>,
        cache: Arc<StatusCache>,
        user_id: i64,
        config: SyncConfig,
    ) -> Self {
        let fetcher = BulkStatusFetcher::new(api.clone(), cache.clone(), config.batch_size);
        let (changed, _) = watch::channel(0);

        let tracker = Self {
            inner: Arc::new(Inner {
                api,
                cache,
                fetcher,
                user_id,
                config,
                state: Mutex::new(TrackerState::default()),
                fetch_in_flight: AtomicBool::new(false),
                changed,
                debounce_handle: Mutex::new(None),
                poll_handle: Mutex::new(None),
            }),
        };

        if tracker.inner.config.polling_enabled {
            tracker.start_polling();
        }

        tracker
    }

    /// Receive a notification (monotonic generation counter) whenever the
    /// tracker's observable state changes
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.changed.subscribe()
    }

    // ---- queries ------------------------------------------------------

    pub fn status(&self, event_id: i64) -> Option<ParticipationStatus> {
        self.inner.lock_state().statuses.get(&event_id).cloned()
    }

    pub fn statuses(&self) -> HashMap<i64, ParticipationStatus> {
        self.inner.lock_state().statuses.clone()
    }

    /// True while a non-silent bulk fetch is running
    pub fn is_loading(&self) -> bool {
        self.inner.lock_state().loading
    }

    /// True while `event_id` has an individual refresh in flight
    pub fn is_event_loading(&self, event_id: i64) -> bool {
        self.inner.lock_state().loading_events.contains(&event_id)
    }

    /// Latest classified fetch error, if any. Errors never clear
    /// previously loaded statuses.
    pub fn last_error(&self) -> Option<StructuredError> {
        self.inner.lock_state().last_error.clone()
    }

    pub fn tracked_events(&self) -> Vec<i64> {
        self.inner.lock_state().tracked.clone()
    }

    // ---- commands -----------------------------------------------------

    /// Replace the tracked event set. The resulting bulk load is
    /// debounced: rapid successive changes coalesce into one fetch, and
    /// only the most recent set is used.
    pub fn track_events(&self, event_ids: Vec<i64>) {
        let deduped = dedupe(event_ids);
        {
            let mut state = self.inner.lock_state();
            state.tracked = deduped;
        }

        let weak = Arc::downgrade(&self.inner);
        let delay = Duration::from_millis(self.inner.config.debounce_ms);

        let mut handle = self
            .inner
            .debounce_handle
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        // A newer trigger supersedes the pending one
        if let Some(previous) = handle.take() {
            previous.abort();
        }
        *handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.load_tracked(LoadMode::UncachedOnly).await;
            }
        }));
    }

    /// Invalidate cache entries for all tracked events and re-fetch them
    pub async fn refresh_all(&self) {
        let tracked = self.tracked_events();
        for &event_id in &tracked {
            self.inner
                .cache
                .delete(&CacheKey::new(event_id, self.inner.user_id));
        }
        self.inner.load_tracked(LoadMode::Full).await;
    }

    /// Invalidate and re-fetch a single event's status without touching
    /// the others
    pub async fn refresh_event(&self, event_id: i64) {
        let user_id = self.inner.user_id;
        {
            let mut state = self.inner.lock_state();
            state.loading_events.insert(event_id);
        }
        self.inner.notify();

        self.inner.cache.delete(&CacheKey::new(event_id, user_id));

        let result = self.inner.api.participation_status(event_id, user_id).await;

        let mut state = self.inner.lock_state();
        match result {
            Ok(snapshot) => {
                let status = ParticipationStatus::new(
                    event_id,
                    snapshot.is_registered,
                    snapshot.participants_count,
                    snapshot.can_register,
                );
                self.inner
                    .cache
                    .set(CacheKey::new(event_id, user_id), status.clone());
                state.statuses.insert(event_id, status);
            }
            Err(e) => {
                warn!(event_id = event_id, error = %e, "Single-event refresh failed");
                state.last_error = Some(
                    classify(&e, Operation::StatusCheck)
                        .with_context("event_id", event_id.to_string()),
                );
            }
        }
        state.loading_events.remove(&event_id);
        drop(state);
        self.inner.notify();
    }

    /// Merge partial fields into the in-memory status and invalidate the
    /// cache entry. Used for optimistic UI right after a user action
    /// succeeds, before server reconciliation completes.
    pub fn update_local_status(&self, event_id: i64, patch: StatusPatch) {
        {
            let mut state = self.inner.lock_state();
            state
                .statuses
                .entry(event_id)
                .or_insert_with(|| ParticipationStatus::unknown(event_id))
                .apply(&patch);
        }
        self.inner
            .cache
            .delete(&CacheKey::new(event_id, self.inner.user_id));
        self.inner.notify();
    }

    /// Register for an event: API call, optimistic local update, then a
    /// delayed re-fetch to reconcile with server truth. The error, if
    /// any, is returned classified and is not stored as the tracker's
    /// fetch error.
    pub async fn register(&self, event_id: i64) -> Result<(), StructuredError> {
        match self.inner.api.register(event_id).await {
            Ok(snapshot) => {
                info!(event_id = event_id, user_id = self.inner.user_id, "Registered for event");
                self.update_local_status(
                    event_id,
                    StatusPatch {
                        is_registered: Some(true),
                        participants_count: Some(snapshot.participants_count),
                        can_register: Some(false),
                    },
                );
                self.schedule_reconcile(event_id);
                Ok(())
            }
            Err(e) => Err(classify(&e, Operation::Registration)
                .with_context("event_id", event_id.to_string())
                .with_context("user_id", self.inner.user_id.to_string())),
        }
    }

    /// Cancel a registration, mirroring `register`
    pub async fn cancel(&self, event_id: i64) -> Result<(), StructuredError> {
        match self.inner.api.cancel_registration(event_id).await {
            Ok(()) => {
                info!(event_id = event_id, user_id = self.inner.user_id, "Cancelled registration");
                self.update_local_status(event_id, StatusPatch::unregistered());
                self.schedule_reconcile(event_id);
                Ok(())
            }
            Err(e) => Err(classify(&e, Operation::Cancellation)
                .with_context("event_id", event_id.to_string())
                .with_context("user_id", self.inner.user_id.to_string())),
        }
    }

    // ---- polling ------------------------------------------------------

    /// Start the silent periodic refresh of all tracked events. Off by
    /// default: polling many events is costly.
    pub fn start_polling(&self) {
        let mut handle = self
            .inner
            .poll_handle
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if handle.is_some() {
            warn!("Polling is already running");
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        let interval = Duration::from_millis(self.inner.config.poll_interval_ms);

        *handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                match weak.upgrade() {
                    Some(inner) => inner.load_tracked(LoadMode::Silent).await,
                    None => break,
                }
            }
        }));
        info!(interval_ms = self.inner.config.poll_interval_ms, "Started status polling");
    }

    /// Stop the periodic refresh
    pub fn stop_polling(&self) {
        let mut handle = self
            .inner
            .poll_handle
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(task) = handle.take() {
            task.abort();
            info!("Stopped status polling");
        }
    }

    fn schedule_reconcile(&self, event_id: i64) {
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(RECONCILE_DELAY).await;
            if let Some(inner) = weak.upgrade() {
                inner.refresh_one(event_id).await;
            }
        });
    }
}

impl Drop for ParticipationTracker {
    fn drop(&mut self) {
        if let Some(handle) = self
            .inner
            .debounce_handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            handle.abort();
        }
        if let Some(handle) = self
            .inner
            .poll_handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for ParticipationTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock_state();
        f.debug_struct("ParticipationTracker")
            .field("user_id", &self.inner.user_id)
            .field("tracked", &state.tracked.len())
            .field("statuses", &state.statuses.len())
            .field("loading", &state.loading)
            .finish_non_exhaustive()
    }
}

/// Which statuses a bulk load touches, and whether the UI-visible loading
/// flag is raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadMode {
    /// Serve cache hits locally, fetch only the misses (debounced load)
    UncachedOnly,
    /// Fetch every tracked event (refresh_all; cache already invalidated)
    Full,
    /// Fetch every tracked event without raising the loading flag
    Silent,
}

impl Inner {
    fn lock_state(&self) -> std::sync::MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn notify(&self) {
        let generation = {
            let mut state = self.lock_state();
            state.generation += 1;
            state.generation
        };
        // No receivers is fine
        let _ = self.changed.send(generation);
    }

    async fn load_tracked(&self, mode: LoadMode) {
        if self.fetch_in_flight.swap(true, Ordering::SeqCst) {
            debug!("Bulk fetch already in flight, trigger dropped");
            return;
        }

        let tracked = self.lock_state().tracked.clone();

        // Resolve what the cache already has; under Full/Silent the whole
        // set goes to the network
        let mut to_fetch = Vec::with_capacity(tracked.len());
        let mut from_cache = Vec::new();
        for &event_id in &tracked {
            let cached = if mode == LoadMode::UncachedOnly {
                self.cache.get(&CacheKey::new(event_id, self.user_id))
            } else {
                None
            };
            match cached {
                Some(status) => from_cache.push((event_id, status)),
                None => to_fetch.push(event_id),
            }
        }

        debug!(
            mode = ?mode,
            cached = from_cache.len(),
            fetching = to_fetch.len(),
            "Loading tracked statuses"
        );

        if !from_cache.is_empty() {
            let mut state = self.lock_state();
            state.statuses.extend(from_cache);
        }

        if to_fetch.is_empty() {
            self.fetch_in_flight.store(false, Ordering::SeqCst);
            self.notify();
            return;
        }

        if mode != LoadMode::Silent {
            self.lock_state().loading = true;
            self.notify();
        }

        let outcome = self.fetcher.fetch_statuses(&to_fetch, self.user_id).await;

        {
            let mut state = self.lock_state();
            for (event_id, status) in outcome.statuses {
                // Stale-but-present beats a substituted unknown
                if outcome.failed_events.contains(&event_id)
                    && state.statuses.contains_key(&event_id)
                {
                    continue;
                }
                state.statuses.insert(event_id, status);
            }
            if let Some(error) = outcome.error {
                state.last_error = Some(error);
            } else {
                state.last_error = None;
            }
            state.loading = false;
        }
        self.fetch_in_flight.store(false, Ordering::SeqCst);
        self.notify();
    }

    /// Reconciliation refresh used by the post-mutation task
    async fn refresh_one(&self, event_id: i64) {
        self.cache.delete(&CacheKey::new(event_id, self.user_id));
        match self.api.participation_status(event_id, self.user_id).await {
            Ok(snapshot) => {
                let status = ParticipationStatus::new(
                    event_id,
                    snapshot.is_registered,
                    snapshot.participants_count,
                    snapshot.can_register,
                );
                self.cache
                    .set(CacheKey::new(event_id, self.user_id), status.clone());
                self.lock_state().statuses.insert(event_id, status);
                self.notify();
            }
            Err(e) => {
                // Reconciliation is best-effort; the optimistic state stands
                debug!(event_id = event_id, error = %e, "Reconciliation fetch failed");
            }
        }
    }
}

fn dedupe(ids: Vec<i64>) -> Vec<i64> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
