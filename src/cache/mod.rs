//! Participation status cache
//!
//! This module provides the shared TTL cache that sits between trackers
//! and the REST API, plus a background sweeper that periodically removes
//! expired entries.
//!
//! The cache is an explicitly constructed service: consumers receive an
//! `Arc<StatusCache>` rather than reaching for a global. Several trackers
//! may share one cache; entries are idempotent snapshots keyed by
//! (event, user), so last-write-wins between uncoordinated writers is
//! safe. A tracker that shares a cache with another UI surface sees that
//! surface's optimistic updates no earlier than its own next refresh;
//! staleness across surfaces is bounded by the TTL.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::models::ParticipationStatus;

/// Default validity window for a cached status
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(30_000);

/// Composite cache key: one entry per (event, user) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub event_id: i64,
    pub user_id: i64,
}

impl CacheKey {
    pub fn new(event_id: i64, user_id: i64) -> Self {
        Self { event_id, user_id }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: ParticipationStatus,
    inserted_at: Instant,
}

/// In-memory TTL cache for participation statuses
///
/// Best-effort by design: there are no error paths, and losing the cache
/// only costs extra network round-trips.
#[derive(Debug)]
pub struct StatusCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl StatusCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn with_default_ttl() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached status if it is still within the TTL. Expired
    /// entries behave as misses; reads never mutate the map, expired
    /// entries are left for the periodic sweep.
    pub fn get(&self, key: &CacheKey) -> Option<ParticipationStatus> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let entry = entries.get(key)?;

        if entry.inserted_at.elapsed() < self.ttl {
            Some(entry.data.clone())
        } else {
            None
        }
    }

    /// Store a status with the current timestamp, overwriting any prior
    /// entry for the same key
    pub fn set(&self, key: CacheKey, data: ParticipationStatus) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key,
            CacheEntry {
                data,
                inserted_at: Instant::now(),
            },
        );
        debug!(event_id = key.event_id, user_id = key.user_id, "Status cached");
    }

    /// Explicit invalidation, used after a registration or cancellation
    pub fn delete(&self, key: &CacheKey) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let removed = entries.remove(key).is_some();
        debug!(
            event_id = key.event_id,
            user_id = key.user_id,
            removed = removed,
            "Status cache invalidation"
        );
        removed
    }

    /// Remove every entry past the TTL, returning the number removed
    pub fn cleanup(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| entry.inserted_at.elapsed() < self.ttl);
        before - entries.len()
    }

    /// Number of stored entries, expired ones included until the sweep
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

/// Background sweeper that runs `StatusCache::cleanup` on a fixed
/// interval, so expired entries do not pile up between reads
#[derive(Debug)]
pub struct CacheSweeper {
    cache: std::sync::Arc<StatusCache>,
    interval: Duration,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl CacheSweeper {
    pub fn new(cache: std::sync::Arc<StatusCache>, interval: Duration) -> Self {
        Self {
            cache,
            interval,
            handle: None,
        }
    }

    /// Start the periodic sweep task
    pub fn start(&mut self) {
        if self.handle.is_some() {
            warn!("Cache sweeper is already running");
            return;
        }

        let cache = self.cache.clone();
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The immediate first tick would sweep an empty cache
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let removed = cache.cleanup();
                if removed > 0 {
                    debug!(removed = removed, "Swept expired status cache entries");
                }
            }
        });

        self.handle = Some(handle);
        info!(interval_ms = self.interval.as_millis() as u64, "Started cache sweeper");
    }

    /// Stop the periodic sweep task
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Stopped cache sweeper");
        }
    }
}

impl Drop for CacheSweeper {
    fn drop(&mut self) {
        self.stop();
    }
}
