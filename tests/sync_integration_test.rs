//! Integration tests for the bulk fetcher and the participation tracker
//!
//! These run against the scripted in-memory transport in `helpers`, so
//! every network outcome is controlled and the concurrency bound is
//! observable.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;

use ifmeetup_client::config::SyncConfig;
use ifmeetup_client::{
    BulkStatusFetcher, CacheKey, ErrorCategory, ParticipationTracker, StatusCache, StatusPatch,
};

use helpers::{snapshot, MockApi};

const USER_ID: i64 = 42;

fn test_sync_config() -> SyncConfig {
    SyncConfig {
        batch_size: 5,
        debounce_ms: 20,
        poll_interval_ms: 60,
        polling_enabled: false,
    }
}

fn fetcher_with(api: Arc<MockApi>) -> (BulkStatusFetcher, Arc<StatusCache>) {
    let cache = Arc::new(StatusCache::with_default_ttl());
    let fetcher = BulkStatusFetcher::new(api, cache.clone(), 5);
    (fetcher, cache)
}

#[tokio::test]
async fn empty_input_makes_no_network_calls() {
    let api = Arc::new(MockApi::new());
    let (fetcher, _cache) = fetcher_with(api.clone());

    let outcome = fetcher.fetch_statuses(&[], USER_ID).await;

    assert!(outcome.statuses.is_empty());
    assert!(outcome.error.is_none());
    assert_eq!(api.status_calls(), 0);
}

#[tokio::test]
async fn batch_returns_one_entry_per_id_even_under_total_failure() {
    let api = Arc::new(MockApi::new());
    api.set_fail_all(true);
    let (fetcher, _cache) = fetcher_with(api.clone());

    let ids: Vec<i64> = (1..=12).collect();
    let outcome = fetcher.fetch_statuses(&ids, USER_ID).await;

    assert_eq!(outcome.statuses.len(), 12);
    for id in ids {
        let status = &outcome.statuses[&id];
        assert!(!status.is_registered);
        assert!(!status.can_register);
        assert_eq!(status.participants_count, 0);
    }

    let error = outcome.error.expect("failure must be reported");
    assert_eq!(error.category, ErrorCategory::ServerError);
}

#[tokio::test]
async fn batch_concurrency_never_exceeds_group_size() {
    let api = Arc::new(MockApi::with_delay(Duration::from_millis(20)));
    let (fetcher, _cache) = fetcher_with(api.clone());

    let ids: Vec<i64> = (1..=23).collect();
    let outcome = fetcher.fetch_statuses(&ids, USER_ID).await;

    assert_eq!(outcome.statuses.len(), 23);
    assert_eq!(api.status_calls(), 23);
    assert!(
        api.max_in_flight() <= 5,
        "peak in-flight was {}",
        api.max_in_flight()
    );
}

#[tokio::test]
async fn successful_fetch_populates_shared_cache() {
    let api = Arc::new(MockApi::new());
    api.set_status(3, snapshot(true, 8));
    let (fetcher, cache) = fetcher_with(api.clone());

    fetcher.fetch_statuses(&[3, 4], USER_ID).await;

    let cached = cache
        .get(&CacheKey::new(3, USER_ID))
        .expect("fetched status must be cached");
    assert!(cached.is_registered);
    assert_eq!(cached.participants_count, 8);
    assert!(cache.get(&CacheKey::new(4, USER_ID)).is_some());
}

#[tokio::test]
async fn per_item_failure_does_not_poison_the_batch() {
    let api = Arc::new(MockApi::new());
    api.set_status(1, snapshot(true, 5));
    api.fail_event(2);
    let (fetcher, cache) = fetcher_with(api.clone());

    let outcome = fetcher.fetch_statuses(&[1, 2], USER_ID).await;

    assert!(outcome.statuses[&1].is_registered);
    assert!(!outcome.statuses[&2].is_registered);
    assert!(outcome.error.is_some());
    // Failed items are not cached; the next fetch retries them
    assert!(cache.get(&CacheKey::new(2, USER_ID)).is_none());
}

#[tokio::test]
async fn tracker_debounce_coalesces_rapid_changes() {
    let api = Arc::new(MockApi::new());
    let cache = Arc::new(StatusCache::with_default_ttl());
    let tracker =
        ParticipationTracker::new(api.clone(), cache, USER_ID, test_sync_config());

    tracker.track_events(vec![1]);
    tracker.track_events(vec![1, 2]);
    tracker.track_events(vec![1, 2, 3]);

    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(tracker.statuses().len(), 3);
    // Only the final id set was fetched, once
    assert_eq!(api.status_calls(), 3);
}

#[tokio::test]
async fn tracker_serves_cache_hits_without_refetching() {
    let api = Arc::new(MockApi::new());
    let cache = Arc::new(StatusCache::with_default_ttl());

    let first = ParticipationTracker::new(api.clone(), cache.clone(), USER_ID, test_sync_config());
    first.track_events(vec![1, 2]);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(api.status_calls(), 2);
    drop(first);

    // A second surface over the same cache finds everything warm
    let second = ParticipationTracker::new(api.clone(), cache, USER_ID, test_sync_config());
    second.track_events(vec![1, 2]);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(second.statuses().len(), 2);
    assert_eq!(api.status_calls(), 2);
}

#[tokio::test]
async fn optimistic_update_is_immediate_and_survives_reconciliation() {
    let api = Arc::new(MockApi::new());
    let cache = Arc::new(StatusCache::with_default_ttl());
    let tracker =
        ParticipationTracker::new(api.clone(), cache.clone(), USER_ID, test_sync_config());

    tracker.track_events(vec![7]);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!tracker.status(7).unwrap().is_registered);

    // The user registered; apply the optimistic update and mirror the
    // server state the re-fetch will observe
    tracker.update_local_status(7, StatusPatch::registered());
    api.set_status(7, snapshot(true, 1));

    let optimistic = tracker.status(7).unwrap();
    assert!(optimistic.is_registered);
    assert!(!optimistic.can_register);
    // The cache entry was invalidated so other surfaces re-fetch
    assert!(cache.get(&CacheKey::new(7, USER_ID)).is_none());

    tracker.refresh_event(7).await;

    // No flicker: server confirms, the flag stays set
    let reconciled = tracker.status(7).unwrap();
    assert!(reconciled.is_registered);
    assert_eq!(reconciled.participants_count, 1);
}

#[tokio::test]
async fn fetch_error_keeps_previously_loaded_statuses() {
    let api = Arc::new(MockApi::new());
    api.set_status(1, snapshot(true, 4));
    let cache = Arc::new(StatusCache::with_default_ttl());
    let tracker =
        ParticipationTracker::new(api.clone(), cache, USER_ID, test_sync_config());

    tracker.track_events(vec![1]);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(tracker.status(1).unwrap().is_registered);
    assert!(tracker.last_error().is_none());

    api.set_fail_all(true);
    tracker.refresh_all().await;

    // Stale-but-present beats empty
    assert!(tracker.status(1).unwrap().is_registered);
    assert_eq!(tracker.status(1).unwrap().participants_count, 4);
    assert!(tracker.last_error().is_some());
}

#[tokio::test]
async fn refresh_event_only_touches_that_event() {
    let api = Arc::new(MockApi::new());
    api.set_status(1, snapshot(true, 4));
    api.set_status(2, snapshot(false, 9));
    let cache = Arc::new(StatusCache::with_default_ttl());
    let tracker =
        ParticipationTracker::new(api.clone(), cache, USER_ID, test_sync_config());

    tracker.track_events(vec![1, 2]);
    tokio::time::sleep(Duration::from_millis(100)).await;

    api.set_status(2, snapshot(false, 12));
    tracker.refresh_event(2).await;

    assert_eq!(tracker.status(2).unwrap().participants_count, 12);
    assert_eq!(tracker.status(1).unwrap().participants_count, 4);
    assert!(!tracker.is_event_loading(2));
}

#[tokio::test]
async fn register_applies_optimistic_state() {
    let api = Arc::new(MockApi::new());
    api.set_status(5, snapshot(false, 3));
    let cache = Arc::new(StatusCache::with_default_ttl());
    let tracker =
        ParticipationTracker::new(api.clone(), cache, USER_ID, test_sync_config());

    tracker.track_events(vec![5]);
    tokio::time::sleep(Duration::from_millis(100)).await;

    tracker.register(5).await.expect("registration succeeds");

    let status = tracker.status(5).unwrap();
    assert!(status.is_registered);
    assert!(!status.can_register);
    assert_eq!(status.participants_count, 4);
}

#[tokio::test]
async fn register_failure_surfaces_classified_error() {
    let api = Arc::new(MockApi::new());
    api.set_mutation_error(409, "event_full");
    let cache = Arc::new(StatusCache::with_default_ttl());
    let tracker =
        ParticipationTracker::new(api.clone(), cache, USER_ID, test_sync_config());

    let error = tracker.register(9).await.expect_err("registration fails");

    assert_eq!(error.category, ErrorCategory::BusinessLogicError);
    assert_eq!(error.code.as_deref(), Some("EVENT_FULL"));
    assert!(!error.can_retry);
    assert_matches!(error.context.get("event_id"), Some(id) if id == "9");

    // A failed mutation does not corrupt the tracker state
    assert!(tracker.status(9).is_none());
}

#[tokio::test]
async fn cancel_applies_optimistic_state() {
    let api = Arc::new(MockApi::new());
    api.set_status(5, snapshot(true, 4));
    let cache = Arc::new(StatusCache::with_default_ttl());
    let tracker =
        ParticipationTracker::new(api.clone(), cache, USER_ID, test_sync_config());

    tracker.track_events(vec![5]);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(tracker.status(5).unwrap().is_registered);

    tracker.cancel(5).await.expect("cancellation succeeds");

    assert!(!tracker.status(5).unwrap().is_registered);
}

#[tokio::test]
async fn polling_refreshes_silently() {
    let api = Arc::new(MockApi::new());
    api.set_status(1, snapshot(false, 2));
    let cache = Arc::new(StatusCache::with_default_ttl());
    let config = SyncConfig {
        polling_enabled: true,
        ..test_sync_config()
    };
    let tracker = ParticipationTracker::new(api.clone(), cache, USER_ID, config);

    tracker.track_events(vec![1]);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(tracker.status(1).unwrap().participants_count, 2);

    api.set_status(1, snapshot(false, 6));
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(tracker.status(1).unwrap().participants_count, 6);
    assert!(!tracker.is_loading());

    tracker.stop_polling();
}

#[tokio::test]
async fn subscribers_are_notified_on_change() {
    let api = Arc::new(MockApi::new());
    let cache = Arc::new(StatusCache::with_default_ttl());
    let tracker =
        ParticipationTracker::new(api.clone(), cache, USER_ID, test_sync_config());

    let mut rx = tracker.subscribe();
    let before = *rx.borrow();

    tracker.update_local_status(1, StatusPatch::registered());

    rx.changed().await.expect("sender alive");
    assert!(*rx.borrow() > before);
}

#[tokio::test]
async fn dropping_the_tracker_stops_its_tasks() {
    let api = Arc::new(MockApi::new());
    let cache = Arc::new(StatusCache::with_default_ttl());
    let config = SyncConfig {
        polling_enabled: true,
        ..test_sync_config()
    };
    let tracker = ParticipationTracker::new(api.clone(), cache, USER_ID, config);
    tracker.track_events(vec![1, 2, 3]);
    drop(tracker);

    // Neither the pending debounce load nor the poll ticks may fire
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(api.status_calls(), 0);
}
