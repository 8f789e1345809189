//! Scripted in-memory `ParticipationApi` implementation
//!
//! Holds a mutable server-side view of registrations, can be told to
//! fail specific events or everything, and records the peak number of
//! concurrently in-flight status requests so tests can verify the batch
//! concurrency bound.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use ifmeetup_client::{ClientError, ParticipationApi, ParticipationSnapshot};

#[derive(Default)]
pub struct MockApi {
    /// Server-side state per event
    statuses: Mutex<HashMap<i64, ParticipationSnapshot>>,
    /// Events whose status fetch fails
    failing_events: Mutex<HashSet<i64>>,
    fail_all: AtomicBool,
    /// Scripted (status, domain code) failure for mutations
    mutation_error: Mutex<Option<(u16, String)>>,
    /// Simulated per-request latency
    delay: Mutex<Duration>,

    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    status_calls: AtomicUsize,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        let api = Self::default();
        *api.delay.lock().unwrap() = delay;
        api
    }

    pub fn set_status(&self, event_id: i64, snapshot: ParticipationSnapshot) {
        self.statuses.lock().unwrap().insert(event_id, snapshot);
    }

    pub fn fail_event(&self, event_id: i64) {
        self.failing_events.lock().unwrap().insert(event_id);
    }

    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    pub fn set_mutation_error(&self, status: u16, code: &str) {
        *self.mutation_error.lock().unwrap() = Some((status, code.to_string()));
    }

    /// Peak number of simultaneously in-flight status requests
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Total status requests issued
    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    fn server_error() -> ClientError {
        ClientError::Api {
            status: 500,
            code: None,
            message: None,
        }
    }
}

pub fn snapshot(is_registered: bool, participants_count: i64) -> ParticipationSnapshot {
    ParticipationSnapshot {
        is_registered,
        participants_count,
        can_register: !is_registered,
    }
}

#[async_trait]
impl ParticipationApi for MockApi {
    async fn participation_status(
        &self,
        event_id: i64,
        _user_id: i64,
    ) -> Result<ParticipationSnapshot, ClientError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.status_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_all.load(Ordering::SeqCst)
            || self.failing_events.lock().unwrap().contains(&event_id)
        {
            return Err(Self::server_error());
        }

        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(&event_id)
            .cloned()
            .unwrap_or_else(|| snapshot(false, 0)))
    }

    async fn register(&self, event_id: i64) -> Result<ParticipationSnapshot, ClientError> {
        if let Some((status, code)) = self.mutation_error.lock().unwrap().clone() {
            return Err(ClientError::Api {
                status,
                code: Some(code),
                message: None,
            });
        }

        let mut statuses = self.statuses.lock().unwrap();
        let entry = statuses.entry(event_id).or_insert_with(|| snapshot(false, 0));
        entry.is_registered = true;
        entry.participants_count += 1;
        entry.can_register = false;
        Ok(entry.clone())
    }

    async fn cancel_registration(&self, event_id: i64) -> Result<(), ClientError> {
        if let Some((status, code)) = self.mutation_error.lock().unwrap().clone() {
            return Err(ClientError::Api {
                status,
                code: Some(code),
                message: None,
            });
        }

        let mut statuses = self.statuses.lock().unwrap();
        if let Some(entry) = statuses.get_mut(&event_id) {
            entry.is_registered = false;
            entry.participants_count = (entry.participants_count - 1).max(0);
            entry.can_register = true;
        }
        Ok(())
    }
}
