//! In-memory counter store for tests, with switches to simulate outages and
//! write conflicts.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::models::SequenceCounter;

use super::error::StoreError;
use super::store::CounterStore;

#[derive(Default)]
pub struct MemoryCounterStore {
    counters: Mutex<HashMap<String, SequenceCounter>>,
    down: AtomicBool,
    pending_conflicts: AtomicU32,
    pending_backend_errors: AtomicU32,
    creates: AtomicUsize,
    mutations: AtomicUsize,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counter(kind: &str, prefix: &str, width: i32, last_value: i64) -> Self {
        let store = Self::new();
        let now = Utc::now();
        store.lock().insert(
            kind.to_string(),
            SequenceCounter {
                entity_kind: kind.to_string(),
                prefix: prefix.to_string(),
                padding_width: width,
                last_value,
                created_at: now,
                updated_at: now,
            },
        );
        store
    }

    /// While down, every call fails with `Unavailable` and nothing changes.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// The next `n` increments fail with `Conflict` before touching anything.
    pub fn inject_conflicts(&self, n: u32) {
        self.pending_conflicts.store(n, Ordering::SeqCst);
    }

    /// The next `n` increments fail with `Backend` before touching anything.
    pub fn inject_backend_errors(&self, n: u32) {
        self.pending_backend_errors.store(n, Ordering::SeqCst);
    }

    pub fn last_value(&self, kind: &str) -> Option<i64> {
        self.lock().get(kind).map(|c| c.last_value)
    }

    pub fn counter_count(&self) -> usize {
        self.lock().len()
    }

    /// Number of successful `create` calls.
    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    /// Number of calls that changed stored state.
    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SequenceCounter>> {
        self.counters.lock().unwrap()
    }

    fn check_up(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }

    fn take_one(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment(&self, kind: &str) -> Result<Option<i64>, StoreError> {
        // Give other tasks a chance to interleave, as a network round trip would.
        tokio::task::yield_now().await;
        self.check_up()?;
        if Self::take_one(&self.pending_conflicts) {
            return Err(StoreError::Conflict("could not serialize access".to_string()));
        }
        if Self::take_one(&self.pending_backend_errors) {
            return Err(StoreError::Backend("relation does not exist".to_string()));
        }

        let mut counters = self.lock();
        let Some(counter) = counters.get_mut(kind) else {
            return Ok(None);
        };
        counter.last_value += 1;
        counter.updated_at = Utc::now();
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(Some(counter.last_value))
    }

    async fn create(&self, kind: &str, prefix: &str, width: usize) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.check_up()?;

        let mut counters = self.lock();
        if counters.contains_key(kind) {
            return Err(StoreError::AlreadyExists);
        }
        let now = Utc::now();
        counters.insert(
            kind.to_string(),
            SequenceCounter {
                entity_kind: kind.to_string(),
                prefix: prefix.to_string(),
                padding_width: width as i32,
                last_value: 0,
                created_at: now,
                updated_at: now,
            },
        );
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SequenceCounter>, StoreError> {
        self.check_up()?;
        let mut counters: Vec<SequenceCounter> = self.lock().values().cloned().collect();
        counters.sort_by(|a, b| a.entity_kind.cmp(&b.entity_kind));
        Ok(counters)
    }
}
