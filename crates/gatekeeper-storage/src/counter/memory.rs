//! Process-local block counters on `DashMap`.
//!
//! The entry guard holds the shard lock for the whole read-modify-write, so
//! concurrent increments of one key never lose updates.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use gatekeeper_core::errors::StorageError;
use gatekeeper_core::traits::{BlockCounterStore, Clock};

use super::expiry;

#[derive(Debug, Clone, Copy)]
struct CounterEntry {
    count: u64,
    expires_at: DateTime<Utc>,
}

pub struct InMemoryBlockCounterStore {
    counters: DashMap<String, CounterEntry>,
    clock: Arc<dyn Clock>,
    available: AtomicBool,
}

impl InMemoryBlockCounterStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            counters: DashMap::new(),
            clock,
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the backing store going away (or coming back).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Drop expired counters. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.counters.len();
        self.counters.retain(|_, entry| entry.expires_at > now);
        before - self.counters.len()
    }

    /// Number of live and expired-but-unpurged keys.
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable {
                backend: "in-memory block counter".to_string(),
                message: "store marked unavailable".to_string(),
            })
        }
    }
}

#[async_trait]
impl BlockCounterStore for InMemoryBlockCounterStore {
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, StorageError> {
        self.check_available()?;
        let now = self.clock.now();
        let expires_at = expiry(now, ttl)?;

        let mut entry = self
            .counters
            .entry(key.to_string())
            .or_insert(CounterEntry {
                count: 0,
                expires_at,
            });
        if entry.expires_at <= now {
            entry.count = 0;
            entry.expires_at = expires_at;
        }
        entry.count += 1;
        Ok(entry.count)
    }

    async fn get(&self, key: &str) -> Result<Option<u64>, StorageError> {
        self.check_available()?;
        let now = self.clock.now();
        Ok(self
            .counters
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.count))
    }
}
