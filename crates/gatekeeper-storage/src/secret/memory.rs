//! In-memory secret store for tests and local runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatekeeper_core::errors::StorageError;
use gatekeeper_core::traits::{SecretStore, SecretValue};

#[derive(Default)]
pub struct InMemorySecretStore {
    values: RwLock<HashMap<String, SecretValue>>,
    fetches: AtomicUsize,
    unavailable: AtomicBool,
    latency: RwLock<Option<Duration>>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(self, name: &str, value: &str) -> Self {
        self.put(name, value, None);
        self
    }

    pub fn put(&self, name: &str, value: &str, last_modified: Option<DateTime<Utc>>) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(
            name.to_string(),
            SecretValue {
                value: value.to_string(),
                last_modified,
            },
        );
    }

    pub fn remove(&self, name: &str) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.remove(name);
    }

    /// Number of `get_parameter` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delay every fetch, to widen race windows in concurrency tests.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write().unwrap_or_else(|e| e.into_inner()) = latency;
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get_parameter(
        &self,
        name: &str,
        _with_decryption: bool,
    ) -> Result<Option<SecretValue>, StorageError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let latency = *self.latency.read().unwrap_or_else(|e| e.into_inner());
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                backend: "in-memory secret store".to_string(),
                message: "store marked unavailable".to_string(),
            });
        }
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(name).cloned())
    }
}
