use std::time::Duration;

use async_trait::async_trait;

use crate::errors::StorageError;

/// Keyed, TTL-bounded counters. Owns no decision logic.
///
/// `increment` must be an atomic increment-and-read: two concurrent
/// increments of the same key are both reflected in the returned counts.
/// Implementations are treated as slow, fallible remote operations.
#[async_trait]
pub trait BlockCounterStore: Send + Sync {
    /// Increment `key` by one and return the post-increment count.
    /// `ttl` applies when the counter is created.
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, StorageError>;

    /// Current count, or `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> Result<Option<u64>, StorageError>;
}
