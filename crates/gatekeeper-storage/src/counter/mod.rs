//! Block counter backends.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryBlockCounterStore;
pub use sqlite::SqliteBlockCounterStore;

use std::time::Duration;

use chrono::{DateTime, Utc};
use gatekeeper_core::errors::StorageError;

/// `now + ttl`, failing instead of saturating on absurd TTLs.
pub(crate) fn expiry(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, StorageError> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|d| now.checked_add_signed(d))
        .ok_or_else(|| StorageError::Unavailable {
            backend: "block-counter".to_string(),
            message: format!("ttl {}s out of range", ttl.as_secs()),
        })
}
