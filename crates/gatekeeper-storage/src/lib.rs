//! # gatekeeper-storage
//!
//! Swappable backends behind the `gatekeeper-core` capability contracts.
//! The decision core never names a concrete type from this crate; callers
//! pick one at wiring time.

pub mod counter;
pub mod secret;
pub mod trust;

pub use counter::{InMemoryBlockCounterStore, SqliteBlockCounterStore};
pub use secret::{FileSecretStore, InMemorySecretStore};
pub use trust::{FileTrustStore, InMemoryTrustStore};

use gatekeeper_core::errors::StorageError;

/// Convert any displayable backend error into a `StorageError::Sqlite`.
pub(crate) fn to_sqlite_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::Sqlite {
        message: e.to_string(),
    }
}
