//! Trust-store backends: identities, reputations, stake pledges, nonce bindings.

pub mod atomic;
pub mod file;
pub mod memory;
pub mod tables;

pub use file::FileTrustStore;
pub use memory::InMemoryTrustStore;
pub use tables::TrustTables;
