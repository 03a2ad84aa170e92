//! Secret backends.

pub mod file;
pub mod memory;

pub use file::FileSecretStore;
pub use memory::InMemorySecretStore;
