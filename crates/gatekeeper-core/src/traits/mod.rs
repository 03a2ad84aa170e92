//! Capability contracts. The decision core depends only on these, never on a
//! concrete backend.

pub mod clock;
pub mod counter;
pub mod secret;
pub mod trust;

pub use clock::{Clock, ManualClock, SystemClock};
pub use counter::BlockCounterStore;
pub use secret::{SecretStore, SecretValue};
pub use trust::{IdentityAdapter, NonceBindingStore, ReputationAdapter};
