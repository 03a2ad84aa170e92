//! Error handling for Gatekeeper.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.
//!
//! Every subsystem error folds into [`GatekeeperError`], which has exactly two
//! kinds: invariant violations (always fatal) and degraded infrastructure
//! (fatal unless the tier may proceed).

pub mod config_error;
pub mod degraded;
pub mod error_code;
pub mod gatekeeper_error;
pub mod invariant;
pub mod privacy_error;
pub mod storage_error;

use std::collections::BTreeMap;

pub use config_error::ConfigError;
pub use degraded::DegradedError;
pub use error_code::GatekeeperErrorCode;
pub use gatekeeper_error::{GatekeeperError, GatekeeperResult};
pub use invariant::InvariantViolation;
pub use privacy_error::PrivacyError;
pub use storage_error::StorageError;

/// Structured diagnostic key → value pairs attached to a failure.
pub type Evidence = BTreeMap<String, String>;
