//! # gatekeeper-core
//!
//! Foundation crate for the Gatekeeper decision core.
//! Defines the data model, capability traits, error taxonomy, config,
//! tracing setup, and constants. Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod tracing;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::GatekeeperConfig;
pub use errors::{
    DegradedError, Evidence, GatekeeperError, GatekeeperResult, InvariantViolation,
};
pub use models::{
    DegradationReason, MachineDecision, Outcome, RepoContext, RuleViolation, ServiceTier,
    Severity, Thresholds,
};
