//! Data model shared by every Gatekeeper component.

pub mod decision;
pub mod degradation;
pub mod repo;
pub mod thresholds;
pub mod tier;
pub mod trust;
pub mod violation;

pub use decision::{DecisionMetadata, MachineDecision, Outcome};
pub use degradation::DegradationReason;
pub use repo::RepoContext;
pub use thresholds::{ThresholdSet, Thresholds};
pub use tier::ServiceTier;
pub use trust::{
    NonceBinding, OrganizationIdentity, OrganizationReputation, StakePledge,
    VerificationMethod,
};
pub use violation::{LineRange, RuleViolation, Severity, SeverityCounts};
