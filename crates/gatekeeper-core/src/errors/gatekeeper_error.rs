//! The two-kind failure taxonomy.

use super::error_code::{self, GatekeeperErrorCode};
use super::{DegradedError, InvariantViolation, PrivacyError, StorageError};
use crate::constants::{EXIT_DEGRADED, EXIT_HARD_FAILURE};
use crate::models::{DegradationReason, ServiceTier};

/// Top-level error. No component may introduce a third kind, and no
/// component may swallow either kind by returning an empty or default result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatekeeperError {
    #[error("{0}")]
    Invariant(InvariantViolation),

    #[error("{0}")]
    Degraded(DegradedError),
}

pub type GatekeeperResult<T> = Result<T, GatekeeperError>;

impl GatekeeperError {
    /// Whether the caller must hard-fail.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Invariant(_) => true,
            Self::Degraded(d) => !d.can_proceed(),
        }
    }

    /// Process exit code: `1` for hard failures, `2` for a proceedable degradation.
    pub fn exit_code(&self) -> i32 {
        if self.is_fatal() {
            EXIT_HARD_FAILURE
        } else {
            EXIT_DEGRADED
        }
    }

    pub fn as_invariant(&self) -> Option<&InvariantViolation> {
        match self {
            Self::Invariant(v) => Some(v),
            Self::Degraded(_) => None,
        }
    }

    pub fn as_degraded(&self) -> Option<&DegradedError> {
        match self {
            Self::Degraded(d) => Some(d),
            Self::Invariant(_) => None,
        }
    }

    /// Map a backend failure into the taxonomy.
    ///
    /// Uniqueness conflicts are broken invariants; everything else is the
    /// named infrastructure being unavailable for `tier`.
    pub fn from_storage(err: StorageError, reason: DegradationReason, tier: ServiceTier) -> Self {
        match err {
            StorageError::UniqueConstraint { field, value } => Self::Invariant(
                InvariantViolation::new(
                    error_code::UNIQUE_CONSTRAINT,
                    format!("duplicate {field}"),
                )
                .with_evidence("field", field)
                .with_evidence("value", value),
            ),
            other => Self::Degraded(
                DegradedError::new(reason, tier)
                    .with_evidence("error_code", other.error_code())
                    .with_evidence("error", other.to_string()),
            ),
        }
    }
}

impl GatekeeperErrorCode for GatekeeperError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invariant(_) => error_code::INVARIANT_VIOLATION,
            Self::Degraded(_) => error_code::DEGRADED,
        }
    }
}

impl From<InvariantViolation> for GatekeeperError {
    fn from(v: InvariantViolation) -> Self {
        Self::Invariant(v)
    }
}

impl From<DegradedError> for GatekeeperError {
    fn from(d: DegradedError) -> Self {
        Self::Degraded(d)
    }
}

impl From<PrivacyError> for GatekeeperError {
    fn from(e: PrivacyError) -> Self {
        Self::Invariant(e.into_invariant())
    }
}
