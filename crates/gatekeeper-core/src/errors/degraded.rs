use std::fmt;

use super::Evidence;
use crate::models::{DegradationReason, ServiceTier};

/// Supporting infrastructure is unavailable.
///
/// Fields are read-only once built; `can_proceed` is always computed from the
/// tier, so only community callers may continue in degraded mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedError {
    reason: DegradationReason,
    tier: ServiceTier,
    evidence: Evidence,
}

impl DegradedError {
    pub fn new(reason: DegradationReason, tier: ServiceTier) -> Self {
        Self {
            reason,
            tier,
            evidence: Evidence::new(),
        }
    }

    pub fn reason(&self) -> DegradationReason {
        self.reason
    }

    pub fn tier(&self) -> ServiceTier {
        self.tier
    }

    pub fn can_proceed(&self) -> bool {
        self.tier.can_proceed_degraded()
    }

    pub fn evidence(&self) -> &Evidence {
        &self.evidence
    }

    /// Attach a key-value evidence pair.
    pub fn with_evidence(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.evidence.insert(key.into(), value.to_string());
        self
    }
}

impl fmt::Display for DegradedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "degraded: {} (tier {}, can_proceed={})",
            self.reason,
            self.tier,
            self.can_proceed()
        )?;
        for (k, v) in &self.evidence {
            write!(f, " {}={}", k, v)?;
        }
        Ok(())
    }
}

impl std::error::Error for DegradedError {}
