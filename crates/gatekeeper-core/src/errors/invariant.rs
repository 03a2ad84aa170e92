use std::fmt;

use super::Evidence;

/// A hard governance invariant was broken.
///
/// Always propagates to a hard failure regardless of tier. Nothing in the
/// call chain may catch this and turn it into a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Stable invariant identifier.
    pub invariant_id: String,
    pub message: String,
    pub evidence: Evidence,
}

impl InvariantViolation {
    pub fn new(invariant_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            invariant_id: invariant_id.into(),
            message: message.into(),
            evidence: Evidence::new(),
        }
    }

    /// Attach a key-value evidence pair.
    pub fn with_evidence(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.evidence.insert(key.into(), value.to_string());
        self
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invariant {} violated: {}", self.invariant_id, self.message)?;
        for (k, v) in &self.evidence {
            write!(f, " {}={}", k, v)?;
        }
        Ok(())
    }
}

impl std::error::Error for InvariantViolation {}
