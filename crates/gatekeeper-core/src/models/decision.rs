use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Final machine outcome of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Allow,
    Warn,
    Block,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Allow => "allow",
            Outcome::Warn => "warn",
            Outcome::Block => "block",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionMetadata {
    pub timestamp: DateTime<Utc>,
    pub mode: String,
    /// De-duplicated rule ids seen in the input. Order is not significant.
    pub rules_evaluated: Vec<String>,
}

/// One decision per evaluation. Never mutated after it is handed out;
/// the circuit breaker and degraded path return new values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineDecision {
    pub outcome: Outcome,
    pub reasons: Vec<String>,
    pub metadata: DecisionMetadata,
    /// Set when blocking was suppressed by the circuit breaker or by a
    /// proceedable infrastructure degradation.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
}

impl MachineDecision {
    pub fn is_blocking(&self) -> bool {
        self.outcome == Outcome::Block
    }

    /// Process exit code for this decision: degraded decisions report the
    /// soft "degraded but did not block" status.
    pub fn exit_code(&self) -> i32 {
        if self.degraded {
            crate::constants::EXIT_DEGRADED
        } else if self.is_blocking() {
            crate::constants::EXIT_HARD_FAILURE
        } else {
            crate::constants::EXIT_OK
        }
    }
}
