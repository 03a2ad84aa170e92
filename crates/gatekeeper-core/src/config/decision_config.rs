//! Decision threshold configuration.

use serde::{Deserialize, Serialize};

use crate::models::{ThresholdSet, Thresholds};

/// Partial threshold profile. Unset fields fall back to the compiled profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ThresholdProfile {
    pub block_on_critical: Option<bool>,
    pub max_critical_violations: Option<usize>,
    pub max_high_violations: Option<usize>,
    pub max_medium_violations: Option<usize>,
    pub circuit_breaker_threshold: Option<u64>,
}

impl ThresholdProfile {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Layer this profile over `base`.
    pub fn resolve(&self, base: Thresholds) -> Thresholds {
        Thresholds {
            block_on_critical: self.block_on_critical.unwrap_or(base.block_on_critical),
            max_critical_violations: self
                .max_critical_violations
                .unwrap_or(base.max_critical_violations),
            max_high_violations: self.max_high_violations.unwrap_or(base.max_high_violations),
            max_medium_violations: self
                .max_medium_violations
                .unwrap_or(base.max_medium_violations),
            circuit_breaker_threshold: self
                .circuit_breaker_threshold
                .unwrap_or(base.circuit_breaker_threshold),
            strict_mode: base.strict_mode,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DecisionConfig {
    /// Profile used when an evaluation is not strict.
    pub default: ThresholdProfile,
    /// Profile used for strict evaluations.
    pub strict: ThresholdProfile,
}

impl DecisionConfig {
    pub fn effective_thresholds(&self) -> ThresholdSet {
        ThresholdSet::new(
            self.default.resolve(Thresholds::DEFAULT),
            self.strict.resolve(Thresholds::STRICT),
        )
    }
}
