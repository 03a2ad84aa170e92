use serde::{Deserialize, Serialize};

/// Blocking limits applied by the decision engine.
///
/// Limits are tolerated counts: a severity blocks only when its count is
/// strictly greater than its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    pub block_on_critical: bool,
    pub max_critical_violations: usize,
    pub max_high_violations: usize,
    pub max_medium_violations: usize,
    pub circuit_breaker_threshold: u64,
    pub strict_mode: bool,
}

impl Thresholds {
    /// Compiled default profile.
    pub const DEFAULT: Thresholds = Thresholds {
        block_on_critical: true,
        max_critical_violations: 0,
        max_high_violations: 3,
        max_medium_violations: 10,
        circuit_breaker_threshold: 10,
        strict_mode: false,
    };

    /// Compiled strict profile. Every limit is equal to or lower than `DEFAULT`.
    pub const STRICT: Thresholds = Thresholds {
        block_on_critical: true,
        max_critical_violations: 0,
        max_high_violations: 0,
        max_medium_violations: 5,
        circuit_breaker_threshold: 10,
        strict_mode: true,
    };

    /// True when `self` is at least as restrictive as `other` on every axis.
    pub fn is_within(&self, other: &Thresholds) -> bool {
        (self.block_on_critical || !other.block_on_critical)
            && self.max_critical_violations <= other.max_critical_violations
            && self.max_high_violations <= other.max_high_violations
            && self.max_medium_violations <= other.max_medium_violations
            && self.circuit_breaker_threshold <= other.circuit_breaker_threshold
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The default and strict profiles, selected per evaluation by the `strict` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub default: Thresholds,
    pub strict: Thresholds,
}

impl ThresholdSet {
    pub fn new(default: Thresholds, strict: Thresholds) -> Self {
        Self { default, strict }
    }

    pub fn select(&self, strict: bool) -> &Thresholds {
        if strict {
            &self.strict
        } else {
            &self.default
        }
    }

    /// The strict profile must never be looser than the default one.
    pub fn is_consistent(&self) -> bool {
        self.strict.is_within(&self.default)
    }
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self::new(Thresholds::DEFAULT, Thresholds::STRICT)
    }
}
