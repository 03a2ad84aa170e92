use std::fmt;

use serde::{Deserialize, Serialize};

/// Why supporting infrastructure is unavailable. Closed set: no free-form reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DegradationReason {
    /// The block counter backing store (false-positive storm tracking).
    FpStoreUnavailable,
    BaselineMissing,
    NonceParamMissing,
    RuleRegistryLoadFailed,
    ConsentStoreUnavailable,
    CalibrationStoreUnavailable,
}

impl DegradationReason {
    pub const ALL: [DegradationReason; 6] = [
        DegradationReason::FpStoreUnavailable,
        DegradationReason::BaselineMissing,
        DegradationReason::NonceParamMissing,
        DegradationReason::RuleRegistryLoadFailed,
        DegradationReason::ConsentStoreUnavailable,
        DegradationReason::CalibrationStoreUnavailable,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            DegradationReason::FpStoreUnavailable => "FP_STORE_UNAVAILABLE",
            DegradationReason::BaselineMissing => "BASELINE_MISSING",
            DegradationReason::NonceParamMissing => "NONCE_PARAM_MISSING",
            DegradationReason::RuleRegistryLoadFailed => "RULE_REGISTRY_LOAD_FAILED",
            DegradationReason::ConsentStoreUnavailable => "CONSENT_STORE_UNAVAILABLE",
            DegradationReason::CalibrationStoreUnavailable => "CALIBRATION_STORE_UNAVAILABLE",
        }
    }
}

impl fmt::Display for DegradationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
