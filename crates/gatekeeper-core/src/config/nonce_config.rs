//! Nonce freshness configuration.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_NONCE_MAX_AGE_SECONDS;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NonceConfig {
    /// Freshness window in seconds. Default: 3600.
    pub max_age_seconds: Option<u64>,
    /// Secret-store parameter holding the freshness window. When set it takes
    /// precedence over `max_age_seconds` and is read on every pooling check.
    pub policy_parameter: Option<String>,
}

impl NonceConfig {
    pub fn effective_max_age_seconds(&self) -> u64 {
        self.max_age_seconds.unwrap_or(DEFAULT_NONCE_MAX_AGE_SECONDS)
    }
}
