//! Circuit breaker configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BUCKET_TTL_SECONDS, DEFAULT_MAX_BLOCKS_PER_HOUR};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Whether blocking decisions are rate limited at all. Default: true.
    pub enabled: Option<bool>,
    /// Blocks per repository per hour before degrading. Default: 10.
    pub max_blocks_per_hour: Option<u64>,
    /// Counter TTL in seconds. Default: 10800 (3 hours).
    pub bucket_ttl_seconds: Option<u64>,
}

impl CircuitBreakerConfig {
    pub fn effective_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn effective_max_blocks_per_hour(&self) -> u64 {
        self.max_blocks_per_hour
            .unwrap_or(DEFAULT_MAX_BLOCKS_PER_HOUR)
    }

    pub fn effective_bucket_ttl(&self) -> Duration {
        Duration::from_secs(
            self.bucket_ttl_seconds
                .unwrap_or(DEFAULT_BUCKET_TTL_SECONDS),
        )
    }
}
