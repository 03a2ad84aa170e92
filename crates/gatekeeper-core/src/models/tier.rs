use std::fmt;

use serde::{Deserialize, Serialize};

/// Customer service tier, supplied by caller context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceTier {
    #[default]
    Community,
    Team,
    Business,
    Enterprise,
}

impl ServiceTier {
    /// Numeric level for comparison.
    pub fn level(&self) -> u8 {
        match self {
            ServiceTier::Community => 0,
            ServiceTier::Team => 1,
            ServiceTier::Business => 2,
            ServiceTier::Enterprise => 3,
        }
    }

    /// Whether an infrastructure degradation may proceed in degraded mode.
    /// Paid tiers hard-fail so an ops incident is never masked.
    pub fn can_proceed_degraded(&self) -> bool {
        matches!(self, ServiceTier::Community)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceTier::Community => "community",
            ServiceTier::Team => "team",
            ServiceTier::Business => "business",
            ServiceTier::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for ServiceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ServiceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "community" | "free" => Ok(ServiceTier::Community),
            "team" => Ok(ServiceTier::Team),
            "business" => Ok(ServiceTier::Business),
            "enterprise" => Ok(ServiceTier::Enterprise),
            other => Err(format!("unknown service tier: {other}")),
        }
    }
}
