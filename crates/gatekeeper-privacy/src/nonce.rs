//! Nonce freshness. Pure: no clock, no storage.

use chrono::{DateTime, Duration, Utc};
use gatekeeper_core::errors::PrivacyError;
use serde::Serialize;

/// Outcome of a freshness check. The nonce is carried as evidence only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshnessCheck {
    pub nonce: String,
    pub passed: bool,
    /// Whole seconds between issuance and `now`. Negative when issued in the future.
    pub age_seconds: i64,
    pub max_age_seconds: u64,
}

impl FreshnessCheck {
    /// The failure as a privacy error, if the check did not pass.
    pub fn failure(&self) -> Option<PrivacyError> {
        if self.passed {
            None
        } else if self.age_seconds < 0 {
            Some(PrivacyError::NonceFromFuture {
                ahead_seconds: self.age_seconds.saturating_neg().max(1),
            })
        } else {
            Some(PrivacyError::NonceExpired {
                age_seconds: self.age_seconds,
                max_age_seconds: self.max_age_seconds,
            })
        }
    }

    pub fn into_result(self) -> Result<Self, PrivacyError> {
        match self.failure() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

/// Passes iff `0 <= now - issued_at <= max_age_seconds`. A timestamp in the
/// future fails; it is never clamped to zero.
pub fn is_fresh(
    nonce: &str,
    issued_at: DateTime<Utc>,
    max_age_seconds: u64,
    now: DateTime<Utc>,
) -> FreshnessCheck {
    let elapsed = now.signed_duration_since(issued_at);
    let limit = i64::try_from(max_age_seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX);

    let in_future = elapsed < Duration::zero();
    let age_seconds = if in_future {
        // Sub-second skew still reports as at least one second ahead.
        elapsed.num_seconds().min(-1)
    } else {
        elapsed.num_seconds()
    };

    FreshnessCheck {
        nonce: nonce.to_string(),
        passed: !in_future && elapsed <= limit,
        age_seconds,
        max_age_seconds,
    }
}
