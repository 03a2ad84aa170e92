//! Hourly block-rate limiter.
//!
//! Counts blocking decisions per repository in wall-clock hour buckets
//! (`blocks:{owner}/{repo}:{YYYY-MM-DDTHH}`). Once the post-increment count
//! reaches the limit, blocks in that bucket are downgraded to degraded warns.
//! Buckets are calendar-aligned, not sliding: a burst that straddles an hour
//! boundary is split across two counters.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use gatekeeper_core::config::CircuitBreakerConfig;
use gatekeeper_core::constants::{
    BLOCK_COUNTER_PREFIX, DEFAULT_BUCKET_TTL_SECONDS, DEFAULT_MAX_BLOCKS_PER_HOUR,
    HOUR_BUCKET_FORMAT,
};
use gatekeeper_core::errors::{GatekeeperError, GatekeeperResult};
use gatekeeper_core::models::{DegradationReason, MachineDecision, Outcome, RepoContext};
use gatekeeper_core::traits::{BlockCounterStore, Clock};
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerSettings {
    pub enabled: bool,
    pub max_blocks_per_hour: u64,
    pub bucket_ttl: Duration,
}

impl CircuitBreakerSettings {
    pub fn from_config(config: &CircuitBreakerConfig) -> Self {
        Self {
            enabled: config.effective_enabled(),
            max_blocks_per_hour: config.effective_max_blocks_per_hour(),
            bucket_ttl: config.effective_bucket_ttl(),
        }
    }
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_blocks_per_hour: DEFAULT_MAX_BLOCKS_PER_HOUR,
            bucket_ttl: Duration::from_secs(DEFAULT_BUCKET_TTL_SECONDS),
        }
    }
}

/// `YYYY-MM-DDTHH` of `now`, truncated to the hour.
pub fn hour_bucket(now: DateTime<Utc>) -> String {
    now.format(HOUR_BUCKET_FORMAT).to_string()
}

/// Counter key for `repo` in the bucket containing `now`.
pub fn counter_key(repo: &RepoContext, now: DateTime<Utc>) -> String {
    format!(
        "{}:{}/{}:{}",
        BLOCK_COUNTER_PREFIX,
        repo.owner,
        repo.repo,
        hour_bucket(now)
    )
}

/// Apply the breaker to `decision`.
///
/// Non-blocking decisions pass through untouched and are never counted. A
/// store failure surfaces as `FP_STORE_UNAVAILABLE` for the repository's tier.
pub async fn apply_circuit_breaker(
    decision: MachineDecision,
    repo: &RepoContext,
    store: &dyn BlockCounterStore,
    settings: &CircuitBreakerSettings,
    now: DateTime<Utc>,
) -> GatekeeperResult<MachineDecision> {
    if !settings.enabled || decision.outcome != Outcome::Block {
        return Ok(decision);
    }

    let key = counter_key(repo, now);
    let count = store
        .increment(&key, settings.bucket_ttl)
        .await
        .map_err(|e| {
            let err = GatekeeperError::from_storage(
                e,
                DegradationReason::FpStoreUnavailable,
                repo.tier,
            );
            match err {
                GatekeeperError::Degraded(d) => {
                    GatekeeperError::Degraded(d.with_evidence("key", &key))
                }
                other => other,
            }
        })?;

    if count < settings.max_blocks_per_hour {
        debug!(%key, count, "block counted");
        return Ok(decision);
    }

    warn!(
        repo = %repo,
        count,
        threshold = settings.max_blocks_per_hour,
        "circuit breaker tripped; downgrading block to warn"
    );

    let mut reasons = decision.reasons;
    reasons.push(format!(
        "Circuit breaker tripped: {count} blocks for {repo} in hour {} (threshold {}); downgraded to warn",
        hour_bucket(now),
        settings.max_blocks_per_hour
    ));
    Ok(MachineDecision {
        outcome: Outcome::Warn,
        reasons,
        metadata: decision.metadata,
        degraded: true,
    })
}

/// Block-rate limiter bound to a counter store and clock.
pub struct CircuitBreaker {
    store: Arc<dyn BlockCounterStore>,
    clock: Arc<dyn Clock>,
    settings: CircuitBreakerSettings,
}

impl CircuitBreaker {
    pub fn new(
        store: Arc<dyn BlockCounterStore>,
        clock: Arc<dyn Clock>,
        settings: CircuitBreakerSettings,
    ) -> Self {
        Self {
            store,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &CircuitBreakerSettings {
        &self.settings
    }

    #[instrument(skip_all, fields(repo = %repo, outcome = %decision.outcome))]
    pub async fn apply(
        &self,
        decision: MachineDecision,
        repo: &RepoContext,
    ) -> GatekeeperResult<MachineDecision> {
        apply_circuit_breaker(decision, repo, self.store.as_ref(), &self.settings, self.clock.now())
            .await
    }

    /// Like [`apply`](Self::apply) with a tighter per-call limit. The
    /// configured limit still applies when it is lower.
    pub async fn apply_with_limit(
        &self,
        decision: MachineDecision,
        repo: &RepoContext,
        max_blocks_per_hour: u64,
    ) -> GatekeeperResult<MachineDecision> {
        let settings = CircuitBreakerSettings {
            max_blocks_per_hour: max_blocks_per_hour.min(self.settings.max_blocks_per_hour),
            ..self.settings
        };
        apply_circuit_breaker(decision, repo, self.store.as_ref(), &settings, self.clock.now())
            .await
    }

    /// Blocks counted for `repo` in the current bucket. Does not increment.
    pub async fn current_count(&self, repo: &RepoContext) -> GatekeeperResult<u64> {
        let key = counter_key(repo, self.clock.now());
        self.store
            .get(&key)
            .await
            .map(|count| count.unwrap_or(0))
            .map_err(|e| {
                GatekeeperError::from_storage(e, DegradationReason::FpStoreUnavailable, repo.tier)
            })
    }
}
