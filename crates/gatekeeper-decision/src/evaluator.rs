//! Engine and breaker wired together.

use std::sync::Arc;

use gatekeeper_core::config::GatekeeperConfig;
use gatekeeper_core::errors::{GatekeeperError, GatekeeperErrorCode, GatekeeperResult};
use gatekeeper_core::models::{MachineDecision, RepoContext};
use gatekeeper_core::traits::{BlockCounterStore, Clock};
use tracing::{error, instrument, warn};

use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerSettings};
use crate::engine::{DecisionEngine, EvaluationInput};

/// Runs one evaluation end to end: engine decision, then the breaker for
/// blocking outcomes. A proceedable store outage is replaced by the engine's
/// degraded decision; anything else propagates.
pub struct GovernanceEvaluator {
    engine: DecisionEngine,
    breaker: Option<CircuitBreaker>,
}

impl GovernanceEvaluator {
    pub fn new(engine: DecisionEngine, breaker: Option<CircuitBreaker>) -> Self {
        Self { engine, breaker }
    }

    /// Build from resolved config. The breaker is omitted when disabled.
    pub fn from_config(
        config: &GatekeeperConfig,
        store: Arc<dyn BlockCounterStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let engine = DecisionEngine::new(config.decision.effective_thresholds(), Arc::clone(&clock));
        let settings = CircuitBreakerSettings::from_config(&config.circuit_breaker);
        let breaker = settings
            .enabled
            .then(|| CircuitBreaker::new(store, clock, settings));
        Self::new(engine, breaker)
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    pub fn breaker(&self) -> Option<&CircuitBreaker> {
        self.breaker.as_ref()
    }

    #[instrument(skip_all, fields(repo = %repo, tier = %repo.tier))]
    pub async fn evaluate(
        &self,
        input: &EvaluationInput,
        repo: &RepoContext,
    ) -> GatekeeperResult<MachineDecision> {
        let decision = self.engine.evaluate(input);
        let Some(breaker) = &self.breaker else {
            return Ok(decision);
        };
        if !decision.is_blocking() {
            return Ok(decision);
        }

        // The selected profile may carry a tighter breaker threshold.
        let limit = self
            .engine
            .thresholds()
            .select(input.strict)
            .circuit_breaker_threshold;

        match breaker.apply_with_limit(decision, repo, limit).await {
            Err(GatekeeperError::Degraded(degradation)) if degradation.can_proceed() => {
                warn!(reason = degradation.reason().code(), "block counter unavailable");
                self.engine.degraded_decision(input, &degradation)
            }
            Err(err) => {
                error!(code = err.error_code(), error = %err, "evaluation failed");
                Err(err)
            }
            ok => ok,
        }
    }
}
