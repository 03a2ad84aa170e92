//! Violation aggregation into a single machine decision.

use std::collections::BTreeSet;
use std::sync::Arc;

use gatekeeper_core::constants::DEFAULT_MODE;
use gatekeeper_core::errors::{DegradedError, GatekeeperResult};
use gatekeeper_core::models::{
    DecisionMetadata, MachineDecision, Outcome, RuleViolation, SeverityCounts, ThresholdSet,
    Thresholds,
};
use gatekeeper_core::traits::Clock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One evaluation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationInput {
    pub violations: Vec<RuleViolation>,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub dry_run: bool,
    /// Set by a caller that already knows the breaker is open for this window.
    #[serde(default)]
    pub circuit_breaker_tripped: bool,
}

fn default_mode() -> String {
    DEFAULT_MODE.to_string()
}

impl EvaluationInput {
    pub fn new(violations: Vec<RuleViolation>) -> Self {
        Self {
            violations,
            mode: default_mode(),
            strict: false,
            dry_run: false,
            circuit_breaker_tripped: false,
        }
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn circuit_breaker_tripped(mut self, tripped: bool) -> Self {
        self.circuit_breaker_tripped = tripped;
        self
    }
}

/// `true` when any severity exceeds its tolerated count. Comparisons are
/// strictly greater-than, so a count equal to its limit does not block.
pub fn should_block(counts: &SeverityCounts, thresholds: &Thresholds) -> bool {
    (thresholds.block_on_critical && counts.critical > thresholds.max_critical_violations)
        || counts.high > thresholds.max_high_violations
        || counts.medium > thresholds.max_medium_violations
}

/// Pure aggregation of violations under the selected threshold profile.
/// Total over well-formed input.
pub struct DecisionEngine {
    thresholds: ThresholdSet,
    clock: Arc<dyn Clock>,
}

impl DecisionEngine {
    pub fn new(thresholds: ThresholdSet, clock: Arc<dyn Clock>) -> Self {
        Self { thresholds, clock }
    }

    pub fn thresholds(&self) -> &ThresholdSet {
        &self.thresholds
    }

    /// Produce exactly one decision for `input`.
    ///
    /// Reasons are appended in a fixed order: circuit-breaker note, block
    /// summary, dry-run override, then the no-violation or minor-violation note.
    pub fn evaluate(&self, input: &EvaluationInput) -> MachineDecision {
        let thresholds = self.thresholds.select(input.strict);
        let counts = SeverityCounts::from_violations(&input.violations);

        let mut outcome = Outcome::Allow;
        let mut reasons = Vec::new();

        // A tripped breaker pre-empts threshold evaluation for this window.
        let exceeds = !input.circuit_breaker_tripped && should_block(&counts, thresholds);
        if input.circuit_breaker_tripped {
            outcome = Outcome::Warn;
            reasons.push(
                "Circuit breaker is open for this window; blocking suppressed".to_string(),
            );
        } else if exceeds {
            outcome = Outcome::Block;
            reasons.push(block_summary(&counts, thresholds));
        }

        if input.dry_run && outcome == Outcome::Block {
            outcome = Outcome::Warn;
            reasons.push("Dry run: would have blocked; reporting as warn".to_string());
        }

        if counts.total() == 0 {
            reasons.push("No violations detected".to_string());
        } else if !exceeds && !input.circuit_breaker_tripped {
            reasons.push(format!(
                "{} violation(s) reported; none exceed blocking thresholds",
                counts.total()
            ));
        }

        let rules_evaluated: BTreeSet<&str> = input
            .violations
            .iter()
            .map(|v| v.rule_id.as_str())
            .collect();

        debug!(
            outcome = %outcome,
            critical = counts.critical,
            high = counts.high,
            medium = counts.medium,
            low = counts.low,
            strict = input.strict,
            dry_run = input.dry_run,
            "decision evaluated"
        );

        MachineDecision {
            outcome,
            reasons,
            metadata: DecisionMetadata {
                timestamp: self.clock.now(),
                mode: input.mode.clone(),
                rules_evaluated: rules_evaluated.into_iter().map(str::to_string).collect(),
            },
            degraded: false,
        }
    }

    /// Explicit degraded path: evaluate as a dry run and mark the result
    /// degraded. Only a proceedable degradation yields a decision; any other
    /// is returned as the error it is.
    pub fn degraded_decision(
        &self,
        input: &EvaluationInput,
        degradation: &DegradedError,
    ) -> GatekeeperResult<MachineDecision> {
        if !degradation.can_proceed() {
            return Err(degradation.clone().into());
        }

        let dry = EvaluationInput {
            dry_run: true,
            ..input.clone()
        };
        let mut decision = self.evaluate(&dry);
        decision.reasons.insert(
            0,
            format!(
                "Degraded ({}) for tier {}; blocking disabled",
                degradation.reason().code(),
                degradation.tier()
            ),
        );
        decision.degraded = true;

        warn!(
            reason = degradation.reason().code(),
            tier = %degradation.tier(),
            outcome = %decision.outcome,
            "proceeding with degraded decision"
        );
        Ok(decision)
    }
}

fn block_summary(counts: &SeverityCounts, thresholds: &Thresholds) -> String {
    let mut exceeded = Vec::new();
    if thresholds.block_on_critical && counts.critical > thresholds.max_critical_violations {
        exceeded.push(format!(
            "{} critical (limit {})",
            counts.critical, thresholds.max_critical_violations
        ));
    }
    if counts.high > thresholds.max_high_violations {
        exceeded.push(format!(
            "{} high (limit {})",
            counts.high, thresholds.max_high_violations
        ));
    }
    if counts.medium > thresholds.max_medium_violations {
        exceeded.push(format!(
            "{} medium (limit {})",
            counts.medium, thresholds.max_medium_violations
        ));
    }
    let profile = if thresholds.strict_mode { "strict" } else { "default" };
    format!(
        "Blocking: {} exceed the {profile} thresholds",
        exceeded.join(", ")
    )
}
