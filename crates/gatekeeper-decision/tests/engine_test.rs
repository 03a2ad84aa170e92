//! Decision engine: thresholds, reason order, dry-run, degraded path.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use gatekeeper_core::errors::{DegradedError, GatekeeperError};
use gatekeeper_core::models::{
    DegradationReason, LineRange, Outcome, RuleViolation, ServiceTier, Severity, ThresholdSet,
    Thresholds,
};
use gatekeeper_core::traits::ManualClock;
use gatekeeper_decision::{DecisionEngine, EvaluationInput};
use proptest::prelude::*;

fn engine() -> DecisionEngine {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 3, 4, 12, 0, 0).unwrap(),
    ));
    DecisionEngine::new(ThresholdSet::default(), clock)
}

fn violations(rule: &str, severity: Severity, n: usize) -> Vec<RuleViolation> {
    (0..n)
        .map(|i| {
            RuleViolation::new(
                rule,
                severity,
                format!("src/file_{i}.rs"),
                LineRange::single(i as u32 + 1),
                "finding",
            )
        })
        .collect()
}

#[test]
fn empty_input_allows() {
    let decision = engine().evaluate(&EvaluationInput::new(Vec::new()));
    assert_eq!(decision.outcome, Outcome::Allow);
    assert_eq!(decision.reasons, vec!["No violations detected".to_string()]);
    assert!(decision.metadata.rules_evaluated.is_empty());
    assert!(!decision.degraded);
    assert_eq!(decision.metadata.mode, "standard");
}

#[test]
fn violations_at_limits_allow_with_minor_note() {
    let mut input = violations("HIGH-1", Severity::High, 3);
    input.extend(violations("MED-1", Severity::Medium, 10));
    input.extend(violations("LOW-1", Severity::Low, 40));
    let decision = engine().evaluate(&EvaluationInput::new(input));
    assert_eq!(decision.outcome, Outcome::Allow);
    assert_eq!(decision.reasons.len(), 1);
    assert!(decision.reasons[0].contains("53 violation(s)"));
}

#[test]
fn single_critical_blocks() {
    let decision = engine().evaluate(&EvaluationInput::new(violations(
        "SEC-001",
        Severity::Critical,
        1,
    )));
    assert_eq!(decision.outcome, Outcome::Block);
    assert!(decision.reasons[0].starts_with("Blocking:"));
    assert!(decision.reasons[0].contains("1 critical (limit 0)"));
}

#[test]
fn strict_profile_is_tighter() {
    let input = EvaluationInput::new(violations("HIGH-1", Severity::High, 1));
    assert_eq!(engine().evaluate(&input).outcome, Outcome::Allow);
    let strict = engine().evaluate(&input.clone().strict(true));
    assert_eq!(strict.outcome, Outcome::Block);
    assert!(strict.reasons[0].contains("strict"));
}

#[test]
fn dry_run_downgrades_block_and_says_so() {
    let input = EvaluationInput::new(violations("HIGH-1", Severity::High, 4)).dry_run(true);
    let decision = engine().evaluate(&input);
    assert_eq!(decision.outcome, Outcome::Warn);
    assert_eq!(decision.reasons.len(), 2);
    assert!(decision.reasons[0].starts_with("Blocking:"));
    assert!(decision.reasons[1].contains("would have blocked"));
}

#[test]
fn tripped_breaker_warns_without_evaluating_thresholds() {
    let input = EvaluationInput::new(violations("SEC-001", Severity::Critical, 5))
        .circuit_breaker_tripped(true);
    let decision = engine().evaluate(&input);
    assert_eq!(decision.outcome, Outcome::Warn);
    assert_eq!(decision.reasons.len(), 1);
    assert!(decision.reasons[0].contains("Circuit breaker"));
}

#[test]
fn tripped_breaker_with_no_violations_keeps_both_notes_in_order() {
    let decision = engine().evaluate(&EvaluationInput::new(Vec::new()).circuit_breaker_tripped(true));
    assert_eq!(decision.outcome, Outcome::Warn);
    assert!(decision.reasons[0].contains("Circuit breaker"));
    assert_eq!(decision.reasons[1], "No violations detected");
}

#[test]
fn rules_evaluated_is_deduplicated() {
    let mut input = violations("B-RULE", Severity::Low, 3);
    input.extend(violations("A-RULE", Severity::Low, 2));
    let decision = engine().evaluate(&EvaluationInput::new(input).with_mode("pr"));
    let mut rules = decision.metadata.rules_evaluated.clone();
    rules.sort();
    assert_eq!(rules, vec!["A-RULE".to_string(), "B-RULE".to_string()]);
    assert_eq!(decision.metadata.mode, "pr");
    assert_eq!(
        decision.metadata.timestamp,
        Utc.with_ymd_and_hms(2025, 3, 4, 12, 0, 0).unwrap()
    );
}

#[test]
fn custom_profile_can_disable_critical_blocking() {
    let lenient = Thresholds {
        block_on_critical: false,
        ..Thresholds::DEFAULT
    };
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let engine = DecisionEngine::new(ThresholdSet::new(lenient, Thresholds::STRICT), clock);
    let decision = engine.evaluate(&EvaluationInput::new(violations("C", Severity::Critical, 3)));
    assert_eq!(decision.outcome, Outcome::Allow);
}

#[test]
fn degraded_decision_for_community_never_blocks() {
    let input = EvaluationInput::new(violations("SEC-001", Severity::Critical, 2));
    let degradation = DegradedError::new(DegradationReason::FpStoreUnavailable, ServiceTier::Community);
    let decision = engine().degraded_decision(&input, &degradation).unwrap();
    assert_eq!(decision.outcome, Outcome::Warn);
    assert!(decision.degraded);
    assert!(decision.reasons[0].contains("FP_STORE_UNAVAILABLE"));
    assert!(decision.reasons.iter().any(|r| r.contains("would have blocked")));
    assert_eq!(decision.exit_code(), 2);
}

#[test]
fn degraded_decision_for_paid_tiers_is_the_error() {
    let input = EvaluationInput::new(violations("SEC-001", Severity::Critical, 1));
    for tier in [ServiceTier::Team, ServiceTier::Business, ServiceTier::Enterprise] {
        for reason in DegradationReason::ALL {
            let degradation = DegradedError::new(reason, tier).with_evidence("note", "ops");
            assert!(!degradation.can_proceed(), "{tier} {reason}");
            let err = engine().degraded_decision(&input, &degradation).unwrap_err();
            assert_eq!(err, GatekeeperError::Degraded(degradation));
            assert!(err.is_fatal());
            assert_eq!(err.exit_code(), 1);
        }
    }
}

#[test]
fn input_deserializes_with_defaults() {
    let input: EvaluationInput = serde_json::from_str(
        r#"{"violations":[{"ruleId":"R","severity":"medium","filePath":"a.rs","lineRange":{"start":1,"end":2},"evidence":""}],"dryRun":true}"#,
    )
    .unwrap();
    assert!(input.dry_run);
    assert!(!input.strict);
    assert_eq!(input.mode, "standard");
}

fn severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Critical),
        Just(Severity::High),
        Just(Severity::Medium),
        Just(Severity::Low),
    ]
}

proptest! {
    #[test]
    fn dry_run_never_blocks(
        severities in proptest::collection::vec(severity(), 0..40),
        strict in any::<bool>(),
        tripped in any::<bool>(),
    ) {
        let input: Vec<RuleViolation> = severities
            .into_iter()
            .enumerate()
            .map(|(i, s)| RuleViolation::new(format!("R{}", i % 7), s, "f", LineRange::single(1), ""))
            .collect();
        let input = EvaluationInput::new(input)
            .strict(strict)
            .dry_run(true)
            .circuit_breaker_tripped(tripped);
        prop_assert_ne!(engine().evaluate(&input).outcome, Outcome::Block);
    }

    #[test]
    fn within_thresholds_always_allows(
        high in 0usize..=3,
        medium in 0usize..=10,
        low in 0usize..100,
    ) {
        let mut input = violations("H", Severity::High, high);
        input.extend(violations("M", Severity::Medium, medium));
        input.extend(violations("L", Severity::Low, low));
        prop_assert_eq!(engine().evaluate(&EvaluationInput::new(input)).outcome, Outcome::Allow);
    }
}
