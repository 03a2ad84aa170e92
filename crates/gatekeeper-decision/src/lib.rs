//! # gatekeeper-decision
//!
//! Aggregates rule violations into one allow/warn/block decision and rate
//! limits blocking per repository per wall-clock hour.

pub mod circuit_breaker;
pub mod engine;
pub mod evaluator;

pub use circuit_breaker::{
    apply_circuit_breaker, counter_key, hour_bucket, CircuitBreaker, CircuitBreakerSettings,
};
pub use engine::{should_block, DecisionEngine, EvaluationInput};
pub use evaluator::GovernanceEvaluator;
