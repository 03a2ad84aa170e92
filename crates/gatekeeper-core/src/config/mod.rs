//! Configuration system for Gatekeeper.
//! TOML-based, 4-layer resolution: CLI > env > project > user > defaults.

pub mod anonymizer_config;
pub mod circuit_breaker_config;
pub mod decision_config;
pub mod gatekeeper_config;
pub mod nonce_config;
pub mod trust_store_config;

pub use anonymizer_config::AnonymizerConfig;
pub use circuit_breaker_config::CircuitBreakerConfig;
pub use decision_config::{DecisionConfig, ThresholdProfile};
pub use gatekeeper_config::{CliOverrides, GatekeeperConfig};
pub use nonce_config::NonceConfig;
pub use trust_store_config::TrustStoreConfig;
