//! Resolved configuration and its layering.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{
    AnonymizerConfig, CircuitBreakerConfig, DecisionConfig, NonceConfig, ThresholdProfile,
    TrustStoreConfig,
};
use crate::constants::MIN_BUCKET_TTL_SECONDS;
use crate::errors::ConfigError;

/// Project-level config file name, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "gatekeeper.toml";

/// Every tunable of the decision core.
///
/// Layers, lowest to highest priority: compiled defaults, user file
/// (`~/.gatekeeper/config.toml`), project file (`gatekeeper.toml`),
/// `GATEKEEPER_*` environment variables, then [`CliOverrides`]. A layer only
/// replaces the values it actually sets.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GatekeeperConfig {
    pub decision: DecisionConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub anonymizer: AnonymizerConfig,
    pub nonce: NonceConfig,
    pub trust_store: TrustStoreConfig,
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub circuit_breaker_enabled: Option<bool>,
    pub max_blocks_per_hour: Option<u64>,
    pub salt_parameter: Option<String>,
    pub nonce_max_age_seconds: Option<u64>,
}

fn overlay<T: Clone>(base: &mut Option<T>, layer: &Option<T>) {
    if layer.is_some() {
        base.clone_from(layer);
    }
}

/// Parsed env var. Unset or unparsable values are skipped.
fn env_value<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.into(),
    }
}

impl GatekeeperConfig {
    /// Resolve every layer for the project at `root`, then validate.
    pub fn load(root: &Path, cli: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = user_config_path().filter(|p| p.exists()) {
            match Self::read_file(&path) {
                Ok(user) => config.overlay(&user),
                // Unreadable user files are skipped; malformed ones are not.
                Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                Err(e) => tracing::warn!(error = %e, "skipping user config"),
            }
        }

        let project = root.join(PROJECT_CONFIG_FILE);
        if project.exists() {
            config.overlay(&Self::read_file(&project)?);
        }

        config.overlay_env();
        if let Some(cli) = cli {
            config.overlay_cli(cli);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Parse and validate a TOML document without any other layer.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config = Self::parse(toml_str, "<string>")?;
        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &GatekeeperConfig) -> Result<(), ConfigError> {
        for (field, profile) in [
            ("decision.default.circuit_breaker_threshold", &config.decision.default),
            ("decision.strict.circuit_breaker_threshold", &config.decision.strict),
        ] {
            if profile.circuit_breaker_threshold == Some(0) {
                return Err(invalid(field, "must be greater than 0"));
            }
        }

        if !config.decision.effective_thresholds().is_consistent() {
            return Err(invalid(
                "decision.strict",
                "strict profile must have equal or lower limits than the default profile",
            ));
        }

        let cb = &config.circuit_breaker;
        if cb.max_blocks_per_hour == Some(0) {
            return Err(invalid("circuit_breaker.max_blocks_per_hour", "must be greater than 0"));
        }
        if cb.bucket_ttl_seconds.is_some_and(|ttl| ttl < MIN_BUCKET_TTL_SECONDS) {
            return Err(invalid(
                "circuit_breaker.bucket_ttl_seconds",
                format!("must be at least {MIN_BUCKET_TTL_SECONDS}"),
            ));
        }

        if config.nonce.max_age_seconds == Some(0) {
            return Err(invalid("nonce.max_age_seconds", "must be greater than 0"));
        }

        match config.anonymizer.salt_parameter.as_deref() {
            Some(p) if p.trim().is_empty() => {
                Err(invalid("anonymizer.salt_parameter", "must not be empty"))
            }
            Some(_) if config.anonymizer.effective_insecure_test_salt() => Err(invalid(
                "anonymizer.insecure_test_salt",
                "cannot be enabled when a production salt_parameter is configured",
            )),
            _ => Ok(()),
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }

    fn parse(text: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::ParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Unknown keys are ignored so older binaries accept newer files.
    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    fn overlay(&mut self, layer: &GatekeeperConfig) {
        overlay_profile(&mut self.decision.default, &layer.decision.default);
        overlay_profile(&mut self.decision.strict, &layer.decision.strict);

        let (cb, other) = (&mut self.circuit_breaker, &layer.circuit_breaker);
        overlay(&mut cb.enabled, &other.enabled);
        overlay(&mut cb.max_blocks_per_hour, &other.max_blocks_per_hour);
        overlay(&mut cb.bucket_ttl_seconds, &other.bucket_ttl_seconds);

        overlay(&mut self.anonymizer.salt_parameter, &layer.anonymizer.salt_parameter);
        overlay(
            &mut self.anonymizer.insecure_test_salt,
            &layer.anonymizer.insecure_test_salt,
        );

        overlay(&mut self.nonce.max_age_seconds, &layer.nonce.max_age_seconds);
        overlay(&mut self.nonce.policy_parameter, &layer.nonce.policy_parameter);

        overlay(&mut self.trust_store.data_dir, &layer.trust_store.data_dir);
    }

    fn overlay_env(&mut self) {
        overlay(&mut self.circuit_breaker.enabled, &env_value("GATEKEEPER_CB_ENABLED"));
        overlay(
            &mut self.circuit_breaker.max_blocks_per_hour,
            &env_value("GATEKEEPER_CB_MAX_BLOCKS_PER_HOUR"),
        );
        overlay(
            &mut self.circuit_breaker.bucket_ttl_seconds,
            &env_value("GATEKEEPER_CB_BUCKET_TTL_SECONDS"),
        );
        overlay(&mut self.anonymizer.salt_parameter, &env_value("GATEKEEPER_SALT_PARAMETER"));
        overlay(
            &mut self.nonce.max_age_seconds,
            &env_value("GATEKEEPER_NONCE_MAX_AGE_SECONDS"),
        );
        overlay(&mut self.trust_store.data_dir, &env_value("GATEKEEPER_TRUST_DATA_DIR"));
    }

    fn overlay_cli(&mut self, cli: &CliOverrides) {
        overlay(&mut self.circuit_breaker.enabled, &cli.circuit_breaker_enabled);
        overlay(&mut self.circuit_breaker.max_blocks_per_hour, &cli.max_blocks_per_hour);
        overlay(&mut self.anonymizer.salt_parameter, &cli.salt_parameter);
        overlay(&mut self.nonce.max_age_seconds, &cli.nonce_max_age_seconds);
    }
}

fn overlay_profile(base: &mut ThresholdProfile, layer: &ThresholdProfile) {
    overlay(&mut base.block_on_critical, &layer.block_on_critical);
    overlay(&mut base.max_critical_violations, &layer.max_critical_violations);
    overlay(&mut base.max_high_violations, &layer.max_high_violations);
    overlay(&mut base.max_medium_violations, &layer.max_medium_violations);
    overlay(&mut base.circuit_breaker_threshold, &layer.circuit_breaker_threshold);
}

/// `~/.gatekeeper/config.toml`, if a home directory is known.
fn user_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(".gatekeeper").join("config.toml"))
}
