//! Gate for contributing an organization's data to cross-customer pools.
//!
//! A request passes only when its nonce is fresh, matches the organization's
//! active binding (when a binding store is attached), belongs to the org's
//! stored identity and no other (when an identity store is attached), and the
//! org id anonymizes cleanly.
//! Any degradation stops pooling, whatever the tier allows elsewhere.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gatekeeper_core::config::NonceConfig;
use gatekeeper_core::errors::{
    ConfigError, DegradedError, GatekeeperError, GatekeeperResult, PrivacyError, StorageError,
};
use gatekeeper_core::models::{DegradationReason, ServiceTier};
use gatekeeper_core::traits::{Clock, IdentityAdapter, NonceBindingStore, SecretStore};
use serde::Serialize;
use tracing::{debug, error, instrument, warn};

use crate::anonymizer::Anonymizer;
use crate::nonce::is_fresh;

/// Where the freshness window comes from.
pub enum NoncePolicy {
    Fixed { max_age_seconds: u64 },
    /// Read from the secret store on every check. A missing or unparsable
    /// value is a `NONCE_PARAM_MISSING` degradation.
    Parameter {
        name: String,
        store: Arc<dyn SecretStore>,
    },
}

impl NoncePolicy {
    /// `policy_parameter` wins over `max_age_seconds` and needs a secret store.
    pub fn from_config(
        config: &NonceConfig,
        store: Option<Arc<dyn SecretStore>>,
    ) -> Result<Self, ConfigError> {
        match (config.policy_parameter.as_deref().map(str::trim), store) {
            (Some(""), _) => Err(ConfigError::ValidationFailed {
                field: "nonce.policy_parameter".to_string(),
                message: "must not be empty".to_string(),
            }),
            (Some(name), Some(store)) => Ok(Self::Parameter {
                name: name.to_string(),
                store,
            }),
            (Some(_), None) => Err(ConfigError::ValidationFailed {
                field: "nonce.policy_parameter".to_string(),
                message: "a secret store is required to read the nonce window".to_string(),
            }),
            (None, _) => Ok(Self::Fixed {
                max_age_seconds: config.effective_max_age_seconds(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PoolingRequest {
    pub org_id: String,
    pub nonce: String,
    pub issued_at: DateTime<Utc>,
    pub tier: ServiceTier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PooledToken {
    pub token: String,
    pub rotation_month: String,
    pub nonce_age_seconds: i64,
}

pub struct PoolingGate {
    anonymizer: Arc<Anonymizer>,
    policy: NoncePolicy,
    clock: Arc<dyn Clock>,
    bindings: Option<Arc<dyn NonceBindingStore>>,
    identities: Option<Arc<dyn IdentityAdapter>>,
}

impl PoolingGate {
    pub fn new(anonymizer: Arc<Anonymizer>, policy: NoncePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            anonymizer,
            policy,
            clock,
            bindings: None,
            identities: None,
        }
    }

    /// Require the nonce to match the org's active binding.
    pub fn with_bindings(mut self, bindings: Arc<dyn NonceBindingStore>) -> Self {
        self.bindings = Some(bindings);
        self
    }

    /// Require the nonce to be the org's verified identity nonce, held by no
    /// other identity.
    pub fn with_identities(mut self, identities: Arc<dyn IdentityAdapter>) -> Self {
        self.identities = Some(identities);
        self
    }

    #[instrument(skip_all, fields(tier = %request.tier))]
    pub async fn authorize(&self, request: &PoolingRequest) -> GatekeeperResult<PooledToken> {
        let result = self.check(request).await;
        match &result {
            Err(GatekeeperError::Invariant(v)) => {
                error!(invariant = %v.invariant_id, "pooling refused");
            }
            Err(GatekeeperError::Degraded(d)) => {
                warn!(reason = d.reason().code(), "pooling unavailable");
            }
            Ok(_) => {}
        }
        result
    }

    async fn check(&self, request: &PoolingRequest) -> GatekeeperResult<PooledToken> {
        let max_age_seconds = self.max_age_seconds(request.tier).await?;
        let check = is_fresh(
            &request.nonce,
            request.issued_at,
            max_age_seconds,
            self.clock.now(),
        )
        .into_result()?;

        if let Some(bindings) = &self.bindings {
            let active = bindings
                .active_binding(&request.org_id)
                .map_err(|e| consent_unavailable(e, request.tier))?;
            if active.map_or(true, |binding| binding.nonce != request.nonce) {
                return Err(PrivacyError::NonceUnbound.into());
            }
        }

        if let Some(identities) = &self.identities {
            let holder = identities
                .get_identity(&request.org_id)
                .map_err(|e| consent_unavailable(e, request.tier))?;
            if holder.map_or(true, |identity| identity.unique_nonce != request.nonce) {
                return Err(PrivacyError::NonceUnbound.into());
            }
            let usages = identities
                .count_nonce_usages(&request.nonce)
                .map_err(|e| consent_unavailable(e, request.tier))?;
            if usages > 1 {
                return Err(PrivacyError::NonceReplayed { usages }.into());
            }
        }

        let (token, salt) = self.anonymizer.anonymize_with_salt(&request.org_id).await?;

        debug!(age_seconds = check.age_seconds, "pooling authorized");
        Ok(PooledToken {
            token,
            rotation_month: salt.rotation_month.clone(),
            nonce_age_seconds: check.age_seconds,
        })
    }

    async fn max_age_seconds(&self, tier: ServiceTier) -> GatekeeperResult<u64> {
        match &self.policy {
            NoncePolicy::Fixed { max_age_seconds } => Ok(*max_age_seconds),
            NoncePolicy::Parameter { name, store } => {
                let missing = || {
                    DegradedError::new(DegradationReason::NonceParamMissing, tier)
                        .with_evidence("parameter", name)
                };
                let value = store.get_parameter(name, false).await.map_err(|e| {
                    GatekeeperError::Degraded(missing().with_evidence("error", e.to_string()))
                })?;
                value
                    .and_then(|v| v.value.trim().parse::<u64>().ok())
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| GatekeeperError::Degraded(missing()))
            }
        }
    }
}

fn consent_unavailable(err: StorageError, tier: ServiceTier) -> GatekeeperError {
    GatekeeperError::from_storage(err, DegradationReason::ConsentStoreUnavailable, tier)
}
