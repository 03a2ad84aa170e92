//! Organization id anonymization.
//!
//! `token = HMAC-SHA256(key = salt, message = org_id)` as lowercase hex. The
//! salt is fetched once and held in an explicit state owned by the
//! [`Anonymizer`]. Rotation only happens through [`Anonymizer::reload`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gatekeeper_core::config::AnonymizerConfig;
use gatekeeper_core::constants::MAX_ORG_ID_LEN;
use gatekeeper_core::errors::{ConfigError, PrivacyError};
use gatekeeper_core::traits::{Clock, SecretStore};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::salt::{rotation_month_of, SaltConfig, SaltRecord, SaltSource};

type HmacSha256 = Hmac<Sha256>;

/// Lowercase hex HMAC-SHA256 of `message` under `key`.
pub fn keyed_token(key: &[u8], message: &[u8]) -> Result<String, PrivacyError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| PrivacyError::HmacKeyRejected {
        message: e.to_string(),
    })?;
    mac.update(message);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Reject empty (after trimming) or oversized org ids. Runs before any
/// secret fetch.
pub fn validate_org_id(org_id: &str) -> Result<(), PrivacyError> {
    if org_id.trim().is_empty() {
        return Err(PrivacyError::EmptyOrgId);
    }
    let len = org_id.chars().count();
    if len > MAX_ORG_ID_LEN {
        return Err(PrivacyError::OrgIdTooLong {
            len,
            max: MAX_ORG_ID_LEN,
        });
    }
    Ok(())
}

enum Backend {
    Production {
        parameter: String,
        store: Arc<dyn SecretStore>,
    },
    InsecureTestSalt,
}

pub struct Anonymizer {
    backend: Backend,
    clock: Arc<dyn Clock>,
    state: RwLock<Option<Arc<SaltConfig>>>,
    /// Serializes salt fetches so concurrent first calls share one fetch.
    load_lock: Mutex<()>,
}

impl Anonymizer {
    /// Production anonymizer reading `parameter` from `store`.
    pub fn production(
        parameter: impl Into<String>,
        store: Arc<dyn SecretStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_backend(
            Backend::Production {
                parameter: parameter.into(),
                store,
            },
            clock,
        )
    }

    /// Anonymizer keyed by the well-known test salt. Its tokens are not
    /// anonymous; local and test execution only.
    pub fn insecure_for_tests(clock: Arc<dyn Clock>) -> Self {
        Self::with_backend(Backend::InsecureTestSalt, clock)
    }

    /// Build from config. A configured salt parameter requires a secret store
    /// and always selects the production path.
    pub fn from_config(
        config: &AnonymizerConfig,
        store: Option<Arc<dyn SecretStore>>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        match (SaltSource::from_config(config), store) {
            (Some(SaltSource::Production { parameter }), Some(store)) => {
                Ok(Self::production(parameter, store, clock))
            }
            (Some(SaltSource::Production { .. }), None) => Err(ConfigError::ValidationFailed {
                field: "anonymizer.salt_parameter".to_string(),
                message: "a secret store is required to read the salt".to_string(),
            }),
            (Some(SaltSource::InsecureTestSalt), _) => Ok(Self::insecure_for_tests(clock)),
            (None, _) => Err(ConfigError::ValidationFailed {
                field: "anonymizer".to_string(),
                message: "no salt source configured".to_string(),
            }),
        }
    }

    fn with_backend(backend: Backend, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            clock,
            state: RwLock::new(None),
            load_lock: Mutex::new(()),
        }
    }

    pub fn is_insecure(&self) -> bool {
        matches!(self.backend, Backend::InsecureTestSalt)
    }

    /// Anonymize `org_id` under the current salt, loading it on first use.
    #[instrument(skip_all)]
    pub async fn anonymize_org_id(&self, org_id: &str) -> Result<String, PrivacyError> {
        self.anonymize_with_salt(org_id).await.map(|(token, _)| token)
    }

    /// Like [`Self::anonymize_org_id`], also returning the salt that produced
    /// the token. A concurrent `reload` cannot split the pair.
    pub async fn anonymize_with_salt(
        &self,
        org_id: &str,
    ) -> Result<(String, Arc<SaltConfig>), PrivacyError> {
        validate_org_id(org_id)?;
        let salt = self.salt().await?;
        let token = keyed_token(salt.key(), org_id.as_bytes())?;
        Ok((token, salt))
    }

    /// The cached salt, loading it if this is the first call.
    pub async fn salt(&self) -> Result<Arc<SaltConfig>, PrivacyError> {
        if let Some(salt) = self.state.read().await.as_ref() {
            return Ok(Arc::clone(salt));
        }

        let _guard = self.load_lock.lock().await;
        // Another caller may have finished the load while we waited.
        if let Some(salt) = self.state.read().await.as_ref() {
            return Ok(Arc::clone(salt));
        }

        let loaded = Arc::new(self.fetch().await?);
        *self.state.write().await = Some(Arc::clone(&loaded));
        debug!(rotation_month = %loaded.rotation_month, "salt loaded");
        Ok(loaded)
    }

    /// Re-fetch the salt unconditionally. On failure the previous salt stays
    /// in place and the error is returned.
    pub async fn reload(&self) -> Result<Arc<SaltConfig>, PrivacyError> {
        let _guard = self.load_lock.lock().await;
        let loaded = Arc::new(self.fetch().await?);
        let previous = self.state.write().await.replace(Arc::clone(&loaded));
        info!(
            rotation_month = %loaded.rotation_month,
            previous_month = previous.as_ref().map(|p| p.rotation_month.as_str()).unwrap_or("none"),
            "salt reloaded"
        );
        Ok(loaded)
    }

    /// Currently cached salt without triggering a load.
    pub async fn current(&self) -> Option<Arc<SaltConfig>> {
        self.state.read().await.clone()
    }

    /// True when a salt is cached and its epoch is older than the month of `now`.
    pub async fn is_rotation_due(&self, now: DateTime<Utc>) -> bool {
        self.state
            .read()
            .await
            .as_ref()
            .is_some_and(|salt| salt.is_rotation_due(now))
    }

    async fn fetch(&self) -> Result<SaltConfig, PrivacyError> {
        let now = self.clock.now();
        match &self.backend {
            Backend::InsecureTestSalt => {
                warn!("using the insecure test salt; tokens are not anonymous");
                Ok(SaltConfig::insecure(now))
            }
            Backend::Production { parameter, store } => {
                let secret = store
                    .get_parameter(parameter, true)
                    .await
                    .map_err(|e| PrivacyError::SaltFetchFailed {
                        parameter: parameter.clone(),
                        message: e.to_string(),
                    })?
                    .ok_or_else(|| PrivacyError::SaltNotFound {
                        parameter: parameter.clone(),
                    })?;

                let raw = secret.value.trim();
                if raw.is_empty() {
                    return Err(PrivacyError::SaltEmpty {
                        parameter: parameter.clone(),
                    });
                }

                // The parameter holds either the bare salt or a persisted
                // rotation record.
                if raw.starts_with('{') {
                    let record: SaltRecord =
                        serde_json::from_str(raw).map_err(|_| PrivacyError::SaltMalformed {
                            parameter: parameter.clone(),
                            len: raw.chars().count(),
                        })?;
                    SaltConfig::new(&record.salt, parameter, now, record.rotation_month)
                } else {
                    SaltConfig::new(raw, parameter, now, rotation_month_of(now))
                }
            }
        }
    }
}

impl std::fmt::Debug for Anonymizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = match &self.backend {
            Backend::Production { parameter, .. } => parameter.as_str(),
            Backend::InsecureTestSalt => "<insecure-test-salt>",
        };
        f.debug_struct("Anonymizer").field("source", &source).finish()
    }
}
