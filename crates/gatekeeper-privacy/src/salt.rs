//! Salt values, their rotation metadata, and where they come from.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use gatekeeper_core::config::AnonymizerConfig;
use gatekeeper_core::constants::{ROTATION_MONTH_FORMAT, SALT_HEX_LEN};
use gatekeeper_core::errors::PrivacyError;
use rand::RngCore;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Well-known, non-secret salt for local and test execution. Tokens derived
/// from it are NOT anonymous.
pub const INSECURE_TEST_SALT: &str =
    "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

static SALT_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{64}$").ok());

/// True when `value` is exactly 64 hex characters (either case).
/// Fails closed if the pattern could not be compiled.
pub fn is_valid_salt(value: &str) -> bool {
    SALT_PATTERN
        .as_ref()
        .is_some_and(|re| re.is_match(value))
}

/// `YYYY-MM` of `at`.
pub fn rotation_month_of(at: DateTime<Utc>) -> String {
    at.format(ROTATION_MONTH_FORMAT).to_string()
}

/// Where the anonymizer gets its salt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaltSource {
    /// Named secret-store parameter, fetched with decryption.
    Production { parameter: String },
    /// The fixed [`INSECURE_TEST_SALT`]. Never selected when a production
    /// parameter is configured.
    InsecureTestSalt,
}

impl SaltSource {
    /// Select a source from config. A configured parameter always wins; the
    /// insecure salt requires the explicit flag and no parameter.
    pub fn from_config(config: &AnonymizerConfig) -> Option<Self> {
        match config.salt_parameter.as_deref().map(str::trim) {
            Some(parameter) if !parameter.is_empty() => Some(Self::Production {
                parameter: parameter.to_string(),
            }),
            Some(_) => None,
            None if config.effective_insecure_test_salt() => Some(Self::InsecureTestSalt),
            None => None,
        }
    }

    pub fn is_insecure(&self) -> bool {
        matches!(self, Self::InsecureTestSalt)
    }
}

/// The salt currently in use, cached for the life of the anonymizer.
#[derive(Clone)]
pub struct SaltConfig {
    value: String,
    pub loaded_at: DateTime<Utc>,
    pub rotation_month: String,
    pub insecure: bool,
}

impl SaltConfig {
    /// Validate and wrap a salt value.
    pub fn new(
        value: &str,
        parameter: &str,
        loaded_at: DateTime<Utc>,
        rotation_month: String,
    ) -> Result<Self, PrivacyError> {
        if !is_valid_salt(value) {
            return Err(PrivacyError::SaltMalformed {
                parameter: parameter.to_string(),
                len: value.chars().count(),
            });
        }
        Ok(Self {
            value: value.to_string(),
            loaded_at,
            rotation_month,
            insecure: false,
        })
    }

    pub(crate) fn insecure(loaded_at: DateTime<Utc>) -> Self {
        Self {
            value: INSECURE_TEST_SALT.to_string(),
            loaded_at,
            rotation_month: rotation_month_of(loaded_at),
            insecure: true,
        }
    }

    pub(crate) fn key(&self) -> &[u8] {
        self.value.as_bytes()
    }

    /// Whether the calendar month has moved past this salt's epoch.
    pub fn is_rotation_due(&self, now: DateTime<Utc>) -> bool {
        rotation_month_of(now) != self.rotation_month
    }
}

impl std::fmt::Debug for SaltConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaltConfig")
            .field("value", &"<redacted>")
            .field("loaded_at", &self.loaded_at)
            .field("rotation_month", &self.rotation_month)
            .field("insecure", &self.insecure)
            .finish()
    }
}

/// Salt persisted together with its rotation metadata.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaltRecord {
    pub salt: String,
    pub rotation_month: String,
    pub rotated_at: DateTime<Utc>,
}

impl SaltRecord {
    /// A fresh random salt for the month of `now`.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let mut bytes = [0u8; SALT_HEX_LEN / 2];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self {
            salt: hex::encode(bytes),
            rotation_month: rotation_month_of(now),
            rotated_at: now,
        }
    }

    pub fn is_rotation_due(&self, now: DateTime<Utc>) -> bool {
        rotation_month_of(now) != self.rotation_month
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl std::fmt::Debug for SaltRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaltRecord")
            .field("salt", &"<redacted>")
            .field("rotation_month", &self.rotation_month)
            .field("rotated_at", &self.rotated_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn accepts_mixed_case_hex() {
        assert!(is_valid_salt(&"aB".repeat(32)));
        assert!(!is_valid_salt(&"ab".repeat(31)));
        assert!(!is_valid_salt(&"zz".repeat(32)));
        assert!(!is_valid_salt(&format!(" {}", "ab".repeat(32))));
    }

    #[test]
    fn generated_record_is_valid_and_dated() {
        let now = Utc.with_ymd_and_hms(2025, 6, 30, 23, 0, 0).unwrap();
        let record = SaltRecord::generate(now);
        assert!(is_valid_salt(&record.salt));
        assert_eq!(record.rotation_month, "2025-06");
        assert!(!record.is_rotation_due(now));
        assert!(record.is_rotation_due(now + chrono::Duration::hours(2)));
    }

    #[test]
    fn record_serializes_camel_case() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let json = SaltRecord::generate(now).to_json().unwrap();
        assert!(json.contains("\"rotationMonth\":\"2025-06\""));
        assert!(json.contains("\"rotatedAt\""));
    }

    #[test]
    fn parameter_always_beats_insecure_flag() {
        let config = AnonymizerConfig {
            salt_parameter: Some("/gatekeeper/salt".to_string()),
            insecure_test_salt: Some(true),
        };
        assert_eq!(
            SaltSource::from_config(&config),
            Some(SaltSource::Production {
                parameter: "/gatekeeper/salt".to_string()
            })
        );
    }

    #[test]
    fn insecure_requires_explicit_flag() {
        assert_eq!(SaltSource::from_config(&AnonymizerConfig::default()), None);
        let config = AnonymizerConfig {
            salt_parameter: None,
            insecure_test_salt: Some(true),
        };
        assert_eq!(SaltSource::from_config(&config), Some(SaltSource::InsecureTestSalt));
    }
}
