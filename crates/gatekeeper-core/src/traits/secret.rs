use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::StorageError;

/// A named secret value as returned by the secret backend.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue {
    pub value: String,
    pub last_modified: Option<DateTime<Utc>>,
}

impl SecretValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            last_modified: None,
        }
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretValue")
            .field("value", &"<redacted>")
            .field("last_modified", &self.last_modified)
            .finish()
    }
}

/// Read-only access to named parameters.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// `Ok(None)` means the parameter does not exist. Callers treat absence
    /// and empty values as hard failures, never as a default.
    async fn get_parameter(
        &self,
        name: &str,
        with_decryption: bool,
    ) -> Result<Option<SecretValue>, StorageError>;
}
