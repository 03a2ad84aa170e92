//! Secrets as files under a root directory (mounted secret volumes).
//!
//! Parameter `/gatekeeper/salt` maps to `<root>/gatekeeper/salt`. Values are
//! stored already decrypted; the decryption flag is accepted and ignored.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatekeeper_core::errors::StorageError;
use gatekeeper_core::traits::{SecretStore, SecretValue};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FileSecretStore {
    root: PathBuf,
}

impl FileSecretStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a parameter name to a path, refusing anything that would
    /// escape the root.
    fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(name.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if name.trim().is_empty() || escapes {
            return Err(StorageError::Io {
                path: name.to_string(),
                message: "invalid parameter name".to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get_parameter(
        &self,
        name: &str,
        _with_decryption: bool,
    ) -> Result<Option<SecretValue>, StorageError> {
        let path = self.resolve(name)?;
        let io_err = |e: std::io::Error| StorageError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        let value = match tokio::fs::read_to_string(&path).await {
            Ok(v) => v,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(parameter = name, "secret parameter not found");
                return Ok(None);
            }
            Err(e) => return Err(io_err(e)),
        };
        let last_modified = tokio::fs::metadata(&path)
            .await
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from);

        Ok(Some(SecretValue {
            value: value.trim_end_matches(['\n', '\r']).to_string(),
            last_modified,
        }))
    }
}
