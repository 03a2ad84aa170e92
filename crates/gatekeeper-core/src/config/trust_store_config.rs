//! Trust store configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TrustStoreConfig {
    /// Directory of the file-backed trust store. Default: `.gatekeeper/trust`.
    pub data_dir: Option<String>,
}

impl TrustStoreConfig {
    pub fn effective_data_dir(&self) -> &str {
        self.data_dir.as_deref().unwrap_or(".gatekeeper/trust")
    }
}
