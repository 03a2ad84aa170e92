//! Anonymizer configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnonymizerConfig {
    /// Name of the production salt parameter in the secret store.
    pub salt_parameter: Option<String>,
    /// Use the well-known, non-secret test salt. Local/test execution only;
    /// rejected by validation whenever `salt_parameter` is set.
    pub insecure_test_salt: Option<bool>,
}

impl AnonymizerConfig {
    pub fn effective_insecure_test_salt(&self) -> bool {
        self.insecure_test_salt.unwrap_or(false)
    }
}
