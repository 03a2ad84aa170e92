use std::fmt;

use serde::{Deserialize, Serialize};

use super::ServiceTier;

/// The repository a decision is being made for, plus the caller's tier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoContext {
    pub owner: String,
    pub repo: String,
    #[serde(default)]
    pub tier: ServiceTier,
}

impl RepoContext {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, tier: ServiceTier) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            tier,
        }
    }

    /// `owner/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepoContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
