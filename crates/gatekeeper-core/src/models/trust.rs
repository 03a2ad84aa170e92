//! Identity and reputation records consumed by trust-chain rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How an organization proved its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMethod {
    Stripe,
    Domain,
    Github,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationIdentity {
    pub org_id: String,
    pub verification_method: VerificationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_customer_id: Option<String>,
    pub unique_nonce: String,
    pub verified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationReputation {
    pub org_id: String,
    pub reputation_score: f64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakePledge {
    pub org_id: String,
    /// Pledged amount in the smallest currency unit.
    pub amount: u64,
    pub pledged_at: DateTime<Utc>,
}

/// A nonce issued to an organization. Terminal once `revoked_at` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonceBinding {
    pub org_id: String,
    pub nonce: String,
    pub issued_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
}

impl NonceBinding {
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none()
    }
}
