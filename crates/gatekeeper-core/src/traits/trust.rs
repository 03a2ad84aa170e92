//! Trust-store capability sets: identities, reputation, nonce bindings.

use chrono::{DateTime, Utc};

use crate::errors::StorageError;
use crate::models::{
    NonceBinding, OrganizationIdentity, OrganizationReputation, StakePledge,
};

/// Identity records. At most one identity per org id and at most one per
/// stripe customer id; both enforced by the adapter at write time.
pub trait IdentityAdapter: Send + Sync {
    fn get_identity(&self, org_id: &str) -> Result<Option<OrganizationIdentity>, StorageError>;

    /// Insert or replace in place. Fails with `UniqueConstraint` if a
    /// different org already holds the same stripe customer id.
    fn store_identity(&self, identity: OrganizationIdentity) -> Result<(), StorageError>;

    /// Remove the identity. Returns whether a record was removed.
    fn revoke_identity(&self, org_id: &str) -> Result<bool, StorageError>;

    /// How many stored identities carry `nonce` as their unique nonce.
    fn count_nonce_usages(&self, nonce: &str) -> Result<usize, StorageError>;

    fn find_by_stripe_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<OrganizationIdentity>, StorageError>;

    /// All identities verified through the payment provider.
    fn list_stripe_verified(&self) -> Result<Vec<OrganizationIdentity>, StorageError>;
}

pub trait ReputationAdapter: Send + Sync {
    fn get_reputation(&self, org_id: &str)
        -> Result<Option<OrganizationReputation>, StorageError>;

    fn update_reputation(&self, reputation: OrganizationReputation) -> Result<(), StorageError>;

    fn get_stake_pledge(&self, org_id: &str) -> Result<Option<StakePledge>, StorageError>;

    fn update_stake_pledge(&self, pledge: StakePledge) -> Result<(), StorageError>;

    /// Reputations with `reputation_score >= min_score`, highest score first.
    fn list_reputations_at_or_above(
        &self,
        min_score: f64,
    ) -> Result<Vec<OrganizationReputation>, StorageError>;
}

/// Nonce issuance. At most one active binding per org at a time.
pub trait NonceBindingStore: Send + Sync {
    /// Issue a new binding, revoking any active one for the same org at `issued_at`.
    fn issue_binding(
        &self,
        org_id: &str,
        nonce: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<NonceBinding, StorageError>;

    fn active_binding(&self, org_id: &str) -> Result<Option<NonceBinding>, StorageError>;

    /// Revoke the active binding. Returns whether one was active.
    fn revoke_binding(&self, org_id: &str, at: DateTime<Utc>) -> Result<bool, StorageError>;
}
