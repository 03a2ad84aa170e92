//! In-memory trust store. Same contract as the file-backed store.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use gatekeeper_core::errors::StorageError;
use gatekeeper_core::models::{
    NonceBinding, OrganizationIdentity, OrganizationReputation, StakePledge,
};
use gatekeeper_core::traits::{IdentityAdapter, NonceBindingStore, ReputationAdapter};

use super::tables::{self, upsert_by, TrustTables};

#[derive(Default)]
pub struct InMemoryTrustStore {
    tables: RwLock<TrustTables>,
}

impl InMemoryTrustStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, TrustTables> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, TrustTables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl IdentityAdapter for InMemoryTrustStore {
    fn get_identity(&self, org_id: &str) -> Result<Option<OrganizationIdentity>, StorageError> {
        Ok(self.read().identities.iter().find(|i| i.org_id == org_id).cloned())
    }

    fn store_identity(&self, identity: OrganizationIdentity) -> Result<(), StorageError> {
        tables::store_identity(&mut self.write().identities, identity)
    }

    fn revoke_identity(&self, org_id: &str) -> Result<bool, StorageError> {
        Ok(tables::revoke_identity(&mut self.write().identities, org_id))
    }

    fn count_nonce_usages(&self, nonce: &str) -> Result<usize, StorageError> {
        Ok(tables::count_nonce_usages(&self.read().identities, nonce))
    }

    fn find_by_stripe_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<OrganizationIdentity>, StorageError> {
        Ok(tables::find_by_stripe_customer_id(&self.read().identities, customer_id))
    }

    fn list_stripe_verified(&self) -> Result<Vec<OrganizationIdentity>, StorageError> {
        Ok(tables::list_stripe_verified(&self.read().identities))
    }
}

impl ReputationAdapter for InMemoryTrustStore {
    fn get_reputation(
        &self,
        org_id: &str,
    ) -> Result<Option<OrganizationReputation>, StorageError> {
        Ok(self.read().reputations.iter().find(|r| r.org_id == org_id).cloned())
    }

    fn update_reputation(&self, reputation: OrganizationReputation) -> Result<(), StorageError> {
        upsert_by(&mut self.write().reputations, reputation, |r| r.org_id.clone());
        Ok(())
    }

    fn get_stake_pledge(&self, org_id: &str) -> Result<Option<StakePledge>, StorageError> {
        Ok(self.read().pledges.iter().find(|p| p.org_id == org_id).cloned())
    }

    fn update_stake_pledge(&self, pledge: StakePledge) -> Result<(), StorageError> {
        upsert_by(&mut self.write().pledges, pledge, |p| p.org_id.clone());
        Ok(())
    }

    fn list_reputations_at_or_above(
        &self,
        min_score: f64,
    ) -> Result<Vec<OrganizationReputation>, StorageError> {
        Ok(tables::reputations_at_or_above(&self.read().reputations, min_score))
    }
}

impl NonceBindingStore for InMemoryTrustStore {
    fn issue_binding(
        &self,
        org_id: &str,
        nonce: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<NonceBinding, StorageError> {
        Ok(tables::issue_binding(&mut self.write().bindings, org_id, nonce, issued_at))
    }

    fn active_binding(&self, org_id: &str) -> Result<Option<NonceBinding>, StorageError> {
        Ok(tables::active_binding(&self.read().bindings, org_id))
    }

    fn revoke_binding(&self, org_id: &str, at: DateTime<Utc>) -> Result<bool, StorageError> {
        Ok(tables::revoke_binding(&mut self.write().bindings, org_id, at))
    }
}
