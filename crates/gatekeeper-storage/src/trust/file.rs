//! File-backed trust store: one JSON array per record kind.
//!
//! Layout under the data directory: `identities.json`, `reputations.json`,
//! `pledges.json`, and `nonce_bindings.json`. Each file is keyed internally by
//! org id; no cross-file foreign keys are enforced.
//!
//! Single-process only. Writers inside this process are serialized by a
//! mutex and every write goes through [`write_json_atomic`], but writers in
//! other processes are not coordinated: two processes writing the same file
//! can lose each other's updates.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use gatekeeper_core::config::TrustStoreConfig;
use gatekeeper_core::constants::{
    IDENTITIES_FILE, NONCE_BINDINGS_FILE, PLEDGES_FILE, REPUTATIONS_FILE,
};
use gatekeeper_core::errors::StorageError;
use gatekeeper_core::models::{
    NonceBinding, OrganizationIdentity, OrganizationReputation, StakePledge,
};
use gatekeeper_core::traits::{IdentityAdapter, NonceBindingStore, ReputationAdapter};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

use super::atomic::{read_json_or_default, write_json_atomic};
use super::tables::{self, upsert_by};

pub struct FileTrustStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTrustStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| StorageError::Io {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Open the store named by `[trust_store] data_dir`. A relative directory
    /// is resolved against `project_root`.
    pub fn from_config(
        config: &TrustStoreConfig,
        project_root: &Path,
    ) -> Result<Self, StorageError> {
        Self::open(project_root.join(config.effective_data_dir()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn load<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, StorageError> {
        read_json_or_default(&self.path(file))
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Read-modify-write one table under the writer lock.
    fn modify<T, R>(
        &self,
        file: &str,
        f: impl FnOnce(&mut Vec<T>) -> Result<R, StorageError>,
    ) -> Result<R, StorageError>
    where
        T: DeserializeOwned + Serialize,
    {
        let _guard = self.lock();
        let mut records: Vec<T> = self.load(file)?;
        let out = f(&mut records)?;
        write_json_atomic(&self.path(file), &records)?;
        debug!(file, records = records.len(), "trust table written");
        Ok(out)
    }
}

impl IdentityAdapter for FileTrustStore {
    fn get_identity(&self, org_id: &str) -> Result<Option<OrganizationIdentity>, StorageError> {
        let identities: Vec<OrganizationIdentity> = self.load(IDENTITIES_FILE)?;
        Ok(identities.into_iter().find(|i| i.org_id == org_id))
    }

    #[instrument(skip(self, identity))]
    fn store_identity(&self, identity: OrganizationIdentity) -> Result<(), StorageError> {
        self.modify(IDENTITIES_FILE, |ids| tables::store_identity(ids, identity))
    }

    fn revoke_identity(&self, org_id: &str) -> Result<bool, StorageError> {
        self.modify(IDENTITIES_FILE, |ids: &mut Vec<OrganizationIdentity>| {
            Ok(tables::revoke_identity(ids, org_id))
        })
    }

    fn count_nonce_usages(&self, nonce: &str) -> Result<usize, StorageError> {
        let identities: Vec<OrganizationIdentity> = self.load(IDENTITIES_FILE)?;
        Ok(tables::count_nonce_usages(&identities, nonce))
    }

    fn find_by_stripe_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<OrganizationIdentity>, StorageError> {
        let identities: Vec<OrganizationIdentity> = self.load(IDENTITIES_FILE)?;
        Ok(tables::find_by_stripe_customer_id(&identities, customer_id))
    }

    fn list_stripe_verified(&self) -> Result<Vec<OrganizationIdentity>, StorageError> {
        let identities: Vec<OrganizationIdentity> = self.load(IDENTITIES_FILE)?;
        Ok(tables::list_stripe_verified(&identities))
    }
}

impl ReputationAdapter for FileTrustStore {
    fn get_reputation(
        &self,
        org_id: &str,
    ) -> Result<Option<OrganizationReputation>, StorageError> {
        let reputations: Vec<OrganizationReputation> = self.load(REPUTATIONS_FILE)?;
        Ok(reputations.into_iter().find(|r| r.org_id == org_id))
    }

    #[instrument(skip(self, reputation))]
    fn update_reputation(&self, reputation: OrganizationReputation) -> Result<(), StorageError> {
        self.modify(REPUTATIONS_FILE, |reps| {
            upsert_by(reps, reputation, |r: &OrganizationReputation| r.org_id.clone());
            Ok(())
        })
    }

    fn get_stake_pledge(&self, org_id: &str) -> Result<Option<StakePledge>, StorageError> {
        let pledges: Vec<StakePledge> = self.load(PLEDGES_FILE)?;
        Ok(pledges.into_iter().find(|p| p.org_id == org_id))
    }

    #[instrument(skip(self, pledge))]
    fn update_stake_pledge(&self, pledge: StakePledge) -> Result<(), StorageError> {
        self.modify(PLEDGES_FILE, |pledges| {
            upsert_by(pledges, pledge, |p: &StakePledge| p.org_id.clone());
            Ok(())
        })
    }

    fn list_reputations_at_or_above(
        &self,
        min_score: f64,
    ) -> Result<Vec<OrganizationReputation>, StorageError> {
        let reputations: Vec<OrganizationReputation> = self.load(REPUTATIONS_FILE)?;
        Ok(tables::reputations_at_or_above(&reputations, min_score))
    }
}

impl NonceBindingStore for FileTrustStore {
    fn issue_binding(
        &self,
        org_id: &str,
        nonce: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<NonceBinding, StorageError> {
        self.modify(NONCE_BINDINGS_FILE, |bindings| {
            Ok(tables::issue_binding(bindings, org_id, nonce, issued_at))
        })
    }

    fn active_binding(&self, org_id: &str) -> Result<Option<NonceBinding>, StorageError> {
        let bindings: Vec<NonceBinding> = self.load(NONCE_BINDINGS_FILE)?;
        Ok(tables::active_binding(&bindings, org_id))
    }

    fn revoke_binding(&self, org_id: &str, at: DateTime<Utc>) -> Result<bool, StorageError> {
        self.modify(NONCE_BINDINGS_FILE, |bindings: &mut Vec<NonceBinding>| {
            Ok(tables::revoke_binding(bindings, org_id, at))
        })
    }
}
