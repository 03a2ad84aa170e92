//! Trust store contract, run against both backends, plus file layout checks.

use chrono::{DateTime, Duration, TimeZone, Utc};
use gatekeeper_core::config::TrustStoreConfig;
use gatekeeper_core::errors::StorageError;
use gatekeeper_core::models::{
    OrganizationIdentity, OrganizationReputation, StakePledge, VerificationMethod,
};
use gatekeeper_core::traits::{IdentityAdapter, NonceBindingStore, ReputationAdapter};
use gatekeeper_storage::trust::atomic::{read_json_or_default, write_json_atomic};
use gatekeeper_storage::{FileTrustStore, InMemoryTrustStore};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, 10, 9, 0, 0).unwrap()
}

fn identity(org: &str, method: VerificationMethod, customer: Option<&str>) -> OrganizationIdentity {
    OrganizationIdentity {
        org_id: org.to_string(),
        verification_method: method,
        stripe_customer_id: customer.map(str::to_string),
        unique_nonce: format!("nonce-{org}"),
        verified_at: t0(),
    }
}

fn reputation(org: &str, score: f64) -> OrganizationReputation {
    OrganizationReputation {
        org_id: org.to_string(),
        reputation_score: score,
        last_updated: t0(),
    }
}

fn identity_contract(store: &dyn IdentityAdapter) {
    store
        .store_identity(identity("acme", VerificationMethod::Stripe, Some("cus_1")))
        .unwrap();
    store
        .store_identity(identity("globex", VerificationMethod::Domain, None))
        .unwrap();

    // Second identity claiming the same customer id is rejected; the first stays.
    let err = store
        .store_identity(identity("initech", VerificationMethod::Stripe, Some("cus_1")))
        .unwrap_err();
    assert_eq!(
        err,
        StorageError::UniqueConstraint {
            field: "stripe_customer_id".to_string(),
            value: "cus_1".to_string(),
        }
    );
    assert!(store.get_identity("initech").unwrap().is_none());
    assert_eq!(
        store.find_by_stripe_customer_id("cus_1").unwrap().unwrap().org_id,
        "acme"
    );

    // Re-storing the same org replaces in place.
    let mut updated = identity("acme", VerificationMethod::Stripe, Some("cus_1"));
    updated.unique_nonce = "shared".to_string();
    store.store_identity(updated).unwrap();
    let mut other = identity("globex", VerificationMethod::Domain, None);
    other.unique_nonce = "shared".to_string();
    store.store_identity(other).unwrap();
    assert_eq!(store.count_nonce_usages("shared").unwrap(), 2);
    assert_eq!(store.count_nonce_usages("unknown").unwrap(), 0);

    let stripe: Vec<String> = store
        .list_stripe_verified()
        .unwrap()
        .into_iter()
        .map(|i| i.org_id)
        .collect();
    assert_eq!(stripe, vec!["acme".to_string()]);

    assert!(store.revoke_identity("acme").unwrap());
    assert!(!store.revoke_identity("acme").unwrap());
    assert!(store.find_by_stripe_customer_id("cus_1").unwrap().is_none());

    // Once revoked, the customer id is free again.
    store
        .store_identity(identity("initech", VerificationMethod::Stripe, Some("cus_1")))
        .unwrap();
}

fn reputation_contract(store: &dyn ReputationAdapter) {
    store.update_reputation(reputation("a", 0.4)).unwrap();
    store.update_reputation(reputation("b", 0.9)).unwrap();
    store.update_reputation(reputation("c", 0.7)).unwrap();
    store.update_reputation(reputation("a", 0.8)).unwrap();

    assert_eq!(store.get_reputation("a").unwrap().unwrap().reputation_score, 0.8);
    let ranked: Vec<String> = store
        .list_reputations_at_or_above(0.7)
        .unwrap()
        .into_iter()
        .map(|r| r.org_id)
        .collect();
    assert_eq!(ranked, vec!["b", "a", "c"]);
    assert!(store.list_reputations_at_or_above(0.95).unwrap().is_empty());

    assert!(store.get_stake_pledge("a").unwrap().is_none());
    store
        .update_stake_pledge(StakePledge {
            org_id: "a".to_string(),
            amount: 5_000,
            pledged_at: t0(),
        })
        .unwrap();
    store
        .update_stake_pledge(StakePledge {
            org_id: "a".to_string(),
            amount: 7_500,
            pledged_at: t0() + Duration::days(1),
        })
        .unwrap();
    assert_eq!(store.get_stake_pledge("a").unwrap().unwrap().amount, 7_500);
}

fn binding_contract(store: &dyn NonceBindingStore) {
    assert!(store.active_binding("acme").unwrap().is_none());
    store.issue_binding("acme", "n1", t0()).unwrap();
    let second = store
        .issue_binding("acme", "n2", t0() + Duration::minutes(5))
        .unwrap();
    assert!(second.is_active());
    assert_eq!(store.active_binding("acme").unwrap().unwrap().nonce, "n2");

    assert!(store.revoke_binding("acme", t0() + Duration::minutes(10)).unwrap());
    assert!(store.active_binding("acme").unwrap().is_none());
    assert!(!store.revoke_binding("acme", t0() + Duration::minutes(11)).unwrap());
}

#[test]
fn memory_store_honours_contract() {
    let store = InMemoryTrustStore::new();
    identity_contract(&store);
    reputation_contract(&store);
    binding_contract(&store);
}

#[test]
fn file_store_honours_contract() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTrustStore::open(dir.path().join("trust")).unwrap();
    identity_contract(&store);
    reputation_contract(&store);
    binding_contract(&store);
}

#[test]
fn file_store_layout_is_independent_json_arrays() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTrustStore::open(dir.path()).unwrap();
    store
        .store_identity(identity("acme", VerificationMethod::Stripe, Some("cus_9")))
        .unwrap();
    store.update_reputation(reputation("acme", 0.5)).unwrap();

    let identities: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.path().join("identities.json")).unwrap())
            .unwrap();
    assert_eq!(identities[0]["orgId"], "acme");
    assert_eq!(identities[0]["stripeCustomerId"], "cus_9");
    assert_eq!(identities[0]["verificationMethod"], "stripe");

    let reputations: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.path().join("reputations.json")).unwrap())
            .unwrap();
    assert_eq!(reputations[0]["reputationScore"], 0.5);

    // No pledge was written, so there is no pledges file yet.
    assert!(!dir.path().join("pledges.json").exists());

    // Nothing but the committed tables is left behind.
    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["identities.json", "reputations.json"]);
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = FileTrustStore::open(dir.path()).unwrap();
        store
            .store_identity(identity("acme", VerificationMethod::Github, None))
            .unwrap();
        store.issue_binding("acme", "n1", t0()).unwrap();
    }
    let reopened = FileTrustStore::open(dir.path()).unwrap();
    assert!(reopened.get_identity("acme").unwrap().is_some());
    assert_eq!(reopened.active_binding("acme").unwrap().unwrap().nonce, "n1");
}

#[test]
fn configured_data_dir_is_resolved_against_the_project_root() {
    let project = tempfile::tempdir().unwrap();

    let default_store = FileTrustStore::from_config(&TrustStoreConfig::default(), project.path()).unwrap();
    assert_eq!(default_store.dir(), project.path().join(".gatekeeper/trust"));
    assert!(default_store.dir().is_dir());

    let elsewhere = tempfile::tempdir().unwrap();
    let config = TrustStoreConfig {
        data_dir: Some(elsewhere.path().join("trust").display().to_string()),
    };
    let store = FileTrustStore::from_config(&config, project.path()).unwrap();
    assert_eq!(store.dir(), elsewhere.path().join("trust"));
    store
        .store_identity(identity("acme", VerificationMethod::Github, None))
        .unwrap();
    assert!(elsewhere.path().join("trust/identities.json").exists());
}

#[test]
fn corrupt_table_is_an_error_not_an_empty_table() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("identities.json"), b"[{\"orgId\":").unwrap();
    let store = FileTrustStore::open(dir.path()).unwrap();
    let err = store.get_identity("acme").unwrap_err();
    assert!(matches!(err, StorageError::Serialization { .. }));
}

#[test]
fn atomic_write_replaces_whole_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("values.json");
    write_json_atomic(&path, &vec![1u32, 2, 3]).unwrap();
    write_json_atomic(&path, &vec![4u32]).unwrap();
    let values: Vec<u32> = read_json_or_default(&path).unwrap();
    assert_eq!(values, vec![4]);

    let missing: Vec<u32> = read_json_or_default(&dir.path().join("absent.json")).unwrap();
    assert!(missing.is_empty());
}
