//! Record tables and the write rules every trust backend shares.
//!
//! Writes are read-modify-write: locate the existing record by key and
//! replace it in place, else append.

use chrono::{DateTime, Utc};
use gatekeeper_core::errors::StorageError;
use gatekeeper_core::models::{
    NonceBinding, OrganizationIdentity, OrganizationReputation, StakePledge,
    VerificationMethod,
};

#[derive(Debug, Clone, Default)]
pub struct TrustTables {
    pub identities: Vec<OrganizationIdentity>,
    pub reputations: Vec<OrganizationReputation>,
    pub pledges: Vec<StakePledge>,
    pub bindings: Vec<NonceBinding>,
}

/// Replace the record whose key matches, else append.
pub(crate) fn upsert_by<T, K: PartialEq>(records: &mut Vec<T>, record: T, key: impl Fn(&T) -> K) {
    let k = key(&record);
    match records.iter_mut().find(|r| key(r) == k) {
        Some(existing) => *existing = record,
        None => records.push(record),
    }
}

/// Enforce stripe customer id uniqueness across *other* orgs, then upsert.
pub(crate) fn store_identity(
    identities: &mut Vec<OrganizationIdentity>,
    identity: OrganizationIdentity,
) -> Result<(), StorageError> {
    if let Some(customer_id) = identity.stripe_customer_id.as_deref() {
        let taken = identities.iter().any(|existing| {
            existing.org_id != identity.org_id
                && existing.stripe_customer_id.as_deref() == Some(customer_id)
        });
        if taken {
            return Err(StorageError::UniqueConstraint {
                field: "stripe_customer_id".to_string(),
                value: customer_id.to_string(),
            });
        }
    }
    upsert_by(identities, identity, |i| i.org_id.clone());
    Ok(())
}

pub(crate) fn revoke_identity(identities: &mut Vec<OrganizationIdentity>, org_id: &str) -> bool {
    let before = identities.len();
    identities.retain(|i| i.org_id != org_id);
    identities.len() != before
}

pub(crate) fn count_nonce_usages(identities: &[OrganizationIdentity], nonce: &str) -> usize {
    identities.iter().filter(|i| i.unique_nonce == nonce).count()
}

pub(crate) fn find_by_stripe_customer_id(
    identities: &[OrganizationIdentity],
    customer_id: &str,
) -> Option<OrganizationIdentity> {
    identities
        .iter()
        .find(|i| i.stripe_customer_id.as_deref() == Some(customer_id))
        .cloned()
}

pub(crate) fn list_stripe_verified(identities: &[OrganizationIdentity]) -> Vec<OrganizationIdentity> {
    identities
        .iter()
        .filter(|i| i.verification_method == VerificationMethod::Stripe)
        .cloned()
        .collect()
}

pub(crate) fn reputations_at_or_above(
    reputations: &[OrganizationReputation],
    min_score: f64,
) -> Vec<OrganizationReputation> {
    let mut out: Vec<_> = reputations
        .iter()
        .filter(|r| r.reputation_score >= min_score)
        .cloned()
        .collect();
    out.sort_by(|a, b| b.reputation_score.total_cmp(&a.reputation_score));
    out
}

/// Revoke any active binding for the org, then append the new one.
pub(crate) fn issue_binding(
    bindings: &mut Vec<NonceBinding>,
    org_id: &str,
    nonce: &str,
    issued_at: DateTime<Utc>,
) -> NonceBinding {
    revoke_binding(bindings, org_id, issued_at);
    let binding = NonceBinding {
        org_id: org_id.to_string(),
        nonce: nonce.to_string(),
        issued_at,
        revoked_at: None,
    };
    bindings.push(binding.clone());
    binding
}

pub(crate) fn active_binding(bindings: &[NonceBinding], org_id: &str) -> Option<NonceBinding> {
    bindings
        .iter()
        .find(|b| b.org_id == org_id && b.is_active())
        .cloned()
}

pub(crate) fn revoke_binding(bindings: &mut [NonceBinding], org_id: &str, at: DateTime<Utc>) -> bool {
    let mut revoked = false;
    for b in bindings.iter_mut().filter(|b| b.org_id == org_id && b.is_active()) {
        b.revoked_at = Some(at);
        revoked = true;
    }
    revoked
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn identity(org: &str, customer: Option<&str>) -> OrganizationIdentity {
        OrganizationIdentity {
            org_id: org.to_string(),
            verification_method: VerificationMethod::Stripe,
            stripe_customer_id: customer.map(str::to_string),
            unique_nonce: format!("nonce-{org}"),
            verified_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut ids = vec![identity("a", None), identity("b", None)];
        let mut updated = identity("a", Some("cus_1"));
        updated.unique_nonce = "fresh".to_string();
        store_identity(&mut ids, updated).unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].unique_nonce, "fresh");
    }

    #[test]
    fn same_org_may_keep_its_customer_id() {
        let mut ids = vec![identity("a", Some("cus_1"))];
        assert!(store_identity(&mut ids, identity("a", Some("cus_1"))).is_ok());
    }

    #[test]
    fn issuing_revokes_previous_binding() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        let mut bindings = Vec::new();
        issue_binding(&mut bindings, "org", "n1", t0);
        issue_binding(&mut bindings, "org", "n2", t1);
        let active: Vec<_> = bindings.iter().filter(|b| b.is_active()).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].nonce, "n2");
        assert_eq!(bindings[0].revoked_at, Some(t1));
    }
}
