//! Block counter backends: atomic increments, TTL expiry, outages.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use gatekeeper_core::errors::StorageError;
use gatekeeper_core::traits::{BlockCounterStore, Clock, ManualClock};
use gatekeeper_storage::{InMemoryBlockCounterStore, SqliteBlockCounterStore};

const TTL: Duration = Duration::from_secs(10_800);

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 5, 1, 14, 0, 0).unwrap(),
    ))
}

async fn increments_and_reads(store: &dyn BlockCounterStore) {
    assert_eq!(store.get("blocks:acme/repo:2025-05-01T14").await.unwrap(), None);
    for expected in 1..=3 {
        let n = store
            .increment("blocks:acme/repo:2025-05-01T14", TTL)
            .await
            .unwrap();
        assert_eq!(n, expected);
    }
    assert_eq!(
        store.get("blocks:acme/repo:2025-05-01T14").await.unwrap(),
        Some(3)
    );
    // Independent key.
    assert_eq!(
        store.increment("blocks:acme/other:2025-05-01T14", TTL).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn memory_store_counts_per_key() {
    let store = InMemoryBlockCounterStore::new(clock());
    increments_and_reads(&store).await;
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn sqlite_store_counts_per_key() {
    let store = SqliteBlockCounterStore::open_in_memory(clock()).unwrap();
    increments_and_reads(&store).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_increments_are_not_lost() {
    let store = Arc::new(InMemoryBlockCounterStore::new(clock()));
    let mut handles = Vec::new();
    for _ in 0..64 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.increment("blocks:acme/repo:2025-05-01T14", TTL).await
        }));
    }
    let mut seen = Vec::new();
    for h in handles {
        seen.push(h.await.unwrap().unwrap());
    }
    seen.sort_unstable();
    assert_eq!(seen, (1..=64).collect::<Vec<u64>>());
    assert_eq!(
        store.get("blocks:acme/repo:2025-05-01T14").await.unwrap(),
        Some(64)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_concurrent_increments_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(
        SqliteBlockCounterStore::open(&dir.path().join("counters.db"), clock()).unwrap(),
    );
    let mut handles = Vec::new();
    for _ in 0..32 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.increment("blocks:acme/repo:2025-05-01T14", TTL).await
        }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }
    assert_eq!(
        store.get("blocks:acme/repo:2025-05-01T14").await.unwrap(),
        Some(32)
    );
}

#[tokio::test]
async fn expired_counters_restart_from_one() {
    let clock = clock();
    let store = InMemoryBlockCounterStore::new(clock.clone());
    let key = "blocks:acme/repo:2025-05-01T14";
    store.increment(key, Duration::from_secs(3_600)).await.unwrap();
    store.increment(key, Duration::from_secs(3_600)).await.unwrap();

    clock.advance(chrono::Duration::seconds(3_600));
    assert_eq!(store.get(key).await.unwrap(), None);
    assert_eq!(store.increment(key, Duration::from_secs(3_600)).await.unwrap(), 1);
}

#[tokio::test]
async fn sqlite_expired_counters_restart_and_purge() {
    let clock = clock();
    let store = SqliteBlockCounterStore::open_in_memory(clock.clone()).unwrap();
    let key = "blocks:acme/repo:2025-05-01T14";
    store.increment(key, Duration::from_secs(3_600)).await.unwrap();
    store.increment("blocks:acme/other:2025-05-01T14", Duration::from_secs(7_200))
        .await
        .unwrap();

    clock.advance(chrono::Duration::seconds(3_601));
    assert_eq!(store.get(key).await.unwrap(), None);
    assert_eq!(store.purge_expired().unwrap(), 1);
    assert_eq!(store.increment(key, Duration::from_secs(3_600)).await.unwrap(), 1);
}

#[tokio::test]
async fn purge_drops_only_expired_keys() {
    let clock = clock();
    let store = InMemoryBlockCounterStore::new(clock.clone());
    store.increment("short", Duration::from_secs(60)).await.unwrap();
    store.increment("long", Duration::from_secs(7_200)).await.unwrap();
    clock.advance(chrono::Duration::seconds(61));
    assert_eq!(store.purge_expired(), 1);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("long").await.unwrap(), Some(1));
}

#[tokio::test]
async fn unavailable_store_fails_instead_of_returning_zero() {
    let store = InMemoryBlockCounterStore::new(clock());
    store.set_available(false);
    let err = store.increment("k", TTL).await.unwrap_err();
    assert!(matches!(err, StorageError::Unavailable { .. }));
    assert!(store.get("k").await.is_err());

    store.set_available(true);
    assert_eq!(store.increment("k", TTL).await.unwrap(), 1);
}

#[test]
fn clock_is_shared_not_copied() {
    let clock = clock();
    let as_dyn: Arc<dyn Clock> = clock.clone();
    clock.advance(chrono::Duration::minutes(5));
    assert_eq!(as_dyn.now(), clock.now());
}
