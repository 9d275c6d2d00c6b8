//! Unit tests for the in-memory revocation store

use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;

use crate::domain::entities::{BlacklistEntry, RefreshStatus, RefreshTokenRecord};
use crate::repositories::revocation::{InMemoryRevocationStore, RevocationStore};

fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

#[tokio::test]
async fn test_record_and_find_refresh() {
    let store = InMemoryRevocationStore::new();
    let record = RefreshTokenRecord::new("rt-1", "alice", t0(), Duration::days(7));

    store.record_refresh(&record).await.unwrap();

    let found = store.find_refresh("rt-1").await.unwrap().unwrap();
    assert_eq!(found.subject_id, "alice");
    assert_eq!(found.status, RefreshStatus::Active);
    assert!(store.find_refresh("rt-2").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_refresh_rejected() {
    let store = InMemoryRevocationStore::new();
    let record = RefreshTokenRecord::new("rt-1", "alice", t0(), Duration::days(7));

    store.record_refresh(&record).await.unwrap();
    assert!(store.record_refresh(&record).await.is_err());
}

#[tokio::test]
async fn test_revoke_refresh_reports_change() {
    let store = InMemoryRevocationStore::new();
    let record = RefreshTokenRecord::new("rt-1", "alice", t0(), Duration::days(7));
    store.record_refresh(&record).await.unwrap();

    assert!(store.revoke_refresh("rt-1", t0()).await.unwrap());
    assert!(!store.revoke_refresh("rt-1", t0()).await.unwrap());
    assert!(!store.revoke_refresh("missing", t0()).await.unwrap());

    let found = store.find_refresh("rt-1").await.unwrap().unwrap();
    assert!(found.is_revoked());
}

#[tokio::test]
async fn test_concurrent_revoke_has_single_winner() {
    let store = Arc::new(InMemoryRevocationStore::new());
    let record = RefreshTokenRecord::new("rt-1", "alice", t0(), Duration::days(7));
    store.record_refresh(&record).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.revoke_refresh("rt-1", t0()).await.unwrap()
        }));
    }

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_revoke_all_for_subject() {
    let store = InMemoryRevocationStore::new();
    for (id, subject) in [("a", "alice"), ("b", "alice"), ("c", "bob")] {
        let record = RefreshTokenRecord::new(id, subject, t0(), Duration::days(7));
        store.record_refresh(&record).await.unwrap();
    }
    store.revoke_refresh("a", t0()).await.unwrap();

    let revoked = store.revoke_all_for_subject("alice", t0()).await.unwrap();
    assert_eq!(revoked, 1);
    assert!(store.find_refresh("b").await.unwrap().unwrap().is_revoked());
    assert!(!store.find_refresh("c").await.unwrap().unwrap().is_revoked());
}

#[tokio::test]
async fn test_blacklist_is_keyed_by_jti() {
    let store = InMemoryRevocationStore::new();
    let entry = BlacklistEntry::new("jti-1", t0() + Duration::minutes(15));

    store.blacklist_access(&entry).await.unwrap();

    assert!(store.is_blacklisted("jti-1").await.unwrap());
    assert!(!store.is_blacklisted("jti-2").await.unwrap());
}

#[tokio::test]
async fn test_cleanup_bounds_storage() {
    let store = InMemoryRevocationStore::new();
    let short = RefreshTokenRecord::new("short", "alice", t0(), Duration::hours(1));
    let long = RefreshTokenRecord::new("long", "alice", t0(), Duration::days(7));
    store.record_refresh(&short).await.unwrap();
    store.record_refresh(&long).await.unwrap();
    store
        .blacklist_access(&BlacklistEntry::new("old", t0() + Duration::minutes(15)))
        .await
        .unwrap();
    store
        .blacklist_access(&BlacklistEntry::new("new", t0() + Duration::hours(3)))
        .await
        .unwrap();

    let later = t0() + Duration::hours(2);
    assert_eq!(store.delete_expired_refresh(later).await.unwrap(), 1);
    assert_eq!(store.purge_blacklist(later).await.unwrap(), 1);

    assert_eq!(store.refresh_count().await, 1);
    assert_eq!(store.blacklist_count().await, 1);
    assert!(store.is_blacklisted("new").await.unwrap());
}
