//! Contract Test: Payload Validation
//!
//! Constraints verified:
//! - A payload carrying a `Token` field is always rejected, on both
//!   endpoints, regardless of other field validity
//! - Unrecognized field names are always rejected
//! - Malformed student ids are rejected before any roster snapshot or
//!   store access happens
//!
//! If this test fails, clients can smuggle state into the store.

mod common;

use std::sync::atomic::Ordering;

use common::*;
use serde_json::json;
use signup_core::engine::SignupEngine;
use signup_core::error::Error;
use signup_core::store::MemoryRecordStore;
use signup_core::traits::RecordStore;

fn setup() -> (
    SignupEngine,
    MemoryRecordStore,
    std::sync::Arc<std::sync::atomic::AtomicUsize>,
    std::sync::Arc<MockMailTransport>,
) {
    let store = MemoryRecordStore::new();
    let roster = StaticRosterSource::new(sample_entries());
    let snapshots = roster.snapshot_counter();
    let mailer = MockMailTransport::new();
    let engine = SignupEngine::new(
        Box::new(roster),
        Box::new(store.clone()),
        Box::new(SharedMailTransport(mailer.clone())),
    );
    (engine, store, snapshots, mailer)
}

#[tokio::test]
async fn token_field_is_rejected_on_both_endpoints() {
    let (engine, store, _snapshots, mailer) = setup();

    let mut payload = id_payload("123456");
    payload.insert("Token".to_string(), json!("stolen"));

    let err = engine.register(&payload).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let err = engine.confirm(&payload).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    assert!(store.is_empty().await);
    assert_eq!(mailer.delivery_count(), 0);
}

#[tokio::test]
async fn unrecognized_field_is_rejected() {
    let (engine, store, _snapshots, _mailer) = setup();

    let mut payload = id_payload("123456");
    payload.insert("IsAdmin".to_string(), json!(true));

    let err = engine.register(&payload).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn allowed_profile_fields_pass_validation() {
    let (engine, store, _snapshots, _mailer) = setup();

    let mut payload = id_payload("123456");
    payload.insert("Blog".to_string(), json!("https://blog.example"));
    payload.insert("Wikipedia".to_string(), json!("Mario_Rossi"));

    engine.register(&payload).await.unwrap();
    assert_eq!(store.len().await, 1);

    // Submitted profile values are not persisted by this flow
    let record = store.read("123456").await.unwrap().unwrap();
    assert_eq!(record.blog, "");
    assert_eq!(record.wikipedia, "");
}

#[tokio::test]
async fn malformed_id_is_rejected_before_roster_lookup() {
    let (engine, store, snapshots, _mailer) = setup();

    for id in ["12345", "1234567", "12345a", ""] {
        let err = engine.register(&id_payload(id)).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "id {:?}", id);
    }

    assert_eq!(
        snapshots.load(Ordering::SeqCst),
        0,
        "format failures must never reach the roster"
    );
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn missing_student_id_is_rejected() {
    let (engine, _store, snapshots, _mailer) = setup();

    let payload = serde_json::Map::new();
    let err = engine.register(&payload).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(snapshots.load(Ordering::SeqCst), 0);
}
