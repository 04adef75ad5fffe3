//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal test doubles that verify the
//! registration/confirmation contracts without real I/O collaborators.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use signup_core::error::{Error, Result};
use signup_core::roster::{Roster, RosterEntry};
use signup_core::traits::{MailTransport, RosterSource};

/// A roster source serving a fixed set of entries, counting snapshots
pub struct StaticRosterSource {
    roster: Roster,
    snapshot_count: Arc<AtomicUsize>,
}

impl StaticRosterSource {
    /// Create a source from fixed roster entries
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Self {
            roster: Roster::from_entries(entries),
            snapshot_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle to the snapshot counter, usable after the source is boxed
    pub fn snapshot_counter(&self) -> Arc<AtomicUsize> {
        self.snapshot_count.clone()
    }
}

#[async_trait::async_trait]
impl RosterSource for StaticRosterSource {
    async fn snapshot(&self) -> Result<Roster> {
        self.snapshot_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.roster.clone())
    }
}

/// A mail transport recording deliveries, optionally failing on demand
#[derive(Default)]
pub struct MockMailTransport {
    sent: std::sync::Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

impl MockMailTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every subsequent delivery fail
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Deliveries recorded so far as (student_id, token) pairs
    pub fn deliveries(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn delivery_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

/// Boxable handle to a shared `MockMailTransport`
///
/// The orphan rule forbids implementing `MailTransport` for
/// `Arc<MockMailTransport>` here, so this local newtype carries the
/// shared handle into the engine instead.
pub struct SharedMailTransport(pub Arc<MockMailTransport>);

#[async_trait::async_trait]
impl MailTransport for SharedMailTransport {
    async fn send_token(&self, student_id: &str, token: &str) -> Result<()> {
        if self.0.fail.load(Ordering::SeqCst) {
            return Err(Error::dispatch("mock transport configured to fail"));
        }
        self.0
            .sent
            .lock()
            .unwrap()
            .push((student_id.to_string(), token.to_string()));
        Ok(())
    }

    fn transport_name(&self) -> &str {
        "mock"
    }
}

/// Roster containing Rossi/Mario (123456) and Bianchi/Anna (654321)
pub fn sample_entries() -> Vec<RosterEntry> {
    let data = r#"[
        { "STUDENT_ID": "123456", "LAST_NAME": "Rossi", "FIRST_NAME": "Mario" },
        { "STUDENT_ID": "654321", "LAST_NAME": "Bianchi", "FIRST_NAME": "Anna" }
    ]"#;
    serde_json::from_str(data).expect("sample roster parses")
}

/// Build a `{ "StudentId": id }` payload object
pub fn id_payload(student_id: &str) -> serde_json::Map<String, serde_json::Value> {
    let mut payload = serde_json::Map::new();
    payload.insert(
        "StudentId".to_string(),
        serde_json::Value::String(student_id.to_string()),
    );
    payload
}
