//! Signup engine
//!
//! The SignupEngine is responsible for:
//! - Validating request payloads against the profile-field allow-list
//! - Validating claimed student ids against the roster
//! - Creating records idempotently (at most once per student)
//! - Issuing single-use tokens
//! - Dispatching token delivery via the mail transport
//!
//! ## Architecture
//!
//! ```text
//!                      ┌──────────────┐
//!  register(payload) ──▶ SignupEngine │◀── confirm(payload)
//!                      └──────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          │                   │                   │
//!          ▼                   ▼                   ▼
//!  ┌──────────────┐    ┌──────────────┐    ┌───────────────┐
//!  │ RosterSource │    │ RecordStore  │    │ MailTransport │
//!  │ (validate)   │    │ (create/     │    │ (deliver)     │
//!  └──────────────┘    │  issue)      │    └───────────────┘
//!                      └──────────────┘
//! ```
//!
//! ## Registration Flow
//!
//! 1. Validate payload, extract and format-check the student id
//! 2. Load a roster snapshot, look the id up (not found → reject)
//! 3. Create a fresh empty record; an existing record is benign
//! 4. Generate a new token, overwrite the record's `Token`, persist
//! 5. Return the record without its id, keyed by display name
//!
//! Each step is an explicit sequential async operation with `?` as
//! the error channel; within one request the steps never reorder.
//!
//! ## Confirmation Flow
//!
//! 1. Validate payload the same way (clients never submit tokens)
//! 2. Read the record (never created → reject)
//! 3. Ask the mail transport to deliver the currently stored token

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::{
    ALLOWED_PROFILE_FIELDS, ProfileRecord, StudentRecord, is_valid_student_id, mask_student_id,
};
use crate::token;
use crate::traits::{MailTransport, RecordStore, RosterSource};

/// What a successful registration returns to the caller.
///
/// Deliberately excludes the literal student id: the record is the
/// [`ProfileRecord`] projection and the id appears only masked.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationReceipt {
    /// Display name for template rendering ("LastName, FirstName")
    #[serde(rename = "Name")]
    pub display_name: String,

    /// Masked student id safe to echo alongside the token
    #[serde(rename = "MaskedId")]
    pub masked_id: String,

    /// The updated record, student id stripped, fresh token included
    #[serde(rename = "Record")]
    pub record: ProfileRecord,
}

/// Core signup engine
///
/// Owns the collaborators as trait objects and composes the
/// registration and confirmation flows over them.
///
/// ## Threading
///
/// All operations are `&self`; the engine is shared across request
/// handlers behind an `Arc`. Per-student mutual exclusion is the
/// record store's responsibility, everything else is naturally
/// isolated by key.
pub struct SignupEngine {
    /// Roster source for identity validation
    roster: Box<dyn RosterSource>,

    /// Record store for per-student persistence
    store: Box<dyn RecordStore>,

    /// Mail transport for out-of-band token delivery
    mailer: Box<dyn MailTransport>,
}

impl SignupEngine {
    /// Create a new signup engine from its collaborators
    pub fn new(
        roster: Box<dyn RosterSource>,
        store: Box<dyn RecordStore>,
        mailer: Box<dyn MailTransport>,
    ) -> Self {
        Self {
            roster,
            store,
            mailer,
        }
    }

    /// Handle a registration request (`POST /matr_sent`).
    ///
    /// Creates the record on first registration; on every invocation
    /// that reaches issuance, regenerates the token (the previous
    /// value becomes invalid as soon as the write persists).
    pub async fn register(&self, payload: &Map<String, Value>) -> Result<RegistrationReceipt> {
        let student_id = validate_payload(payload)?;

        // One immutable snapshot per request
        let roster = self.roster.snapshot().await?;
        let entry = roster.lookup(&student_id).ok_or_else(|| {
            Error::not_found(format!("student {} is not on the roster", student_id))
        })?;

        let fresh = StudentRecord::new(&student_id, &entry.last_name, &entry.first_name);
        match self.store.create(&student_id, &fresh).await {
            Ok(()) => {
                info!("created record for student {}", student_id);
            }
            Err(Error::AlreadyExists(_)) => {
                // Idempotent creation: a repeat visit just refreshes
                // the token below.
                debug!("record for student {} already exists", student_id);
            }
            Err(e) => return Err(e),
        }

        self.issue_token(&student_id).await
    }

    /// Issue a fresh token for an existing record.
    ///
    /// Registration must have created the record first; a missing
    /// record here is a caller-sequencing error, not a user error.
    async fn issue_token(&self, student_id: &str) -> Result<RegistrationReceipt> {
        let mut record = self.store.read(student_id).await?.ok_or_else(|| {
            Error::store(format!(
                "record for student {} missing at token issuance",
                student_id
            ))
        })?;

        record.token = token::generate();
        self.store.write(student_id, &record).await?;
        info!("issued new token for student {}", student_id);

        let display_name = record.display_name();
        Ok(RegistrationReceipt {
            display_name,
            masked_id: mask_student_id(student_id),
            record: record.into_profile(),
        })
    }

    /// Handle a confirmation request (`POST /confirm_sent`).
    ///
    /// On success the currently stored token has been handed to the
    /// mail transport; no token state changes either way. Submitted
    /// profile values are validated but not persisted by this flow.
    pub async fn confirm(&self, payload: &Map<String, Value>) -> Result<()> {
        let student_id = validate_payload(payload)?;

        let record = self.store.read(&student_id).await?.ok_or_else(|| {
            Error::not_found(format!("no record exists for student {}", student_id))
        })?;

        if record.token.is_empty() {
            // Registration creates the record and issues a token in
            // one flow; an empty token means that flow never finished.
            return Err(Error::dispatch(format!(
                "no token has been issued for student {}",
                student_id
            )));
        }

        info!(
            "dispatching token for student {} via {} transport",
            student_id,
            self.mailer.transport_name()
        );
        self.mailer.send_token(&student_id, &record.token).await?;
        Ok(())
    }
}

/// Validate a request payload and extract the student id.
///
/// Shared by both endpoints:
/// - a `Token` field must be absent (clients never submit tokens)
/// - `StudentId` must be present, a string, and pass the format check
///   (rejected before any roster or store access)
/// - with `StudentId` removed, every remaining field must be on the
///   profile-field allow-list
pub fn validate_payload(payload: &Map<String, Value>) -> Result<String> {
    if payload.contains_key("Token") {
        return Err(Error::validation("payload must not contain a Token field"));
    }

    let student_id = payload
        .get("StudentId")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::validation("missing or non-string StudentId"))?;

    if !is_valid_student_id(student_id) {
        return Err(Error::validation(format!(
            "malformed student id: {:?}",
            student_id
        )));
    }

    for key in payload.keys() {
        if key == "StudentId" {
            continue;
        }
        if !ALLOWED_PROFILE_FIELDS.contains(&key.as_str()) {
            return Err(Error::validation(format!("unrecognized field: {}", key)));
        }
    }

    Ok(student_id.to_string())
}
