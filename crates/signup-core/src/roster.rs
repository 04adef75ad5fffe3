// # Roster Snapshot
//
// The roster is the authoritative, read-only list of enrolled
// students, maintained and periodically refreshed outside this
// system. Each registration request loads one snapshot and treats it
// as immutable for the duration of the request.
//
// ## Schema
//
// The roster document is a JSON array using the roster's own
// upper-case field names, distinct from the persisted record schema:
//
// ```json
// [
//   { "STUDENT_ID": "123456", "LAST_NAME": "Rossi", "FIRST_NAME": "Mario" }
// ]
// ```
//
// Normalization to the record schema happens here, at the boundary.
//
// ## Lookup
//
// Entries are indexed by student id at parse time, so per-request
// lookups are O(1) regardless of roster size.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::traits::RosterSource;

/// One enrolled student as the roster describes them
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterEntry {
    #[serde(rename = "STUDENT_ID")]
    pub student_id: String,
    #[serde(rename = "LAST_NAME")]
    pub last_name: String,
    #[serde(rename = "FIRST_NAME")]
    pub first_name: String,
}

/// An immutable roster snapshot, indexed by student id
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: HashMap<String, RosterEntry>,
}

impl Roster {
    /// Parse a roster document.
    ///
    /// A malformed document is fatal to the requesting operation and
    /// is surfaced as a roster error, never retried here.
    pub fn parse(data: &str) -> Result<Self> {
        let entries: Vec<RosterEntry> = serde_json::from_str(data)
            .map_err(|e| Error::roster(format!("failed to parse roster document: {}", e)))?;
        Ok(Self::from_entries(entries))
    }

    /// Build a snapshot from already-parsed entries.
    ///
    /// Later duplicates of a student id replace earlier ones; the
    /// roster source guarantees uniqueness, this is just the tiebreak.
    pub fn from_entries(entries: Vec<RosterEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| (entry.student_id.clone(), entry))
            .collect();
        Self { entries }
    }

    /// Look up an enrolled student by id
    pub fn lookup(&self, student_id: &str) -> Option<&RosterEntry> {
        self.entries.get(student_id)
    }

    /// Number of enrolled students in this snapshot
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Roster source backed by an externally-refreshed JSON file.
///
/// The file is re-read on every snapshot request, so an external
/// refresh is picked up without coordination. Each request still sees
/// exactly one immutable snapshot.
#[derive(Debug, Clone)]
pub struct FileRosterSource {
    path: PathBuf,
}

impl FileRosterSource {
    /// Create a roster source reading from the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl RosterSource for FileRosterSource {
    async fn snapshot(&self) -> Result<Roster> {
        let data = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::roster(format!(
                "failed to read roster file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let roster = Roster::parse(&data)?;
        tracing::debug!("loaded roster snapshot: {} entries", roster.len());
        Ok(roster)
    }
}
