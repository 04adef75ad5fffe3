// # Audit Log Trait
//
// Defines the interface for the append-only write audit trail.
//
// ## Purpose
//
// Every successful record write is also recorded in an external
// append-only history keyed by timestamp and author (in the original
// deployment, a version-control commit). The store awaits the append
// before reporting success, but an append failure degrades to a
// logged warning rather than failing the user-visible write: the
// record itself persisted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What a record write did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// First-time record creation
    Created,
    /// Existing record overwritten (token refresh)
    Updated,
}

/// One audit trail entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the write happened
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Who performed the write (this service's identity)
    pub author: String,
    /// The record key that was written
    pub student_id: String,
    /// What the write did
    pub action: AuditAction,
}

impl AuditEntry {
    /// Create an entry stamped with the current time
    pub fn now(author: impl Into<String>, student_id: impl Into<String>, action: AuditAction) -> Self {
        Self {
            timestamp: chrono::Utc::now(),
            author: author.into(),
            student_id: student_id.into(),
            action,
        }
    }
}

/// Trait for audit log implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append one entry to the audit trail
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Entry durably appended
    /// - `Err(Error)`: Append failed; callers degrade this to a
    ///   warning, never to a failed write
    async fn append(&self, entry: &AuditEntry) -> Result<(), crate::Error>;
}
