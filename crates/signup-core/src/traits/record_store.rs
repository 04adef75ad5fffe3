// # Record Store Trait
//
// Defines the interface for the per-student persistence layer.
//
// ## Purpose
//
// The store holds at most one document per student id and guarantees
// that a record is created at most once, however many registration
// requests race for the same id.
//
// ## Atomic Creation
//
// `create` must be atomic with respect to other requests for the same
// student id. A naive existence check followed by a write lets two
// concurrent first-time registrations both observe "absent" and both
// create, corrupting the single-record invariant. Implementations
// serialize create/write per key (per-key mutual exclusion, exclusive
// file creation) instead of check-then-act.
//
// ## Implementations
//
// - File-based: one JSON document per student
// - In-memory: testing and ephemeral deployments

use async_trait::async_trait;

use crate::record::StudentRecord;

/// Trait for record store implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
/// Create and write operations for the same student id must be
/// mutually exclusive; operations for different ids are naturally
/// isolated by key.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Check whether a record exists for a student id
    ///
    /// # Returns
    ///
    /// - `Ok(bool)`: Whether the record exists
    /// - `Err(Error)`: Storage error
    async fn exists(&self, student_id: &str) -> Result<bool, crate::Error>;

    /// Read the record for a student id
    ///
    /// # Returns
    ///
    /// - `Ok(Some(StudentRecord))`: The stored record
    /// - `Ok(None)`: No record for this id
    /// - `Err(Error)`: Storage error
    async fn read(&self, student_id: &str) -> Result<Option<StudentRecord>, crate::Error>;

    /// Create the record for a student id, failing if one exists
    ///
    /// This is the atomic create-if-absent primitive; it must never be
    /// implemented as an existence check followed by a write.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Record created
    /// - `Err(Error::AlreadyExists)`: A record for this id exists
    /// - `Err(Error)`: Storage error
    async fn create(&self, student_id: &str, record: &StudentRecord) -> Result<(), crate::Error>;

    /// Write (upsert) the record for a student id
    ///
    /// Used for token refresh on an existing record. Success implies
    /// the record is durably persisted and the audit append (where the
    /// implementation has one) was attempted.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Record persisted
    /// - `Err(Error)`: Storage error
    async fn write(&self, student_id: &str, record: &StudentRecord) -> Result<(), crate::Error>;
}
