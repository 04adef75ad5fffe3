// # Roster Source Trait
//
// Defines the interface for loading the enrollment roster.
//
// ## Purpose
//
// The roster is maintained outside this system and refreshed
// periodically. A source hands out point-in-time snapshots; a request
// takes exactly one snapshot and treats it as immutable, so roster
// refreshes never change validation results mid-request.
//
// ## Implementations
//
// - File-based: re-reads an externally-refreshed JSON document
//   ([`crate::roster::FileRosterSource`])
// - Test doubles with fixed entries

use async_trait::async_trait;

use crate::roster::Roster;

/// Trait for roster source implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks;
/// the roster is read-only shared state.
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Load a point-in-time roster snapshot
    ///
    /// # Returns
    ///
    /// - `Ok(Roster)`: A snapshot to use for the current request
    /// - `Err(Error)`: The roster could not be read or parsed; fatal
    ///   to the requesting operation, not retried
    async fn snapshot(&self) -> Result<Roster, crate::Error>;
}
