//! Core traits for the signup registry
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`RosterSource`]: Load snapshots of the official enrollment roster
//! - [`RecordStore`]: Persist one record per student with atomic creation
//! - [`MailTransport`]: Deliver access tokens out-of-band
//! - [`AuditLog`]: Append-only audit trail for record writes

pub mod roster_source;
pub mod record_store;
pub mod mail_transport;
pub mod audit_log;

pub use roster_source::RosterSource;
pub use record_store::RecordStore;
pub use mail_transport::MailTransport;
pub use audit_log::{AuditLog, AuditEntry, AuditAction};
