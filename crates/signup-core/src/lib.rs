// # signup-core
//
// Core library for the student signup registry.
//
// ## Architecture Overview
//
// This library provides the registration/token-issuance workflow and
// its backing record store:
// - **RosterSource**: Trait for loading the official enrollment roster
// - **RecordStore**: Trait for per-student persisted records
// - **MailTransport**: Trait for out-of-band token delivery
// - **AuditLog**: Trait for the append-only write audit trail
// - **SignupEngine**: Orchestrates roster validation → record creation
//   → token issuance, and confirmation dispatch
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Library-First**: All core functionality can be used as a library
// 3. **Idempotency**: Record creation happens at most once per student
// 4. **Per-Key Isolation**: The only cross-request synchronization is
//    mutual exclusion of create/write for the same student id

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod record;
pub mod roster;
pub mod store;
pub mod token;
pub mod audit;
pub mod mail;

// Re-export core types for convenience
pub use traits::{RosterSource, RecordStore, MailTransport, AuditLog};
pub use engine::{SignupEngine, RegistrationReceipt};
pub use config::{SignupConfig, RosterConfig, StoreConfig, MailerConfig};
pub use error::{Error, Result};
pub use record::{StudentRecord, ProfileRecord};
pub use roster::{Roster, RosterEntry, FileRosterSource};
pub use store::{MemoryRecordStore, FileRecordStore};
