// # Memory Record Store
//
// In-memory implementation of RecordStore.
//
// ## Purpose
//
// Provides a simple, fast record store that doesn't persist across
// restarts. Useful for testing and throwaway deployments.
//
// ## Atomic Creation
//
// Creation uses the map entry under an exclusive write lock, so two
// concurrent first-time registrations can never both succeed.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Error;
use crate::record::StudentRecord;
use crate::traits::record_store::RecordStore;

/// In-memory record store implementation
///
/// # Example
///
/// ```rust,no_run
/// use signup_core::store::MemoryRecordStore;
/// use signup_core::record::StudentRecord;
/// use signup_core::traits::RecordStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryRecordStore::new();
///
///     let record = StudentRecord::new("123456", "Rossi", "Mario");
///     store.create("123456", &record).await?;
///     assert!(store.exists("123456").await?);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    inner: Arc<RwLock<HashMap<String, StudentRecord>>>,
}

impl MemoryRecordStore {
    /// Create a new empty memory record store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of records in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Clear all records from the store
    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn exists(&self, student_id: &str) -> Result<bool, Error> {
        Ok(self.inner.read().await.contains_key(student_id))
    }

    async fn read(&self, student_id: &str) -> Result<Option<StudentRecord>, Error> {
        Ok(self.inner.read().await.get(student_id).cloned())
    }

    async fn create(&self, student_id: &str, record: &StudentRecord) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        match guard.entry(student_id.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
            Entry::Occupied(_) => Err(Error::already_exists(format!(
                "record for student {} already exists",
                student_id
            ))),
        }
    }

    async fn write(&self, student_id: &str, record: &StudentRecord) -> Result<(), Error> {
        self.inner
            .write()
            .await
            .insert(student_id.to_string(), record.clone());
        Ok(())
    }
}
