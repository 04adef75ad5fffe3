// # File Record Store
//
// File-based implementation of RecordStore: one JSON document per
// student id under a records directory.
//
// ## Atomic Creation
//
// `create` opens the record file with `create_new`, so the filesystem
// itself arbitrates concurrent first-time registrations: exactly one
// wins, the others observe `AlreadyExists`. A per-key async mutex
// additionally serializes create/write for the same id in-process, so
// a token refresh never interleaves with a half-written document. Idle
// lock entries are evicted, keeping the map bounded by in-flight
// writes rather than every id ever written.
//
// ## Durability
//
// Writes go to a temporary file first and are renamed into place, so
// a reader never observes a partial document. After each successful
// create/write the audit log is appended; an audit failure is logged
// and does not fail the write (the record itself persisted).
//
// ## File Format
//
// ```json
// {
//   "FirstName": "Mario",
//   "LastName": "Rossi",
//   "StudentId": "123456",
//   "Token": "…",
//   "Blog": "", "Twitter": "", "Wikipedia": "", "Video": "",
//   "Post1": "", "Post2": "", "Post3": ""
// }
// ```

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::Error;
use crate::record::StudentRecord;
use crate::traits::audit_log::{AuditAction, AuditEntry, AuditLog};
use crate::traits::record_store::RecordStore;

/// Author recorded in audit entries written by this store
const AUDIT_AUTHOR: &str = "signup-registry";

/// File-based record store with atomic per-student creation
///
/// # Example
///
/// ```rust,no_run
/// use signup_core::store::FileRecordStore;
/// use signup_core::record::StudentRecord;
/// use signup_core::traits::RecordStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileRecordStore::new("/var/lib/signup/records").await?;
///
///     let record = StudentRecord::new("123456", "Rossi", "Mario");
///     store.create("123456", &record).await?;
///
///     assert!(store.exists("123456").await?);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct FileRecordStore {
    dir: PathBuf,
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
    audit: Option<Arc<dyn AuditLog>>,
}

impl FileRecordStore {
    /// Create a record store rooted at the given directory
    ///
    /// Creates the directory (and parents) if it does not exist.
    pub async fn new<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        let dir = dir.as_ref().to_path_buf();

        if !dir.exists() {
            fs::create_dir_all(&dir).await.map_err(|e| {
                Error::config(format!(
                    "failed to create records directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        Ok(Self {
            dir,
            locks: Arc::new(Mutex::new(HashMap::new())),
            audit: None,
        })
    }

    /// Attach an audit log appended after each successful write
    pub fn with_audit(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Path of the document for a student id
    fn record_path(&self, student_id: &str) -> PathBuf {
        self.dir.join(format!("{student_id}.json"))
    }

    /// Path of the temporary file used for atomic writes
    fn temp_path(&self, student_id: &str) -> PathBuf {
        self.dir.join(format!("{student_id}.json.tmp"))
    }

    /// Get (or lazily create) the mutex guarding one student id
    async fn key_lock(&self, student_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(student_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop a key's lock entry once no other task holds a handle to it.
    ///
    /// Keeps the map bounded by the number of ids with in-flight
    /// writes rather than every id ever written. A waiter still queued
    /// on the mutex holds its own `Arc`, so the count check leaves the
    /// entry in place for it.
    async fn release_key_lock(&self, student_id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        if let Some(existing) = locks.get(student_id)
            && Arc::ptr_eq(existing, &lock)
            && Arc::strong_count(&lock) <= 2
        {
            locks.remove(student_id);
        }
    }

    /// Append to the audit trail, degrading failure to a warning
    async fn audit_write(&self, student_id: &str, action: AuditAction) {
        if let Some(audit) = &self.audit {
            let entry = AuditEntry::now(AUDIT_AUTHOR, student_id, action);
            if let Err(e) = audit.append(&entry).await {
                tracing::warn!(
                    "audit append failed for student {} ({:?}): {}",
                    student_id,
                    action,
                    e
                );
            }
        }
    }

    fn serialize(record: &StudentRecord) -> Result<String, Error> {
        serde_json::to_string_pretty(record)
            .map_err(|e| Error::store(format!("failed to serialize record: {}", e)))
    }

    /// `create` body, called with the key mutex held
    async fn create_locked(&self, student_id: &str, record: &StudentRecord) -> Result<(), Error> {
        let path = self.record_path(student_id);
        let json = Self::serialize(record)?;

        // Exclusive creation: the filesystem arbitrates races with
        // other processes, not an existence check.
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(Error::already_exists(format!(
                    "record for student {} already exists",
                    student_id
                )));
            }
            Err(e) => {
                return Err(Error::store(format!(
                    "failed to create record file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        file.write_all(json.as_bytes()).await.map_err(|e| {
            Error::store(format!(
                "failed to write record file {}: {}",
                path.display(),
                e
            ))
        })?;
        file.flush().await.map_err(|e| {
            Error::store(format!(
                "failed to flush record file {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::debug!("created record for student {}", student_id);
        self.audit_write(student_id, AuditAction::Created).await;
        Ok(())
    }

    /// `write` body, called with the key mutex held
    async fn write_locked(&self, student_id: &str, record: &StudentRecord) -> Result<(), Error> {
        let path = self.record_path(student_id);
        let temp_path = self.temp_path(student_id);
        let json = Self::serialize(record)?;

        // Write to temporary file first
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::store(format!(
                    "failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::store(format!(
                    "failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::store(format!(
                    "failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        // Atomic rename (temp -> actual)
        fs::rename(&temp_path, &path).await.map_err(|e| {
            Error::store(format!(
                "failed to rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::trace!("wrote record for student {}", student_id);
        self.audit_write(student_id, AuditAction::Updated).await;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn exists(&self, student_id: &str) -> Result<bool, Error> {
        match fs::metadata(self.record_path(student_id)).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::store(format!(
                "failed to stat record for student {}: {}",
                student_id, e
            ))),
        }
    }

    async fn read(&self, student_id: &str) -> Result<Option<StudentRecord>, Error> {
        let path = self.record_path(student_id);

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::store(format!(
                    "failed to read record file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let record: StudentRecord = serde_json::from_str(&content).map_err(|e| {
            Error::store(format!(
                "failed to parse record file {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(Some(record))
    }

    async fn create(&self, student_id: &str, record: &StudentRecord) -> Result<(), Error> {
        let lock = self.key_lock(student_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.create_locked(student_id, record).await
        };
        self.release_key_lock(student_id, lock).await;
        result
    }

    async fn write(&self, student_id: &str, record: &StudentRecord) -> Result<(), Error> {
        let lock = self.key_lock(student_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.write_locked(student_id, record).await
        };
        self.release_key_lock(student_id, lock).await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_store_basic() {
        let dir = tempdir().unwrap();
        let store = FileRecordStore::new(dir.path().join("records"))
            .await
            .unwrap();

        assert!(!store.exists("123456").await.unwrap());
        assert_eq!(store.read("123456").await.unwrap(), None);

        let record = StudentRecord::new("123456", "Rossi", "Mario");
        store.create("123456", &record).await.unwrap();

        assert!(store.exists("123456").await.unwrap());
        let read_back = store.read("123456").await.unwrap().unwrap();
        assert_eq!(read_back, record);
    }

    #[tokio::test]
    async fn test_create_twice_fails_with_already_exists() {
        let dir = tempdir().unwrap();
        let store = FileRecordStore::new(dir.path()).await.unwrap();

        let record = StudentRecord::new("123456", "Rossi", "Mario");
        store.create("123456", &record).await.unwrap();

        let err = store.create("123456", &record).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));

        // The original record survives the failed second create
        let read_back = store.read("123456").await.unwrap().unwrap();
        assert_eq!(read_back, record);
    }

    #[tokio::test]
    async fn test_write_persists_across_instances() {
        let dir = tempdir().unwrap();

        {
            let store = FileRecordStore::new(dir.path()).await.unwrap();
            let mut record = StudentRecord::new("123456", "Rossi", "Mario");
            store.create("123456", &record).await.unwrap();

            record.token = "fresh-token".to_string();
            store.write("123456", &record).await.unwrap();
        }

        let store = FileRecordStore::new(dir.path()).await.unwrap();
        let record = store.read("123456").await.unwrap().unwrap();
        assert_eq!(record.token, "fresh-token");
    }

    #[tokio::test]
    async fn test_concurrent_creates_yield_one_record() {
        let dir = tempdir().unwrap();
        let store = Arc::new(FileRecordStore::new(dir.path()).await.unwrap());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let record = StudentRecord::new("123456", "Rossi", "Mario");
                store.create("123456", &record).await
            }));
        }

        let mut created = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => created += 1,
                Err(Error::AlreadyExists(_)) => conflicts += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(created, 1, "exactly one create must win");
        assert_eq!(conflicts, 7);
        assert!(store.exists("123456").await.unwrap());

        // Once every contender is done the lock map is drained
        assert!(store.locks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_key_locks_are_evicted_after_use() {
        let dir = tempdir().unwrap();
        let store = FileRecordStore::new(dir.path()).await.unwrap();

        let mut record = StudentRecord::new("123456", "Rossi", "Mario");
        store.create("123456", &record).await.unwrap();
        record.token = "t".to_string();
        store.write("123456", &record).await.unwrap();

        // The failing path releases its lock entry too
        let other = StudentRecord::new("123456", "Rossi", "Mario");
        assert!(store.create("123456", &other).await.is_err());

        assert!(
            store.locks.lock().await.is_empty(),
            "lock map must not grow with every id touched"
        );
    }

    #[tokio::test]
    async fn test_audit_appended_on_create_and_write() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        #[derive(Default)]
        struct CountingAudit {
            appended: AtomicUsize,
        }

        #[async_trait]
        impl AuditLog for CountingAudit {
            async fn append(&self, _entry: &AuditEntry) -> Result<(), Error> {
                self.appended.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        let dir = tempdir().unwrap();
        let audit = Arc::new(CountingAudit::default());
        let store = FileRecordStore::new(dir.path())
            .await
            .unwrap()
            .with_audit(audit.clone());

        let mut record = StudentRecord::new("123456", "Rossi", "Mario");
        store.create("123456", &record).await.unwrap();
        record.token = "t".to_string();
        store.write("123456", &record).await.unwrap();

        assert_eq!(audit.appended.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_fail_write() {
        struct FailingAudit;

        #[async_trait]
        impl AuditLog for FailingAudit {
            async fn append(&self, _entry: &AuditEntry) -> Result<(), Error> {
                Err(Error::audit("append-only log unavailable"))
            }
        }

        let dir = tempdir().unwrap();
        let store = FileRecordStore::new(dir.path())
            .await
            .unwrap()
            .with_audit(Arc::new(FailingAudit));

        let record = StudentRecord::new("123456", "Rossi", "Mario");
        store.create("123456", &record).await.unwrap();
        store.write("123456", &record).await.unwrap();
        assert!(store.exists("123456").await.unwrap());
    }
}
