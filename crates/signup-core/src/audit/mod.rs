// # File Audit Log
//
// Append-only JSON-lines implementation of AuditLog.
//
// ## Purpose
//
// Stands in for the version-control history the original deployment
// committed record writes to: an external, append-only trail keyed by
// timestamp and author. One JSON object per line, appended under a
// mutex so concurrent writes never interleave within a line.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::Error;
use crate::traits::audit_log::{AuditEntry, AuditLog};

/// Audit log appending JSON lines to a single file
pub struct FileAuditLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileAuditLog {
    /// Create an audit log appending to the given path
    ///
    /// Creates parent directories if needed; the file itself is
    /// created on first append.
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "failed to create audit log directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }
}

#[async_trait]
impl AuditLog for FileAuditLog {
    async fn append(&self, entry: &AuditEntry) -> Result<(), Error> {
        let mut line = serde_json::to_string(entry)
            .map_err(|e| Error::audit(format!("failed to serialize audit entry: {}", e)))?;
        line.push('\n');

        let _guard = self.lock.lock().await;

        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                Error::audit(format!(
                    "failed to open audit log {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        file.write_all(line.as_bytes()).await.map_err(|e| {
            Error::audit(format!(
                "failed to append to audit log {}: {}",
                self.path.display(),
                e
            ))
        })?;
        file.flush().await.map_err(|e| {
            Error::audit(format!(
                "failed to flush audit log {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::audit_log::AuditAction;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_appends_one_json_line_per_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.log");
        let log = FileAuditLog::new(&path).await.unwrap();

        log.append(&AuditEntry::now("signup-registry", "123456", AuditAction::Created))
            .await
            .unwrap();
        log.append(&AuditEntry::now("signup-registry", "123456", AuditAction::Updated))
            .await
            .unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: AuditEntry = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.student_id, "123456");
        assert_eq!(first.action, AuditAction::Created);
        assert_eq!(first.author, "signup-registry");

        let second: AuditEntry = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.action, AuditAction::Updated);
        assert!(second.timestamp >= first.timestamp);
    }

    #[tokio::test]
    async fn test_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/dir/audit.log");
        let log = FileAuditLog::new(&path).await.unwrap();

        log.append(&AuditEntry::now("signup-registry", "654321", AuditAction::Created))
            .await
            .unwrap();
        assert!(path.exists());
    }
}
