//! Evidence files on the local filesystem.
//!
//! Writes go to a uniquely named temporary sibling, are fsynced, then
//! renamed into place. `TempFileGuard` removes the temporary on every exit
//! path that did not complete the rename.

use crate::ports::outbound::{EvidenceStore, StorageError, StoredFile};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, storage_path: &str) -> PathBuf {
        self.root.join(storage_path)
    }
}

fn io_error(path: &Path, err: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Removes a temporary file unless disarmed.
struct TempFileGuard {
    path: PathBuf,
    armed: bool,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to remove temporary evidence file");
            }
        }
    }
}

#[async_trait]
impl EvidenceStore for LocalFileStore {
    async fn store(&self, storage_path: &str, bytes: &[u8]) -> Result<StoredFile, StorageError> {
        let final_path = self.resolve(storage_path);
        let size = bytes.len() as u64;

        // Content-addressed: an existing file already holds these bytes.
        if tokio::fs::try_exists(&final_path).await.unwrap_or(false) {
            debug!(path = %final_path.display(), "Evidence file already stored");
            return Ok(StoredFile {
                storage_path: storage_path.to_string(),
                size,
            });
        }

        if let Some(parent) = final_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }

        let file_name = final_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = final_path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()));
        let mut guard = TempFileGuard::new(temp_path.clone());

        let mut file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| io_error(&temp_path, e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| io_error(&temp_path, e))?;
        file.sync_all()
            .await
            .map_err(|e| io_error(&temp_path, e))?;
        drop(file);

        tokio::fs::rename(&temp_path, &final_path)
            .await
            .map_err(|e| io_error(&final_path, e))?;
        guard.disarm();

        debug!(path = %final_path.display(), size, "Evidence file stored");
        Ok(StoredFile {
            storage_path: storage_path.to_string(),
            size,
        })
    }

    async fn read(&self, storage_path: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(storage_path);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound {
                path: storage_path.to_string(),
            }),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}
