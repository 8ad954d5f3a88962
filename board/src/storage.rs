//! Snapshot persistence.
//!
//! Storage is best-effort: the board keeps working when a save fails, and the
//! failure comes back to the reducer as a `SnapshotSaveFailed` action.

use crate::board::BoardSnapshot;
use futures::future::{self, BoxFuture, FutureExt};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Errors from snapshot storage
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the snapshot file failed
    #[error("snapshot I/O error at {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The snapshot could not be encoded or decoded
    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Boxed future returned by [`SnapshotStore`] methods
pub type StorageFuture<'a, T> = BoxFuture<'a, Result<T>>;

/// Somewhere to keep the latest board snapshot
///
/// Uses boxed futures so the store can live behind `Arc<dyn SnapshotStore>`
/// in the environment.
pub trait SnapshotStore: Send + Sync {
    /// Persists `snapshot`
    ///
    /// Returns `false` when the store already holds a newer or equal revision
    /// and the write was skipped.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if encoding or writing fails.
    fn save(&self, snapshot: BoardSnapshot) -> StorageFuture<'_, bool>;

    /// Loads the last saved snapshot, `None` if nothing was saved yet
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if reading or decoding fails.
    fn load(&self) -> StorageFuture<'_, Option<BoardSnapshot>>;
}

/// JSON file on disk
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so a crash mid-write leaves the previous snapshot intact. Saves are
/// serialized and a save older than the last written revision is dropped,
/// since effects may finish out of order.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    last_written: Arc<tokio::sync::Mutex<Option<u64>>>,
}

impl JsonFileStore {
    /// Store backed by the file at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_written: Arc::new(tokio::sync::Mutex::new(None)),
        }
    }

    /// Target file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn write(&self, snapshot: BoardSnapshot) -> Result<bool> {
        let mut last_written = self.last_written.lock().await;
        if last_written.is_some_and(|revision| revision >= snapshot.revision) {
            tracing::debug!(
                revision = snapshot.revision,
                path = %self.path.display(),
                "Skipping stale snapshot"
            );
            return Ok(false);
        }

        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| io_error(parent, source))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, &bytes)
            .await
            .map_err(|source| io_error(&temp, source))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|source| io_error(&self.path, source))?;

        *last_written = Some(snapshot.revision);
        tracing::debug!(
            revision = snapshot.revision,
            bytes = bytes.len(),
            path = %self.path.display(),
            "Snapshot written"
        );
        Ok(true)
    }

    async fn read(&self) -> Result<Option<BoardSnapshot>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(io_error(&self.path, source)),
        };
        let snapshot: BoardSnapshot = serde_json::from_slice(&bytes)?;

        let mut last_written = self.last_written.lock().await;
        if last_written.is_none_or(|revision| revision < snapshot.revision) {
            *last_written = Some(snapshot.revision);
        }
        Ok(Some(snapshot))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl SnapshotStore for JsonFileStore {
    fn save(&self, snapshot: BoardSnapshot) -> StorageFuture<'_, bool> {
        self.write(snapshot).boxed()
    }

    fn load(&self) -> StorageFuture<'_, Option<BoardSnapshot>> {
        self.read().boxed()
    }
}

/// In-memory store for tests and for running without a snapshot path
#[derive(Clone, Debug, Default)]
pub struct InMemorySnapshotStore {
    latest: Arc<RwLock<Option<BoardSnapshot>>>,
}

impl InMemorySnapshotStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds `snapshot`
    #[must_use]
    pub fn with_snapshot(snapshot: BoardSnapshot) -> Self {
        Self {
            latest: Arc::new(RwLock::new(Some(snapshot))),
        }
    }

    /// Revision of the held snapshot
    #[must_use]
    pub fn revision(&self) -> Option<u64> {
        self.read_latest().as_ref().map(|snapshot| snapshot.revision)
    }

    /// Copy of the held snapshot
    #[must_use]
    pub fn latest(&self) -> Option<BoardSnapshot> {
        self.read_latest().clone()
    }

    fn read_latest(&self) -> std::sync::RwLockReadGuard<'_, Option<BoardSnapshot>> {
        self.latest.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn save(&self, snapshot: BoardSnapshot) -> StorageFuture<'_, bool> {
        let mut latest = self.latest.write().unwrap_or_else(PoisonError::into_inner);
        let written = if latest
            .as_ref()
            .is_some_and(|current| current.revision >= snapshot.revision)
        {
            false
        } else {
            *latest = Some(snapshot);
            true
        };
        future::ready(Ok(written)).boxed()
    }

    fn load(&self) -> StorageFuture<'_, Option<BoardSnapshot>> {
        future::ready(Ok(self.latest())).boxed()
    }
}
