pub mod local;
pub mod memory;

use std::sync::Arc;

/// Key-value blob store holding serialized board snapshots.
/// Implementations: MemoryStore (process-local), LocalStore (one file per key).
pub trait SnapshotStore: Send + Sync {
    /// Read the blob stored under `key`, `None` if nothing is stored.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the blob stored under `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the blob under `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Arc<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
