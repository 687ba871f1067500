use crate::storage::StorageError;
use crate::types::ColumnId;

/// Errors surfaced by the repository and the view-model.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    #[error("Index {index} out of range for column {column} (len {len})")]
    IndexOutOfRange {
        column: ColumnId,
        index: usize,
        len: usize,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Stale board: expected version {expected}, store has {found}")]
    Conflict { expected: u64, found: u64 },

    #[error("Stored board is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
