use crate::key::Key;

/// Errors from storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No value is stored under the key.
    #[error("key not found: {0}")]
    NotFound(Key),

    /// The key string cannot be normalized.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other backend failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
