use mvr_metadata::MetadataError;
use mvr_store::StoreError;

/// Errors from staging operations.
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    /// The upload path cannot be mapped to a staging key.
    #[error("invalid upload path: {0}")]
    InvalidPath(String),

    /// The candidate metadata names no usable version.
    #[error("invalid staged version {0:?}")]
    InvalidVersion(String),

    /// The candidate metadata could not be read.
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience alias for staging results.
pub type StagingResult<T> = Result<T, StagingError>;
