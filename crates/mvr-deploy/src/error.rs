use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployError {
    /// No candidate metadata is staged at the location, typically because a
    /// concurrent request already committed it.
    #[error("nothing staged at {0}")]
    NotStaged(String),

    #[error("invalid version: {0:?}")]
    InvalidVersion(String),

    #[error("metadata error: {0}")]
    Metadata(#[from] mvr_metadata::MetadataError),

    #[error("staging error: {0}")]
    Staging(#[from] mvr_staging::StagingError),

    #[error("store error: {0}")]
    Store(#[from] mvr_store::StoreError),
}

pub type DeployResult<T> = Result<T, DeployError>;
