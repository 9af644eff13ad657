/// Errors from reading or writing metadata documents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    #[error("malformed metadata document: {0}")]
    Parse(String),

    #[error("cannot serialize metadata document: {0}")]
    Serialize(String),

    #[error("metadata document has no release version")]
    MissingRelease,
}

/// Result alias for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;
