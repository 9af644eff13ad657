use mvr_deploy::DeployError;
use mvr_gate::GateError;
use mvr_metadata::MetadataError;
use mvr_resolve::ResolveError;
use mvr_staging::StagingError;
use mvr_store::StoreError;
use mvr_types::CoordinateError;
use thiserror::Error;

/// Every way a repository request can fail.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Malformed path, coordinate or metadata document.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("not found: {path}")]
    NotFound { path: String },

    /// No staged candidate matches a submitted checksum. Nothing was written.
    #[error("checksum mismatch: {0}")]
    ChecksumMismatch(String),

    /// The staged upload failed validation. Staging is left as it was.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl RepositoryError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Parse(_) | Self::ChecksumMismatch(_) | Self::Validation(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Storage(_) => 500,
        }
    }
}

impl From<CoordinateError> for RepositoryError {
    fn from(e: CoordinateError) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<MetadataError> for RepositoryError {
    fn from(e: MetadataError) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<StoreError> for RepositoryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidKey { .. } => Self::Parse(e.to_string()),
            _ => Self::Storage(e.to_string()),
        }
    }
}

impl From<StagingError> for RepositoryError {
    fn from(e: StagingError) -> Self {
        match e {
            StagingError::Store(e) => e.into(),
            StagingError::Metadata(e) => e.into(),
            StagingError::InvalidPath(_) | StagingError::InvalidVersion(_) => {
                Self::Parse(e.to_string())
            }
        }
    }
}

impl From<GateError> for RepositoryError {
    fn from(e: GateError) -> Self {
        match e {
            GateError::ChecksumMismatch { .. } => Self::ChecksumMismatch(e.to_string()),
            GateError::StageError { .. } => Self::Validation(e.to_string()),
            GateError::Staging(e) => e.into(),
            GateError::Store(e) => e.into(),
        }
    }
}

impl From<DeployError> for RepositoryError {
    fn from(e: DeployError) -> Self {
        match e {
            DeployError::NotStaged(_) | DeployError::InvalidVersion(_) => {
                Self::Validation(e.to_string())
            }
            DeployError::Metadata(e) => e.into(),
            DeployError::Staging(e) => e.into(),
            DeployError::Store(e) => e.into(),
        }
    }
}

impl From<ResolveError> for RepositoryError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::NotFound { path } => Self::NotFound { path },
            other => Self::Storage(other.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use mvr_crypto::ChecksumAlgorithm;

    #[test]
    fn status_codes() {
        assert_eq!(RepositoryError::Parse("x".into()).status_code(), 400);
        assert_eq!(
            RepositoryError::NotFound { path: "a/b".into() }.status_code(),
            404
        );
        assert_eq!(RepositoryError::Storage("disk".into()).status_code(), 500);
    }

    #[test]
    fn gate_errors_keep_their_kind() {
        let mismatch: RepositoryError = GateError::ChecksumMismatch {
            package: "g:a".into(),
            algorithm: ChecksumAlgorithm::Sha1,
        }
        .into();
        assert!(matches!(mismatch, RepositoryError::ChecksumMismatch(_)));

        let io: RepositoryError =
            GateError::Store(StoreError::Io(std::io::Error::other("disk full"))).into();
        assert_eq!(io.status_code(), 500);
    }
}
