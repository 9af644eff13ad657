use mvr_crypto::ChecksumAlgorithm;
use mvr_staging::StagingError;
use mvr_store::StoreError;

/// Errors from checksum gate operations.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// No staged candidate metadata has the submitted digest.
    #[error("no staged metadata of {package} matches the submitted {algorithm} checksum")]
    ChecksumMismatch {
        package: String,
        algorithm: ChecksumAlgorithm,
    },

    /// A stage returned an unexpected error.
    #[error("stage error in '{stage}': {message}")]
    StageError { stage: String, message: String },

    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl GateError {
    /// Create a stage error with a name and message.
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StageError {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

/// Convenience alias for gate results.
pub type GateResult<T> = Result<T, GateError>;
