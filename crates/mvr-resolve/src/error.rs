use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    /// Nothing could be served for this repository path.
    #[error("not found: {path}")]
    NotFound { path: String },

    #[error("resolution engine failed: {0}")]
    Engine(String),

    #[error(transparent)]
    Store(#[from] mvr_store::StoreError),
}

pub type ResolveResult<T> = Result<T, ResolveError>;
