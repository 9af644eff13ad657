use std::sync::Arc;

use bytes::Bytes;
use mvr_types::Coordinate;

use crate::engine::ResolutionEngine;
use crate::error::{ResolveError, ResolveResult};

/// Dispatches a parsed coordinate to the engine.
#[derive(Clone)]
pub struct ResolutionBridge {
    engine: Arc<dyn ResolutionEngine>,
}

impl std::fmt::Debug for ResolutionBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionBridge").finish_non_exhaustive()
    }
}

impl ResolutionBridge {
    pub fn new(engine: Arc<dyn ResolutionEngine>) -> Self {
        Self { engine }
    }

    /// Bytes of the file addressed by `coordinate`.
    ///
    /// Fails with [`ResolveError::NotFound`] when the engine finds nothing
    /// and also when it fails.
    pub async fn resolve(&self, coordinate: &Coordinate) -> ResolveResult<Bytes> {
        tracing::debug!(coordinate = %coordinate, "resolving");
        let result = match coordinate {
            Coordinate::Artifact(artifact) => self.engine.artifact(artifact).await,
            Coordinate::Metadata(metadata) => self.engine.metadata(metadata).await,
        };
        let path = coordinate.path();
        match result {
            Ok(Some(bytes)) => Ok(bytes),
            Ok(None) => {
                tracing::debug!(path = %path, "no result");
                Err(ResolveError::NotFound { path })
            }
            Err(e) => {
                tracing::info!(path = %path, error = %e, "resolution failed");
                Err(ResolveError::NotFound { path })
            }
        }
    }
}
