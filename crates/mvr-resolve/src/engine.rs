use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use mvr_store::{Key, Storage, StoreError};
use mvr_types::{ArtifactCoordinate, MetadataCoordinate, STAGING_ROOT};

use crate::error::ResolveResult;

/// Fetches single repository files by coordinate.
///
/// `Ok(None)` means the engine looked and found nothing.
#[async_trait]
pub trait ResolutionEngine: Send + Sync + 'static {
    /// The exact artifact file, with no transitive resolution.
    async fn artifact(&self, coordinate: &ArtifactCoordinate) -> ResolveResult<Option<Bytes>>;

    /// The package's release-or-snapshot metadata document, or one of its
    /// checksum files.
    async fn metadata(&self, coordinate: &MetadataCoordinate) -> ResolveResult<Option<Bytes>>;
}

/// Engine whose only transport is the repository's own storage.
///
/// Staged uploads are never visible through it.
#[derive(Clone)]
pub struct StorageEngine {
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine").finish_non_exhaustive()
    }
}

impl StorageEngine {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    async fn fetch(&self, path: &str) -> ResolveResult<Option<Bytes>> {
        let key = Key::new(path)?;
        if key.parts().next() == Some(STAGING_ROOT) {
            return Ok(None);
        }
        match self.storage.value(&key).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ResolutionEngine for StorageEngine {
    async fn artifact(&self, coordinate: &ArtifactCoordinate) -> ResolveResult<Option<Bytes>> {
        self.fetch(&coordinate.path()).await
    }

    async fn metadata(&self, coordinate: &MetadataCoordinate) -> ResolveResult<Option<Bytes>> {
        self.fetch(&coordinate.path()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvr_store::InMemoryStorage;

    #[tokio::test]
    async fn serves_durable_files_only() {
        let storage = Arc::new(InMemoryStorage::new());
        storage
            .save(
                &Key::new("com/example/abc/1.0/abc-1.0.jar").unwrap(),
                Bytes::from_static(b"jar"),
            )
            .await
            .unwrap();
        let engine = StorageEngine::new(storage);

        let hit = ArtifactCoordinate::from_path("com/example/abc/1.0/abc-1.0.jar").unwrap();
        assert_eq!(
            engine.artifact(&hit).await.unwrap(),
            Some(Bytes::from_static(b"jar"))
        );

        let miss = ArtifactCoordinate::from_path("com/example/abc/2.0/abc-2.0.jar").unwrap();
        assert_eq!(engine.artifact(&miss).await.unwrap(), None);

        let meta = MetadataCoordinate::new("com.example", "abc").unwrap();
        assert_eq!(engine.metadata(&meta).await.unwrap(), None);
    }
}
