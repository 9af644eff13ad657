use std::collections::BTreeSet;
use std::sync::Arc;

use bytes::Bytes;
use mvr_metadata::DeployMetadata;
use mvr_store::{Key, Storage};
use mvr_types::{MetadataCoordinate, METADATA_FILE, STAGING_ROOT};

use crate::error::{StagingError, StagingResult};
use crate::location::{package_prefix, StagingLocation, META_DIR};

/// The staging area of one repository.
///
/// Every operation is a pure function of currently visible staged state, so
/// concurrent uploads need no coordination here.
#[derive(Clone)]
pub struct StagingArea {
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for StagingArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagingArea").finish_non_exhaustive()
    }
}

impl StagingArea {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Write `content` under the staging root at the same relative `path`.
    /// Re-uploads overwrite.
    pub async fn stage(&self, path: &str, content: Bytes) -> StagingResult<Key> {
        let key = Key::new(STAGING_ROOT)
            .and_then(|root| root.join(path))
            .map_err(|e| StagingError::InvalidPath(e.to_string()))?;
        if key.parent().map_or(true, |p| p.is_root()) {
            return Err(StagingError::InvalidPath(path.to_string()));
        }
        let size = content.len();
        self.storage.save(&key, content).await?;
        tracing::debug!(key = %key, size, "staged upload");
        Ok(key)
    }

    /// Stage a candidate `maven-metadata.xml` for `package`.
    ///
    /// The candidate goes to the meta location of the first snapshot it lists
    /// that already has files staged; otherwise to its release version.
    pub async fn stage_metadata(
        &self,
        package: &MetadataCoordinate,
        xml: Bytes,
    ) -> StagingResult<StagingLocation> {
        let candidate = DeployMetadata::parse(&xml)?;
        let staged = self.staged_versions(package).await?;

        let snapshot = candidate
            .snapshots()
            .into_iter()
            .find(|v| staged.contains(*v));
        let version = match snapshot {
            Some(v) => v,
            None => candidate.release()?,
        };

        let location = StagingLocation::new(package.document(), version)?;
        let key = location.candidate_key()?;
        self.storage.save(&key, xml).await?;
        tracing::debug!(
            package = %package,
            version = %location.version(),
            snapshot = snapshot.is_some(),
            "staged candidate metadata"
        );
        Ok(location)
    }

    /// Version subkeys holding at least one staged file outside `meta`.
    pub async fn staged_versions(
        &self,
        package: &MetadataCoordinate,
    ) -> StagingResult<BTreeSet<String>> {
        let prefix = package_prefix(package)?;
        let mut versions = BTreeSet::new();
        for key in self.storage.list(&prefix).await? {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            let mut parts = rest.split('/');
            if let (Some(version), Some(next)) = (parts.next(), parts.next()) {
                if next != META_DIR {
                    versions.insert(version.to_string());
                }
            }
        }
        Ok(versions)
    }

    /// Every staged candidate metadata document of `package`, ordered by
    /// version subkey.
    pub async fn candidates(
        &self,
        package: &MetadataCoordinate,
    ) -> StagingResult<Vec<StagingLocation>> {
        let prefix = package_prefix(package)?;
        let mut versions = BTreeSet::new();
        for key in self.storage.list(&prefix).await? {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            let parts: Vec<&str> = rest.split('/').collect();
            if let [version, META_DIR, METADATA_FILE] = parts.as_slice() {
                versions.insert(version.to_string());
            }
        }
        versions
            .iter()
            .map(|v| StagingLocation::new(package.document(), v))
            .collect()
    }

    /// Every staged key of `location`, candidate metadata included.
    pub async fn files(&self, location: &StagingLocation) -> StagingResult<Vec<Key>> {
        Ok(self.storage.list(location.prefix()).await?)
    }

    pub async fn read(&self, key: &Key) -> StagingResult<Bytes> {
        Ok(self.storage.value(key).await?)
    }

    pub async fn write(&self, key: &Key, content: Bytes) -> StagingResult<()> {
        Ok(self.storage.save(key, content).await?)
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }
}
