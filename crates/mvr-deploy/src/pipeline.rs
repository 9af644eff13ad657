use std::collections::BTreeSet;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use mvr_crypto::ChecksumAlgorithm;
use mvr_metadata::{merge, previous_release, DeployMetadata, MavenMetadata, MergeInput};
use mvr_staging::{StagingArea, StagingLocation};
use mvr_store::{Key, Storage, StoreError};
use mvr_types::{MetadataCoordinate, Version, METADATA_FILE};

use crate::error::{DeployError, DeployResult};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// What a commit published.
#[derive(Clone, Debug)]
pub struct CommitReport {
    pub package: MetadataCoordinate,
    pub version: Version,
    /// The merged document now at `{package}/maven-metadata.xml`.
    pub metadata: MavenMetadata,
    /// Durable keys written, in copy order.
    pub published: Vec<Key>,
    /// Staged keys that could not be deleted.
    pub cleanup_failures: Vec<Key>,
}

/// Merges and publishes staged versions.
#[derive(Clone)]
pub struct CommitPipeline {
    storage: Arc<dyn Storage>,
    staging: StagingArea,
    clock: Clock,
}

impl std::fmt::Debug for CommitPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitPipeline").finish_non_exhaustive()
    }
}

impl CommitPipeline {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            staging: StagingArea::new(Arc::clone(&storage)),
            storage,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the `lastUpdated` time source.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Publish the version staged at `location`.
    ///
    /// The caller has already established readiness and validity. Commits of
    /// the same package are serialized; other packages proceed in parallel.
    pub async fn commit(&self, location: &StagingLocation) -> DeployResult<CommitReport> {
        let package = location.package().clone();
        let package_key = Key::new(&package.package_path())?;
        let _guard = self.storage.exclusive(&package_key).await;
        tracing::info!(location = %location, "commit started");

        let candidate_key = location.candidate_key()?;
        let candidate = match self.storage.value(&candidate_key).await {
            Ok(bytes) => DeployMetadata::parse(&bytes)?,
            Err(StoreError::NotFound(_)) => return Err(DeployError::NotStaged(location.to_string())),
            Err(e) => return Err(e.into()),
        };
        let version = Version::parse(location.version())
            .map_err(|_| DeployError::InvalidVersion(location.version().to_string()))?;

        let published = self.published_versions(&package_key).await?;
        let metadata_key = package_key.join(METADATA_FILE)?;
        let durable = self.durable_metadata(&metadata_key).await?;
        let merged = merge(
            MergeInput {
                group_id: package.group_id(),
                artifact_id: package.artifact_id(),
                published: &published,
                new_version: &version,
                previous_release: previous_release(durable.as_ref(), &candidate, &published, &version),
            },
            (self.clock)(),
        );

        // Overwrite the candidate and its checksums in staging.
        let xml = Bytes::from(merged.to_xml()?);
        self.storage.save(&candidate_key, xml.clone()).await?;
        for algorithm in ChecksumAlgorithm::ALL {
            let key = Key::new(&algorithm.sibling(candidate_key.as_str()))?;
            self.storage
                .save(&key, Bytes::from(algorithm.digest_hex(&xml)))
                .await?;
        }

        // Artifacts before metadata: a listed version always has its files.
        let mut published_keys = Vec::new();
        let staged = self.staging.files(location).await?;
        for key in staged.iter().filter(|k| !location.is_meta(k)) {
            if let Some(target) = location.published_key(key)? {
                self.storage.copy(key, &target).await?;
                published_keys.push(target);
            }
        }
        self.storage.copy(&candidate_key, &metadata_key).await?;
        published_keys.push(metadata_key.clone());
        for algorithm in ChecksumAlgorithm::ALL {
            let from = Key::new(&algorithm.sibling(candidate_key.as_str()))?;
            let to = Key::new(&algorithm.sibling(metadata_key.as_str()))?;
            self.storage.copy(&from, &to).await?;
            published_keys.push(to);
        }

        let cleanup_failures = self.cleanup(location).await;
        tracing::info!(
            location = %location,
            files = published_keys.len(),
            versions = merged.versions().len(),
            "commit finished"
        );
        Ok(CommitReport {
            package,
            version,
            metadata: merged,
            published: published_keys,
            cleanup_failures,
        })
    }

    /// Names of the version directories under the package.
    ///
    /// A version directory holds at least one artifact file directly and is
    /// named like a version. Nested packages (`{package}/{sub}/{version}/..`)
    /// only hold their own metadata directly and are skipped.
    async fn published_versions(&self, package_key: &Key) -> DeployResult<Vec<String>> {
        let mut versions = BTreeSet::new();
        for key in self.storage.list(package_key).await? {
            let Some(rest) = key.strip_prefix(package_key) else {
                continue;
            };
            let Some((dir, file)) = rest.split_once('/') else {
                continue;
            };
            if file.contains('/') || file.starts_with(METADATA_FILE) {
                continue;
            }
            if Version::is_valid(dir) {
                versions.insert(dir.to_string());
            }
        }
        Ok(versions.into_iter().collect())
    }

    async fn durable_metadata(&self, key: &Key) -> DeployResult<Option<MavenMetadata>> {
        match self.storage.value(key).await {
            Ok(bytes) => match MavenMetadata::from_xml(&bytes) {
                Ok(doc) => Ok(Some(doc)),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "ignoring unreadable published metadata");
                    Ok(None)
                }
            },
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete everything under the version's staging prefix. Failures are
    /// logged and returned, never retried.
    async fn cleanup(&self, location: &StagingLocation) -> Vec<Key> {
        let keys = match self.storage.list(location.prefix()).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(location = %location, error = %e, "cannot list staged files for cleanup");
                return Vec::new();
            }
        };
        let mut failures = Vec::new();
        for key in keys {
            if let Err(e) = self.storage.delete(&key).await {
                tracing::warn!(key = %key, error = %e, "failed to delete staged file");
                failures.push(key);
            }
        }
        failures
    }
}
