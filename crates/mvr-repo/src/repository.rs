use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use mvr_crypto::ChecksumAlgorithm;
use mvr_deploy::{CommitPipeline, DeployError};
use mvr_gate::{ChecksumGate, UploadReadiness};
use mvr_resolve::{ResolutionBridge, StorageEngine};
use mvr_staging::{StagingArea, StagingLocation};
use mvr_store::{Key, Storage};
use mvr_types::{Coordinate, MetadataCoordinate};

use crate::error::{RepositoryError, RepositoryResult};
use crate::request::PutTarget;

/// Result of a successful upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PutOutcome {
    /// Bytes written under the staging root.
    Staged { key: String },
    /// A checksum was attached to the candidate of `version`, which is not
    /// yet ready to commit.
    ChecksumAccepted {
        version: String,
        readiness: UploadReadiness,
    },
    /// The upload completed `version` and it is now published.
    Committed { version: String },
}

impl PutOutcome {
    pub fn committed_version(&self) -> Option<&str> {
        match self {
            Self::Committed { version } => Some(version),
            _ => None,
        }
    }
}

/// A Maven-style repository over one [`Storage`].
///
/// Cheap to clone; clones share storage and exclusive sections.
#[derive(Clone)]
pub struct Repository {
    storage: Arc<dyn Storage>,
    staging: StagingArea,
    gate: Arc<ChecksumGate>,
    pipeline: CommitPipeline,
    bridge: ResolutionBridge,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl Repository {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let staging = StagingArea::new(Arc::clone(&storage));
        Self {
            gate: Arc::new(ChecksumGate::with_default_stages(staging.clone())),
            pipeline: CommitPipeline::new(Arc::clone(&storage)),
            bridge: ResolutionBridge::new(Arc::new(StorageEngine::new(Arc::clone(&storage)))),
            staging,
            storage,
        }
    }

    /// Replace the clock stamping `lastUpdated` on commit.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.pipeline = self.pipeline.with_clock(clock);
        self
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Bytes of a published file.
    pub async fn get(&self, path: &str) -> RepositoryResult<Bytes> {
        let coordinate = Coordinate::parse(path)?;
        Ok(self.bridge.resolve(&coordinate).await?)
    }

    /// Handle an upload of `body` to `path`.
    pub async fn put(&self, path: &str, body: Bytes) -> RepositoryResult<PutOutcome> {
        match PutTarget::classify(path)? {
            PutTarget::Artifact { path } => {
                let key = self.staging.stage(&path, body).await?;
                Ok(PutOutcome::Staged {
                    key: key.to_string(),
                })
            }
            PutTarget::Metadata(package) => {
                let location = self.staging.stage_metadata(&package, body).await?;
                let key = location.candidate_key()?;
                Ok(PutOutcome::Staged {
                    key: key.to_string(),
                })
            }
            PutTarget::Checksum { package, algorithm } => {
                self.submit_checksum(&package, algorithm, &body).await
            }
        }
    }

    /// Upload state of one staged version.
    pub async fn readiness(
        &self,
        package: &MetadataCoordinate,
        version: &str,
    ) -> RepositoryResult<UploadReadiness> {
        let location = StagingLocation::new(package.document(), version)?;
        Ok(self.gate.readiness(&location).await?)
    }

    async fn submit_checksum(
        &self,
        package: &MetadataCoordinate,
        algorithm: ChecksumAlgorithm,
        body: &[u8],
    ) -> RepositoryResult<PutOutcome> {
        let body = String::from_utf8_lossy(body);
        let location = self.gate.submit_checksum(package, algorithm, &body).await?;
        let version = location.version().to_string();

        if !self.gate.ready(&location).await? {
            return Ok(PutOutcome::ChecksumAccepted {
                version,
                readiness: UploadReadiness::Incomplete,
            });
        }

        let rejection = match self.gate.validate(&location, package).await {
            Ok(verdict) => verdict
                .reason()
                .map(|reason| RepositoryError::Validation(reason.to_string())),
            Err(e) => Some(e.into()),
        };
        if let Some(err) = rejection {
            // A concurrent commit of the same version may have consumed
            // staging under us. Wait for it, then report its result.
            drop(self.storage.exclusive(&Key::new(&package.package_path())?).await);
            if self.gate.is_committed(&location).await? {
                tracing::debug!(location = %location, "committed by a concurrent upload");
                return Ok(PutOutcome::Committed { version });
            }
            return Err(err);
        }

        match self.pipeline.commit(&location).await {
            Ok(report) => Ok(PutOutcome::Committed {
                version: report.version.to_string(),
            }),
            Err(DeployError::NotStaged(_)) => {
                tracing::debug!(location = %location, "already committed by a concurrent upload");
                Ok(PutOutcome::Committed { version })
            }
            Err(e) => Err(e.into()),
        }
    }
}
