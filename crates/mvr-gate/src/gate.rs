use std::time::{Duration, Instant};

use bytes::Bytes;
use mvr_crypto::{normalize_checksum, ChecksumAlgorithm};
use mvr_metadata::MavenMetadata;
use mvr_staging::{StagingArea, StagingError, StagingLocation};
use mvr_store::{Key, StoreError};
use mvr_types::MetadataCoordinate;

use crate::error::{GateError, GateResult};
use crate::record::UploadReadiness;
use crate::stage::{GateContext, GateStage, StageDecision, StageResult};
use crate::stages::{ChecksumStage, CoordinateStage, VersionStage};
use crate::upload::StagedUpload;

// ---------------------------------------------------------------------------
// GateVerdict
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Accepted,
    Rejected { reason: String },
}

/// The outcome of running a staged upload through the validation pipeline.
#[derive(Clone, Debug)]
pub struct GateVerdict {
    pub decision: Decision,
    /// Per-stage results in evaluation order.
    pub stage_results: Vec<StageResult>,
    pub elapsed: Duration,
}

impl GateVerdict {
    pub fn is_accepted(&self) -> bool {
        self.decision == Decision::Accepted
    }

    /// Why the upload was rejected, if it was.
    pub fn reason(&self) -> Option<&str> {
        match &self.decision {
            Decision::Accepted => None,
            Decision::Rejected { reason } => Some(reason),
        }
    }
}

// ---------------------------------------------------------------------------
// ChecksumGate
// ---------------------------------------------------------------------------

/// Matches metadata checksums to staged candidates and decides when a staged
/// version may be committed.
///
/// Nothing here takes a lock: every operation reads the staged state as it
/// is, so retries and interleavings short of the commit are harmless.
pub struct ChecksumGate {
    staging: StagingArea,
    stages: Vec<Box<dyn GateStage>>,
}

impl std::fmt::Debug for ChecksumGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChecksumGate")
            .field("stages", &self.stages.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl ChecksumGate {
    /// A gate with an empty validation pipeline.
    pub fn new(staging: StagingArea) -> Self {
        Self {
            staging,
            stages: Vec::new(),
        }
    }

    /// The standard pipeline: Checksum -> Coordinate -> Version
    pub fn with_default_stages(staging: StagingArea) -> Self {
        let mut gate = Self::new(staging);
        gate.add_stage(Box::new(ChecksumStage));
        gate.add_stage(Box::new(CoordinateStage));
        gate.add_stage(Box::new(VersionStage));
        gate
    }

    pub fn add_stage(&mut self, stage: Box<dyn GateStage>) {
        self.stages.push(stage);
    }


    /// Attach a checksum of the package metadata to the staged candidate it
    /// matches.
    ///
    /// Candidates are tried in version-subkey order and the first match
    /// wins. Without a match nothing is written.
    pub async fn submit_checksum(
        &self,
        package: &MetadataCoordinate,
        algorithm: ChecksumAlgorithm,
        body: &str,
    ) -> GateResult<StagingLocation> {
        let mismatch = || GateError::ChecksumMismatch {
            package: package.to_string(),
            algorithm,
        };
        let hex = normalize_checksum(body).ok_or_else(mismatch)?;

        for location in self.staging.candidates(package).await? {
            let key = location.candidate_key()?;
            let candidate = match self.staging.read(&key).await {
                Ok(bytes) => bytes,
                Err(StagingError::Store(StoreError::NotFound(_))) => continue,
                Err(e) => return Err(e.into()),
            };
            if algorithm.digest_hex(&candidate) != hex {
                continue;
            }
            let checksum_key = checksum_key(&key, algorithm)?;
            self.staging.write(&checksum_key, Bytes::from(hex)).await?;
            tracing::debug!(location = %location, %algorithm, "checksum matched staged metadata");
            return Ok(location);
        }

        tracing::info!(package = %package, %algorithm, "checksum matches no staged metadata");
        Err(mismatch())
    }

    /// See [`StagedUpload::is_ready`].
    pub async fn ready(&self, location: &StagingLocation) -> GateResult<bool> {
        Ok(StagedUpload::gather(&self.staging, location).await?.is_ready())
    }

    pub async fn readiness(&self, location: &StagingLocation) -> GateResult<UploadReadiness> {
        let upload = StagedUpload::gather(&self.staging, location).await?;
        if upload.is_ready() {
            return Ok(UploadReadiness::ReadyToValidate);
        }
        if upload.files.is_empty() && self.is_published(location).await? {
            return Ok(UploadReadiness::Committed);
        }
        Ok(UploadReadiness::Incomplete)
    }

    /// Run the validation pipeline over the staged state of `location`.
    ///
    /// Fail-fast: the first failing stage rejects. Rejection leaves staging
    /// untouched.
    pub async fn validate(
        &self,
        location: &StagingLocation,
        package: &MetadataCoordinate,
    ) -> GateResult<GateVerdict> {
        let upload = StagedUpload::gather(&self.staging, location).await?;
        let verdict = self.evaluate(&upload, package)?;
        match verdict.reason() {
            None => tracing::debug!(location = %location, "staged upload valid"),
            Some(reason) => tracing::info!(location = %location, reason, "staged upload rejected"),
        }
        Ok(verdict)
    }

    /// Evaluate an already gathered snapshot.
    pub fn evaluate(
        &self,
        upload: &StagedUpload,
        package: &MetadataCoordinate,
    ) -> GateResult<GateVerdict> {
        let pipeline_start = Instant::now();
        let context = GateContext::new(package.document());
        let mut stage_results = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let stage_start = Instant::now();
            let decision = stage.evaluate(upload, &context)?;
            let result = StageResult {
                stage_name: stage.name().to_string(),
                passed: decision.is_pass(),
                reason: match &decision {
                    StageDecision::Pass => None,
                    StageDecision::Fail { reason } => Some(reason.clone()),
                },
                elapsed: stage_start.elapsed(),
            };
            stage_results.push(result);

            if let StageDecision::Fail { reason } = decision {
                return Ok(GateVerdict {
                    decision: Decision::Rejected {
                        reason: format!("{}: {reason}", stage.name()),
                    },
                    stage_results,
                    elapsed: pipeline_start.elapsed(),
                });
            }
        }

        Ok(GateVerdict {
            decision: Decision::Accepted,
            stage_results,
            elapsed: pipeline_start.elapsed(),
        })
    }

    /// `true` once a commit has consumed the candidate of `location` and
    /// published its version. Stray staged checksums are ignored.
    pub async fn is_committed(&self, location: &StagingLocation) -> GateResult<bool> {
        match self.staging.read(&location.candidate_key()?).await {
            Ok(_) => Ok(false),
            Err(StagingError::Store(StoreError::NotFound(_))) => self.is_published(location).await,
            Err(e) => Err(e.into()),
        }
    }

    async fn is_published(&self, location: &StagingLocation) -> GateResult<bool> {
        let key = Key::new(&location.package().path())?;
        let bytes = match self.staging.storage().value(&key).await {
            Ok(bytes) => bytes,
            Err(StoreError::NotFound(_)) => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        Ok(MavenMetadata::from_xml(&bytes)
            .map(|doc| doc.versions().contains(&location.version()))
            .unwrap_or(false))
    }
}

fn checksum_key(content: &Key, algorithm: ChecksumAlgorithm) -> GateResult<Key> {
    Ok(Key::new(&algorithm.sibling(content.as_str()))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvr_store::{InMemoryStorage, Storage};
    use std::sync::Arc;

    const META_1: &str = "<metadata><groupId>com.example</groupId><artifactId>abc</artifactId>\
        <versioning><release>1.0</release><versions><version>1.0</version></versions></versioning></metadata>";
    const META_2: &str = "<metadata><groupId>com.example</groupId><artifactId>abc</artifactId>\
        <versioning><release>2.0</release><versions><version>2.0</version></versions></versioning></metadata>";

    struct Fixture {
        storage: Arc<InMemoryStorage>,
        staging: StagingArea,
        gate: ChecksumGate,
    }

    fn fixture() -> Fixture {
        let storage = Arc::new(InMemoryStorage::new());
        let staging = StagingArea::new(storage.clone());
        let gate = ChecksumGate::with_default_stages(staging.clone());
        Fixture {
            storage,
            staging,
            gate,
        }
    }

    fn pkg() -> MetadataCoordinate {
        MetadataCoordinate::new("com.example", "abc").unwrap()
    }

    fn hex(alg: ChecksumAlgorithm, data: &[u8]) -> String {
        alg.digest_hex(data)
    }

    /// Stage a jar with md5+sha1 checksums and a candidate for `version`.
    async fn stage_version(f: &Fixture, version: &str, meta: &str) -> StagingLocation {
        let jar = format!("com/example/abc/{version}/abc-{version}.jar");
        f.staging.stage(&jar, Bytes::from_static(b"jar")).await.unwrap();
        for alg in [ChecksumAlgorithm::Md5, ChecksumAlgorithm::Sha1] {
            f.staging
                .stage(&alg.sibling(&jar), Bytes::from(hex(alg, b"jar")))
                .await
                .unwrap();
        }
        f.staging
            .stage_metadata(&pkg(), Bytes::from(meta.to_string()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn mismatch_writes_nothing() {
        let f = fixture();
        stage_version(&f, "1.0", META_1).await;
        let before = f.storage.keys();
        let err = f
            .gate
            .submit_checksum(&pkg(), ChecksumAlgorithm::Md5, &hex(ChecksumAlgorithm::Md5, b"other"))
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::ChecksumMismatch { .. }));
        assert_eq!(f.storage.keys(), before);
    }

    #[tokio::test]
    async fn garbage_checksum_is_a_mismatch() {
        let f = fixture();
        stage_version(&f, "1.0", META_1).await;
        let err = f
            .gate
            .submit_checksum(&pkg(), ChecksumAlgorithm::Sha1, "not a checksum")
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::ChecksumMismatch { .. }));
    }

    #[tokio::test]
    async fn checksum_selects_matching_candidate() {
        let f = fixture();
        stage_version(&f, "1.0", META_1).await;
        stage_version(&f, "2.0", META_2).await;
        let sha1 = hex(ChecksumAlgorithm::Sha1, META_2.as_bytes());
        let loc = f
            .gate
            .submit_checksum(&pkg(), ChecksumAlgorithm::Sha1, &format!("{}  maven-metadata.xml", sha1.to_uppercase()))
            .await
            .unwrap();
        assert_eq!(loc.version(), "2.0");
        let key = Key::new(".upload/com/example/abc/2.0/meta/maven-metadata.xml.sha1").unwrap();
        assert_eq!(f.storage.value(&key).await.unwrap(), Bytes::from(sha1));
    }

    #[tokio::test]
    async fn identical_candidates_resolve_deterministically() {
        let f = fixture();
        for version in ["2.0", "1.0"] {
            let loc = StagingLocation::new(pkg(), version).unwrap();
            f.staging
                .write(&loc.candidate_key().unwrap(), Bytes::from_static(META_1.as_bytes()))
                .await
                .unwrap();
        }
        let md5 = hex(ChecksumAlgorithm::Md5, META_1.as_bytes());
        for _ in 0..3 {
            let loc = f.gate.submit_checksum(&pkg(), ChecksumAlgorithm::Md5, &md5).await.unwrap();
            assert_eq!(loc.version(), "1.0");
        }
    }

    #[tokio::test]
    async fn readiness_follows_checksums() {
        let f = fixture();
        let loc = stage_version(&f, "1.0", META_1).await;
        assert_eq!(f.gate.readiness(&loc).await.unwrap(), UploadReadiness::Incomplete);

        let md5 = hex(ChecksumAlgorithm::Md5, META_1.as_bytes());
        f.gate.submit_checksum(&pkg(), ChecksumAlgorithm::Md5, &md5).await.unwrap();
        assert!(!f.gate.ready(&loc).await.unwrap());

        let sha1 = hex(ChecksumAlgorithm::Sha1, META_1.as_bytes());
        f.gate.submit_checksum(&pkg(), ChecksumAlgorithm::Sha1, &sha1).await.unwrap();
        assert!(f.gate.ready(&loc).await.unwrap());
        assert_eq!(f.gate.readiness(&loc).await.unwrap(), UploadReadiness::ReadyToValidate);
        // Stable for a fixed staged state.
        assert!(f.gate.ready(&loc).await.unwrap());
    }

    #[tokio::test]
    async fn readiness_committed_after_publish() {
        let f = fixture();
        let loc = StagingLocation::new(pkg(), "1.0").unwrap();
        assert_eq!(f.gate.readiness(&loc).await.unwrap(), UploadReadiness::Incomplete);
        let published = Key::new("com/example/abc/maven-metadata.xml").unwrap();
        f.storage.save(&published, Bytes::from_static(META_1.as_bytes())).await.unwrap();
        assert_eq!(f.gate.readiness(&loc).await.unwrap(), UploadReadiness::Committed);
    }

    #[tokio::test]
    async fn committed_only_once_candidate_is_consumed() {
        let f = fixture();
        let loc = stage_version(&f, "1.0", META_1).await;
        let published = Key::new("com/example/abc/maven-metadata.xml").unwrap();
        f.storage.save(&published, Bytes::from_static(META_1.as_bytes())).await.unwrap();
        assert!(!f.gate.is_committed(&loc).await.unwrap());

        f.storage.delete(&loc.candidate_key().unwrap()).await.unwrap();
        // A late checksum left behind does not hide the commit.
        let stray = Key::new(".upload/com/example/abc/1.0/meta/maven-metadata.xml.sha1").unwrap();
        f.storage.save(&stray, Bytes::from_static(b"00")).await.unwrap();
        assert!(f.gate.is_committed(&loc).await.unwrap());

        let other = StagingLocation::new(pkg(), "2.0").unwrap();
        assert!(!f.gate.is_committed(&other).await.unwrap());
    }

    async fn submit_both(f: &Fixture, meta: &str) {
        for alg in [ChecksumAlgorithm::Md5, ChecksumAlgorithm::Sha1] {
            f.gate
                .submit_checksum(&pkg(), alg, &hex(alg, meta.as_bytes()))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn valid_upload_is_accepted() {
        let f = fixture();
        let loc = stage_version(&f, "1.0", META_1).await;
        submit_both(&f, META_1).await;
        let verdict = f.gate.validate(&loc, &pkg()).await.unwrap();
        assert!(verdict.is_accepted(), "{:?}", verdict.reason());
        assert_eq!(verdict.stage_results.len(), 3);
        assert!(verdict.stage_results.iter().all(|r| r.passed));
    }

    #[tokio::test]
    async fn corrupted_artifact_is_rejected() {
        let f = fixture();
        let loc = stage_version(&f, "1.0", META_1).await;
        submit_both(&f, META_1).await;
        f.staging
            .stage("com/example/abc/1.0/abc-1.0.jar", Bytes::from_static(b"tampered"))
            .await
            .unwrap();
        let verdict = f.gate.validate(&loc, &pkg()).await.unwrap();
        assert!(!verdict.is_accepted());
        assert!(verdict.reason().unwrap().starts_with("checksum"));
    }

    #[tokio::test]
    async fn foreign_package_is_rejected() {
        let f = fixture();
        let loc = stage_version(&f, "1.0", META_1).await;
        submit_both(&f, META_1).await;
        let other = MetadataCoordinate::new("com.example", "other").unwrap();
        let verdict = f.gate.validate(&loc, &other).await.unwrap();
        assert!(verdict.reason().unwrap().starts_with("coordinate"));
        assert_eq!(verdict.stage_results.len(), 2);
    }

    #[tokio::test]
    async fn malformed_version_is_rejected() {
        let f = fixture();
        let meta = META_1.replace("1.0", "1 0");
        let loc = stage_version(&f, "1 0", &meta).await;
        assert_eq!(loc.version(), "1 0");
        let verdict = f.gate.validate(&loc, &pkg()).await.unwrap();
        assert!(verdict.reason().unwrap().starts_with("version"));
    }
}
