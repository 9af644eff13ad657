use mvr_types::version;

use crate::document::MavenMetadata;
use crate::error::{MetadataError, MetadataResult};

/// A candidate `maven-metadata.xml` uploaded by a deploying client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployMetadata {
    document: MavenMetadata,
}

impl DeployMetadata {
    pub fn parse(bytes: &[u8]) -> MetadataResult<Self> {
        MavenMetadata::from_xml(bytes).map(|document| Self { document })
    }

    pub fn group_id(&self) -> Option<&str> {
        self.document.group_id()
    }

    pub fn artifact_id(&self) -> Option<&str> {
        self.document.artifact_id()
    }

    /// The `versioning/release` value.
    pub fn release(&self) -> MetadataResult<&str> {
        self.document.release().ok_or(MetadataError::MissingRelease)
    }

    /// Every snapshot-qualified version the candidate mentions, in document
    /// order without duplicates: the version list, then `latest`, then the
    /// top-level `version`.
    pub fn snapshots(&self) -> Vec<&str> {
        let mut found: Vec<&str> = Vec::new();
        let listed = self.document.versions().into_iter();
        let extra = [self.document.latest(), self.document.version.as_deref().map(str::trim)];
        for v in listed.chain(extra.into_iter().flatten()) {
            if version::is_snapshot(v) && !found.contains(&v) {
                found.push(v);
            }
        }
        found
    }

    pub fn document(&self) -> &MavenMetadata {
        &self.document
    }
}
