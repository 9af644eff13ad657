use std::fmt;

use mvr_store::Key;
use mvr_types::{MetadataCoordinate, METADATA_FILE, STAGING_ROOT};

use crate::error::{StagingError, StagingResult};

/// Reserved sub-key holding a version's candidate metadata.
pub const META_DIR: &str = "meta";

/// `.upload/{group as path}/{artifact}`
pub fn package_prefix(package: &MetadataCoordinate) -> StagingResult<Key> {
    Key::new(STAGING_ROOT)
        .and_then(|root| root.join(&package.package_path()))
        .map_err(|e| StagingError::InvalidPath(e.to_string()))
}

/// One package version inside the staging area.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StagingLocation {
    package: MetadataCoordinate,
    version: String,
    prefix: Key,
}

impl StagingLocation {
    /// `version` must be a single key part.
    pub fn new(package: MetadataCoordinate, version: &str) -> StagingResult<Self> {
        if version.contains('/') || version.trim().is_empty() {
            return Err(StagingError::InvalidVersion(version.to_string()));
        }
        let prefix = package_prefix(&package)?
            .join(version)
            .map_err(|_| StagingError::InvalidVersion(version.to_string()))?;
        Ok(Self {
            package: package.document(),
            version: version.to_string(),
            prefix,
        })
    }

    pub fn package(&self) -> &MetadataCoordinate {
        &self.package
    }

    /// The version subkey, as staged. Not necessarily a valid version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// `.upload/{package}/{version}`
    pub fn prefix(&self) -> &Key {
        &self.prefix
    }

    /// `.upload/{package}/{version}/meta`
    pub fn meta_prefix(&self) -> StagingResult<Key> {
        self.prefix
            .join(META_DIR)
            .map_err(|e| StagingError::InvalidPath(e.to_string()))
    }

    /// `.upload/{package}/{version}/meta/maven-metadata.xml`
    pub fn candidate_key(&self) -> StagingResult<Key> {
        self.meta_prefix()?
            .join(METADATA_FILE)
            .map_err(|e| StagingError::InvalidPath(e.to_string()))
    }

    /// Returns `true` if `key` lies in this version's meta sub-key.
    pub fn is_meta(&self, key: &Key) -> bool {
        key.strip_prefix(&self.prefix)
            .and_then(|rest| rest.split('/').next())
            .is_some_and(|first| first == META_DIR)
    }

    /// Where a staged file lands once published: the path below the
    /// version prefix, re-rooted at `{package}/{version}`.
    pub fn published_key(&self, staged: &Key) -> StagingResult<Option<Key>> {
        let Some(rest) = staged.strip_prefix(&self.prefix).filter(|r| !r.is_empty()) else {
            return Ok(None);
        };
        Key::new(&self.package.package_path())
            .and_then(|k| k.join(&self.version))
            .and_then(|k| k.join(rest))
            .map(Some)
            .map_err(|e| StagingError::InvalidPath(e.to_string()))
    }
}

impl fmt::Display for StagingLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.package, self.version)
    }
}
