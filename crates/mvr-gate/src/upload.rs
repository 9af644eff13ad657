use std::collections::{BTreeMap, BTreeSet};

use bytes::Bytes;
use mvr_crypto::ChecksumAlgorithm;
use mvr_staging::{StagingArea, StagingError, StagingLocation};
use mvr_store::{Key, StoreError};

use crate::error::GateResult;
use crate::record::ChecksumRecord;

/// Point-in-time copy of everything staged for one version.
///
/// Gathered once per gate decision so every stage sees the same state.
#[derive(Clone, Debug)]
pub struct StagedUpload {
    pub location: StagingLocation,
    pub candidate_key: Key,
    pub files: BTreeMap<Key, Bytes>,
}

impl StagedUpload {
    /// Read every staged key of `location`. Keys deleted between listing and
    /// reading are skipped.
    pub async fn gather(staging: &StagingArea, location: &StagingLocation) -> GateResult<Self> {
        let mut files = BTreeMap::new();
        for key in staging.files(location).await? {
            match staging.read(&key).await {
                Ok(content) => {
                    files.insert(key, content);
                }
                Err(StagingError::Store(StoreError::NotFound(_))) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(Self {
            location: location.clone(),
            candidate_key: location.candidate_key()?,
            files,
        })
    }

    /// The staged candidate metadata, if present.
    pub fn candidate(&self) -> Option<&Bytes> {
        self.files.get(&self.candidate_key)
    }

    /// Every staged checksum file whose covered content is also staged.
    pub fn records(&self) -> Vec<ChecksumRecord> {
        self.files
            .iter()
            .filter_map(|(key, body)| {
                let (content, algorithm) = ChecksumAlgorithm::split_sibling(key.as_str())?;
                let content = Key::new(content).ok()?;
                if !self.files.contains_key(&content) {
                    return None;
                }
                let body = String::from_utf8_lossy(body);
                Some(ChecksumRecord::new(algorithm, &body, key.clone(), content))
            })
            .collect()
    }

    /// Algorithms with a staged checksum file for `content`.
    pub fn algorithms_for(&self, content: &Key) -> BTreeSet<ChecksumAlgorithm> {
        ChecksumAlgorithm::ALL
            .into_iter()
            .filter(|alg| {
                Key::new(&alg.sibling(content.as_str()))
                    .is_ok_and(|key| self.files.contains_key(&key))
            })
            .collect()
    }

    /// Staged files outside `meta` that are not checksums of another staged
    /// file.
    pub fn artifacts(&self) -> Vec<&Key> {
        self.files
            .keys()
            .filter(|key| !self.location.is_meta(key))
            .filter(|key| !self.is_checksum(key))
            .collect()
    }

    /// Candidate and at least one artifact carry checksums for the same,
    /// non-empty set of algorithms.
    pub fn is_ready(&self) -> bool {
        if self.candidate().is_none() {
            return false;
        }
        let expected = self.algorithms_for(&self.candidate_key);
        if expected.is_empty() {
            return false;
        }
        self.artifacts()
            .into_iter()
            .any(|artifact| self.algorithms_for(artifact) == expected)
    }

    fn is_checksum(&self, key: &Key) -> bool {
        ChecksumAlgorithm::split_sibling(key.as_str())
            .and_then(|(content, _)| Key::new(content).ok())
            .is_some_and(|content| self.files.contains_key(&content))
    }
}
