use mvr_crypto::{normalize_checksum, ChecksumAlgorithm};
use mvr_store::Key;
use serde::{Deserialize, Serialize};

/// A staged checksum file, paired with the key of the content it covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChecksumRecord {
    pub algorithm: ChecksumAlgorithm,
    /// Normalized digest, or `None` when the file holds no hex token.
    pub hex: Option<String>,
    /// The checksum file itself.
    pub key: Key,
    /// The content it was computed over.
    pub content: Key,
}

impl ChecksumRecord {
    pub fn new(algorithm: ChecksumAlgorithm, body: &str, key: Key, content: Key) -> Self {
        Self {
            algorithm,
            hex: normalize_checksum(body),
            key,
            content,
        }
    }

    /// Recompute the digest of `content` and compare.
    pub fn verify(&self, content: &[u8]) -> bool {
        self.hex
            .as_deref()
            .is_some_and(|hex| self.algorithm.verify(content, hex))
    }
}

/// Derived, never persisted, per-version upload state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadReadiness {
    /// Checksums are still missing on the candidate or on every artifact.
    Incomplete,
    /// Candidate and an artifact carry checksums for the same algorithms.
    ReadyToValidate,
    /// Nothing staged remains and the package metadata lists the version.
    Committed,
}

impl std::fmt::Display for UploadReadiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Incomplete => "incomplete",
            Self::ReadyToValidate => "ready_to_validate",
            Self::Committed => "committed",
        })
    }
}
