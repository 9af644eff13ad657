use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::Digest;

/// A checksum algorithm a client may publish beside a repository file.
///
/// The file extension doubles as the algorithm's wire name
/// (`maven-metadata.xml.sha256`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl ChecksumAlgorithm {
    /// Every supported algorithm, in the order checksums are regenerated.
    pub const ALL: [Self; 4] = [Self::Md5, Self::Sha1, Self::Sha256, Self::Sha512];

    /// The checksum file extension (`md5`, `sha1`, ...).
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Look up an algorithm by its file extension. Case-sensitive.
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|alg| alg.extension() == ext)
    }

    /// Lower-case hex digest of `data`.
    pub fn digest_hex(self, data: &[u8]) -> String {
        match self {
            Self::Md5 => hex::encode(md5::Md5::digest(data)),
            Self::Sha1 => hex::encode(sha1::Sha1::digest(data)),
            Self::Sha256 => hex::encode(sha2::Sha256::digest(data)),
            Self::Sha512 => hex::encode(sha2::Sha512::digest(data)),
        }
    }

    /// Returns `true` if the checksum file body `expected` matches `data`.
    pub fn verify(self, data: &[u8], expected: &str) -> bool {
        normalize_checksum(expected).is_some_and(|hex| hex == self.digest_hex(data))
    }

    /// `{path}.{extension}`
    pub fn sibling(self, path: &str) -> String {
        format!("{path}.{}", self.extension())
    }

    /// Split a checksum file path into the path it covers and its algorithm.
    ///
    /// ```
    /// use mvr_crypto::ChecksumAlgorithm;
    ///
    /// let (content, alg) = ChecksumAlgorithm::split_sibling("a/b-1.jar.sha1").unwrap();
    /// assert_eq!(content, "a/b-1.jar");
    /// assert_eq!(alg, ChecksumAlgorithm::Sha1);
    /// assert!(ChecksumAlgorithm::split_sibling("a/b-1.jar").is_none());
    /// ```
    pub fn split_sibling(path: &str) -> Option<(&str, Self)> {
        let (content, ext) = path.rsplit_once('.')?;
        if content.is_empty() || content.ends_with('/') {
            return None;
        }
        Self::from_extension(ext).map(|alg| (content, alg))
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = ChecksumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| ChecksumError::UnknownAlgorithm(s.to_string()))
    }
}

/// Normalize a checksum file body: the first whitespace-delimited token,
/// lower-cased. Tools such as `sha1sum` append the file name after the
/// digest. Returns `None` when no hex token is present.
pub fn normalize_checksum(body: &str) -> Option<String> {
    let token = body.split_whitespace().next()?;
    if !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some(token.to_ascii_lowercase())
}

/// Errors from checksum operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChecksumError {
    #[error("unsupported checksum algorithm: {0}")]
    UnknownAlgorithm(String),
}
