//! Checksum primitives for mvr.
//!
//! Maven clients publish a checksum file beside every uploaded file
//! (`foo.jar.sha1`, `maven-metadata.xml.md5`, ...). This crate names the
//! supported algorithms, computes hex digests and normalizes checksum file
//! bodies for comparison.
//!
//! All digests wrap the RustCrypto implementations; no custom cryptography.

pub mod checksum;

pub use checksum::{normalize_checksum, ChecksumAlgorithm, ChecksumError};
