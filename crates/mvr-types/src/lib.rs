//! Foundation types for mvr, a Maven-style repository server.
//!
//! This crate provides the coordinate model shared by every other mvr crate:
//! how repository files are named, how a request path maps to a coordinate,
//! and what counts as a well-formed version string.
//!
//! # Key Types
//!
//! - [`ArtifactCoordinate`] -- `group:artifact:extension[:classifier]:version`
//! - [`MetadataCoordinate`] -- the per-package `maven-metadata.xml`
//! - [`Coordinate`] -- tagged sum of the two, discriminated by file name
//! - [`Version`] -- syntactically validated version with Maven-like ordering

pub mod coordinate;
pub mod error;
pub mod version;

pub use coordinate::{
    ArtifactCoordinate, Coordinate, MetadataCoordinate, CHECKSUM_EXTENSIONS, METADATA_FILE,
    STAGING_ROOT,
};
pub use error::CoordinateError;
pub use version::Version;
