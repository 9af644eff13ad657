//! Upload staging for the mvr repository.
//!
//! A deploy is a series of independent PUTs. Until the checksum gate commits
//! them, uploaded files live under the staging root, invisible to readers:
//!
//! ```text
//! .upload/{group as path}/{artifact}/{version}/{file}
//! .upload/{group as path}/{artifact}/{version}/meta/maven-metadata.xml[.{alg}]
//! ```
//!
//! # Key Types
//!
//! - [`StagingArea`] -- writes staged files and routes candidate metadata
//! - [`StagingLocation`] -- one package version inside the staging area

pub mod area;
pub mod error;
pub mod location;

pub use area::StagingArea;
pub use error::{StagingError, StagingResult};
pub use location::{package_prefix, StagingLocation, META_DIR};
