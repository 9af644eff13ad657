//! Commit pipeline for the mvr repository.
//!
//! Publishes one staged version of a package. Under the package's exclusive
//! section the pipeline:
//!
//! 1. lists the versions already published,
//! 2. merges them with the staged version into a new `maven-metadata.xml`,
//! 3. overwrites the staged candidate with it and regenerates its checksums,
//! 4. copies the staged files, then the metadata, into the durable layout,
//! 5. deletes the version's staging prefix, best-effort.
//!
//! A failure before step 4 leaves the repository unchanged. A failure during
//! step 4 can leave some of the version's files published.

pub mod error;
pub mod pipeline;

pub use error::{DeployError, DeployResult};
pub use pipeline::{CommitPipeline, CommitReport};
