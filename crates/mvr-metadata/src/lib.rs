//! Package metadata for the mvr repository.
//!
//! Every package carries one `maven-metadata.xml` listing its published
//! versions. Deploys upload a candidate document next to their files; at
//! commit the candidate is reconciled with what is already published:
//!
//! - [`MavenMetadata`] -- the XML document model
//! - [`DeployMetadata`] -- read-only view of an uploaded candidate
//! - [`merge`] -- computes the document to publish

pub mod deploy;
pub mod document;
pub mod error;
pub mod merge;

pub use deploy::DeployMetadata;
pub use document::{MavenMetadata, Versioning, Versions};
pub use error::{MetadataError, MetadataResult};
pub use merge::{format_last_updated, merge, previous_release, MergeInput};
