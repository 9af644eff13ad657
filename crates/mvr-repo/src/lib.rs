//! The mvr repository facade.
//!
//! [`Repository`] is the single entry point behind the HTTP surface. Reads
//! resolve through the resolution bridge. Uploads are classified by path:
//!
//! | Path | Handling |
//! |---|---|
//! | `{group}/{artifact}/maven-metadata.xml` | staged as a candidate, routed to its version |
//! | `{group}/{artifact}/maven-metadata.xml.{md5,sha1,sha256,sha512}` | checksum gate, commit once ready and valid |
//! | anything else | staged under `.upload` as is |
//!
//! Every failure is one of the [`RepositoryError`] kinds, each with a fixed
//! HTTP status.

pub mod error;
pub mod repository;
pub mod request;

pub use error::{RepositoryError, RepositoryResult};
pub use repository::{PutOutcome, Repository};
pub use request::PutTarget;
