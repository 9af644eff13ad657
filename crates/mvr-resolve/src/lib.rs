//! Read side of the mvr repository.
//!
//! Lookups go through a [`ResolutionEngine`], the minimal capability of
//! fetching one artifact file or one metadata document. No dependency graph
//! is walked. [`StorageEngine`] answers from the repository's own storage;
//! [`ResolutionBridge`] turns every miss or engine failure into
//! [`ResolveError::NotFound`] carrying the requested path.

pub mod bridge;
pub mod engine;
pub mod error;

pub use bridge::ResolutionBridge;
pub use engine::{ResolutionEngine, StorageEngine};
pub use error::{ResolveError, ResolveResult};
