//! Key/value storage for the mvr repository.
//!
//! Everything the repository persists, durable files and staged uploads
//! alike, lives in a [`Storage`] keyed by `/`-separated [`Key`]s. The crate
//! ships two backends:
//!
//! - [`InMemoryStorage`] -- `BTreeMap`-based store for tests and embedding
//! - [`FileStorage`] -- one file per key under a root directory
//!
//! # Design Rules
//!
//! 1. Keys are normalized on construction; `.`/`..` and empty parts never
//!    reach a backend.
//! 2. `save` replaces the whole value. Readers observe either the old or the
//!    new bytes, never a mix.
//! 3. `list` is recursive, component-wise and sorted.
//! 4. `exclusive` serializes critical sections per key within one process.

pub mod error;
pub mod fs;
pub mod key;
pub mod lock;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FileStorage;
pub use key::Key;
pub use lock::{ExclusiveGuard, KeyedLocks};
pub use memory::InMemoryStorage;
pub use traits::Storage;
