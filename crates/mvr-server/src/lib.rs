//! HTTP server for mvr.
//!
//! Serves a [`mvr_repo::Repository`] with the URL layout Maven clients
//! expect: GET/HEAD to download, PUT to deploy.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::{ServerConfig, StorageConfig};
pub use error::{ServerError, ServerResult};
pub use handler::COMMITTED_HEADER;
pub use server::MvrServer;
