use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mvr_store::{FileStorage, InMemoryStorage, Storage};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageConfig,
    /// Largest accepted request body, in bytes.
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            storage: StorageConfig::Memory,
            max_upload_size: 256 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}

/// Where the repository keeps its files.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    #[default]
    Memory,
    Filesystem { root: PathBuf },
}

impl StorageConfig {
    pub fn open(&self) -> ServerResult<Arc<dyn Storage>> {
        Ok(match self {
            Self::Memory => Arc::new(InMemoryStorage::new()),
            Self::Filesystem { root } => Arc::new(FileStorage::open(root.clone())?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(c.storage, StorageConfig::Memory);
        assert_eq!(c.max_upload_size, 256 * 1024 * 1024);
    }

    #[test]
    fn parses_filesystem_backend() {
        let c = ServerConfig::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:9000"
            max_upload_size = 1024

            [storage]
            backend = "filesystem"
            root = "/var/lib/mvr"
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 9000);
        assert_eq!(c.max_upload_size, 1024);
        assert_eq!(
            c.storage,
            StorageConfig::Filesystem {
                root: PathBuf::from("/var/lib/mvr")
            }
        );
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(ServerConfig::from_toml_str("").unwrap(), ServerConfig::default());
    }

    #[test]
    fn unknown_backend_is_config_error() {
        let err = ServerConfig::from_toml_str("[storage]\nbackend = \"s3\"\n").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn opens_filesystem_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageConfig::Filesystem {
            root: dir.path().to_path_buf(),
        };
        storage.open().unwrap();
    }
}
