use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use mvr_repo::Repository;

/// mvr repository server.
pub struct MvrServer {
    config: ServerConfig,
    repo: Repository,
}

impl MvrServer {
    /// Open the configured storage backend.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let storage = config.storage.open()?;
        Ok(Self {
            repo: Repository::new(storage),
            config,
        })
    }

    pub fn with_repository(config: ServerConfig, repo: Repository) -> Self {
        Self { config, repo }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.repo.clone(), self.config.max_upload_size)
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            storage = ?self.config.storage,
            "mvr server listening on {}",
            self.config.bind_addr
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;

    #[test]
    fn server_construction() {
        let server = MvrServer::new(ServerConfig::default()).unwrap();
        assert_eq!(server.config().bind_addr, "127.0.0.1:8080".parse().unwrap());
        let _router = server.router();
    }

    #[test]
    fn filesystem_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            storage: StorageConfig::Filesystem {
                root: dir.path().join("repo"),
            },
            ..ServerConfig::default()
        };
        MvrServer::new(config).unwrap();
    }
}
