/// Application context and dependency injection
use crate::{
    config::ServerConfig,
    error::MockResult,
    persistence::{FileSnapshotBackend, MemorySnapshotBackend, SnapshotBackend},
    store::SharedStore,
};
use std::sync::Arc;
use tracing::info;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub store: Arc<SharedStore>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> MockResult<Self> {
        config.validate()?;

        let backend: Arc<dyn SnapshotBackend> = match &config.storage.data_path {
            Some(path) => {
                info!(path = %path.display(), "Using file snapshot storage");
                Arc::new(FileSnapshotBackend::new(
                    path.clone(),
                    config.storage.write_timeout(),
                ))
            }
            None => {
                info!("No data path configured, state is kept in memory only");
                Arc::new(MemorySnapshotBackend::default())
            }
        };

        Self::with_backend(config, backend).await
    }

    /// Create a context over an explicit snapshot backend
    pub async fn with_backend(
        config: ServerConfig,
        backend: Arc<dyn SnapshotBackend>,
    ) -> MockResult<Self> {
        let store = SharedStore::open(backend).await?;

        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(store),
        })
    }

    /// Get the service URL
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}{}",
            self.config.service.hostname, self.config.service.port, self.config.service.base_path
        )
    }
}
