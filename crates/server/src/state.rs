use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use metrics_exporter_prometheus::PrometheusHandle;
use songbook::{load_seed_file, SongRepository, SongStore};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Song repository over the process-wide store handle
    pub repository: SongRepository,

    /// Prometheus handle, present when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    /// Create state around an already-built store.
    pub fn new(config: ServerConfig, store: Arc<dyn SongStore>) -> Self {
        Self {
            config: Arc::new(config),
            repository: SongRepository::new(store),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Build the configured store, verify it answers, and seed it.
    ///
    /// Any failure here is fatal: the server never starts with a store it
    /// cannot reach.
    pub async fn connect(config: ServerConfig) -> ServerResult<Self> {
        let store_config = config.store_config()?;
        let store = store_config
            .connect()
            .await
            .map_err(|e| ServerError::Startup(format!("Unable to connect to song store: {e}")))?;
        Self::connect_with(config, store).await
    }

    /// Startup checks over an already-built store: ping, then seed.
    pub async fn connect_with(
        config: ServerConfig,
        store: Arc<dyn SongStore>,
    ) -> ServerResult<Self> {
        store
            .ping()
            .await
            .map_err(|e| ServerError::Startup(format!("Song store did not answer ping: {e}")))?;
        tracing::info!(backend = ?config.backend, "song store connected");

        let state = Self::new(config, store);
        if state.config.seed_on_startup {
            state.seed().await?;
        } else {
            tracing::info!("seeding disabled, keeping existing collection");
        }
        Ok(state)
    }

    /// Replace the collection with the contents of the seed file.
    pub async fn seed(&self) -> ServerResult<usize> {
        let path = &self.config.seed_path;
        let songs = load_seed_file(path)
            .map_err(|e| ServerError::Startup(format!("Unable to load seed file {path}: {e}")))?;
        let count = songs.len();

        self.repository
            .reseed(songs)
            .await
            .map_err(|e| ServerError::Startup(format!("Unable to seed song collection: {e}")))?;

        tracing::info!(songs = count, path = %path, "song collection seeded");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreBackend;
    use async_trait::async_trait;
    use songbook::{
        DeleteOutcome, Filter, InsertOutcome, Song, SongFields, StoreError, UpdateOutcome,
    };
    use std::io::Write;

    /// A store that never answers.
    struct Unreachable;

    #[async_trait]
    impl SongStore for Unreachable {
        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("authentication failed".into()))
        }
        async fn seed_collection(&self, _songs: Vec<Song>) -> Result<(), StoreError> {
            panic!("seed attempted after failed ping")
        }
        async fn find_all(&self) -> Result<Vec<Song>, StoreError> {
            unreachable!()
        }
        async fn find_one(&self, _filter: Filter) -> Result<Option<Song>, StoreError> {
            unreachable!()
        }
        async fn insert_one(&self, _song: &Song) -> Result<InsertOutcome, StoreError> {
            unreachable!()
        }
        async fn update_one(
            &self,
            _filter: Filter,
            _fields: &SongFields,
        ) -> Result<UpdateOutcome, StoreError> {
            unreachable!()
        }
        async fn delete_one(&self, _filter: Filter) -> Result<DeleteOutcome, StoreError> {
            unreachable!()
        }
        async fn count_all(&self) -> Result<u64, StoreError> {
            unreachable!()
        }
    }

    fn memory_config(seed_path: String) -> ServerConfig {
        ServerConfig {
            backend: StoreBackend::Memory,
            seed_path,
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn connect_seeds_memory_store() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 1, "title": "One", "lyrics": "1"}}, {{"id": 2, "title": "Two", "lyrics": "2"}}]"#
        )
        .unwrap();

        let config = memory_config(file.path().display().to_string());
        let state = ServerState::connect(config).await.unwrap();
        assert_eq!(state.repository.count().await.unwrap(), 2);
        assert!(state.metrics.is_none());
    }

    #[tokio::test]
    async fn missing_seed_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = memory_config(dir.path().join("absent.json").display().to_string());

        let err = ServerState::connect(config).await.err().unwrap();
        assert!(matches!(err, ServerError::Startup(ref msg) if msg.contains("seed file")));
    }

    #[tokio::test]
    async fn failed_ping_is_fatal() {
        let config = memory_config("does-not-matter.json".into());
        let err = ServerState::connect_with(config, Arc::new(Unreachable))
            .await
            .err()
            .unwrap();
        assert!(
            matches!(err, ServerError::Startup(ref msg) if msg.contains("did not answer ping"))
        );
    }

    #[tokio::test]
    async fn seeding_can_be_disabled() {
        let mut config = memory_config("does-not-matter.json".into());
        config.seed_on_startup = false;

        let state = ServerState::connect(config).await.unwrap();
        assert_eq!(state.repository.count().await.unwrap(), 0);
    }
}
