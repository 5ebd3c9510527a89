use crate::error::{ServerError, ServerResult};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use store::{MongoSettings, StoreConfig};

/// Which store backend the server talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    MongoDb,
    Memory,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Metrics endpoint enabled
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Store backend
    #[serde(default)]
    pub backend: StoreBackend,

    /// MongoDB database name
    #[serde(default = "default_songs")]
    pub database: String,

    /// MongoDB collection name
    #[serde(default = "default_songs")]
    pub collection: String,

    /// JSON file the collection is seeded from
    #[serde(default = "default_seed_path")]
    pub seed_path: String,

    /// Replace the collection with the seed file on startup
    #[serde(default = "default_true")]
    pub seed_on_startup: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            metrics_enabled: default_true(),
            backend: StoreBackend::default(),
            database: default_songs(),
            collection: default_songs(),
            seed_path: default_seed_path(),
            seed_on_startup: default_true(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config files
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("server").required(false))
            // Override with environment variables
            .add_source(config::Environment::with_prefix("SONGS_SERVER").separator("__"));

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }

    /// Resolve the store backend, reading `MONGODB_*` from the process
    /// environment when MongoDB is selected.
    pub fn store_config(&self) -> ServerResult<StoreConfig> {
        self.store_config_from(config::Environment::with_prefix("MONGODB"))
    }

    pub(crate) fn store_config_from(
        &self,
        env: config::Environment,
    ) -> ServerResult<StoreConfig> {
        match self.backend {
            StoreBackend::Memory => Ok(StoreConfig::in_memory()),
            StoreBackend::MongoDb => {
                let settings = mongo_settings(env)?;
                Ok(StoreConfig::mongodb(
                    settings,
                    self.database.clone(),
                    self.collection.clone(),
                ))
            }
        }
    }
}

/// Connection parameters as they appear in the environment.
#[derive(Debug, Default, Deserialize)]
struct MongoEnv {
    #[serde(default)]
    service: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    port: Option<u16>,
}

fn mongo_settings(env: config::Environment) -> ServerResult<MongoSettings> {
    let raw: MongoEnv = config::Config::builder()
        .add_source(env)
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(|e| ServerError::Config(format!("Invalid MongoDB settings: {e}")))?;

    let service = raw
        .service
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            ServerError::Config("Missing MongoDB server in the MONGODB_SERVICE variable".into())
        })?;

    Ok(MongoSettings {
        service,
        username: raw.username,
        password: raw.password,
        port: raw.port,
    })
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_mb() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_songs() -> String {
    "songs".to_string()
}

fn default_seed_path() -> String {
    "data/songs.json".to_string()
}
