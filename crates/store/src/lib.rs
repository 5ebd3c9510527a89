//! # Songbook Store
//!
//! Data-store adapter for the songbook service. It owns the [`Song`] document
//! model and exposes collection-level operations through the [`SongStore`]
//! trait, so the layers above never talk to a database driver directly.
//!
//! ## Backends
//!
//! - [`MongoStore`]: the production backend, a thin pass-through to a MongoDB
//!   collection (enabled by the default `backend-mongodb` feature).
//! - [`InMemoryStore`]: a `RwLock<Vec<Song>>` with the same observable
//!   semantics, used in tests and for local runs without a database.
//!
//! Backends are selected at runtime through [`StoreConfig`]:
//!
//! ```
//! use store::{Filter, Song, SongStore, StoreConfig};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = StoreConfig::in_memory().connect().await.unwrap();
//! store.seed_collection(vec![Song::new(1, "Intro", "la la la")]).await.unwrap();
//!
//! let song = store.find_one(Filter::ById(1)).await.unwrap();
//! assert_eq!(song.map(|s| s.title), Some("Intro".to_string()));
//! # }
//! ```

mod backend;
mod model;
mod settings;

#[cfg(feature = "backend-mongodb")]
pub use backend::MongoStore;
pub use backend::{
    DeleteOutcome, Filter, InMemoryStore, InsertOutcome, SongStore, StoreConfig, UpdateOutcome,
};
pub use model::{Song, SongFields};
pub use settings::MongoSettings;

use thiserror::Error;

/// Errors surfaced by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The client could not be created from the connection string.
    #[error("connection error: {0}")]
    Connection(String),
    /// The liveness command failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// A unique-key constraint rejected the write.
    #[error("duplicate key: song id {0} already exists")]
    DuplicateKey(i64),
    /// Any other failure reported by the underlying store.
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        StoreError::Backend(msg.into())
    }
}
