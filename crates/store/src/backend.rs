use crate::{MongoSettings, Song, SongFields, StoreError};
use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Document};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Query shape understood by every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Matches every document.
    All,
    /// Matches documents whose application `id` equals the value.
    ById(i64),
}

impl Filter {
    /// The equivalent MongoDB filter document.
    pub fn to_document(self) -> Document {
        match self {
            Filter::All => doc! {},
            Filter::ById(id) => doc! { "id": id },
        }
    }

    pub fn matches(&self, song: &Song) -> bool {
        match self {
            Filter::All => true,
            Filter::ById(id) => song.id == *id,
        }
    }
}

/// Acknowledgment of a single-document insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Store-assigned identifier, rendered as a string (hex for ObjectIds).
    pub inserted_id: String,
}

/// Acknowledgment of a single-document update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

/// Acknowledgment of a single-document delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteOutcome {
    pub deleted: u64,
}

/// Collection-level operations over the song collection.
///
/// Every method is a thin pass-through to the underlying store and reports
/// store-native acknowledgments. Implementations must be shareable across
/// concurrent requests; the service holds one handle for its whole lifetime.
#[async_trait]
pub trait SongStore: Send + Sync {
    /// Issue a lightweight liveness command.
    async fn ping(&self) -> Result<(), StoreError>;
    /// Drop the collection and insert `songs` in its place. Destructive.
    async fn seed_collection(&self, songs: Vec<Song>) -> Result<(), StoreError>;
    /// Every document, in store order.
    async fn find_all(&self) -> Result<Vec<Song>, StoreError>;
    /// The first document matching `filter`.
    async fn find_one(&self, filter: Filter) -> Result<Option<Song>, StoreError>;
    async fn insert_one(&self, song: &Song) -> Result<InsertOutcome, StoreError>;
    /// `$set` title and lyrics on the first document matching `filter`.
    async fn update_one(
        &self,
        filter: Filter,
        fields: &SongFields,
    ) -> Result<UpdateOutcome, StoreError>;
    async fn delete_one(&self, filter: Filter) -> Result<DeleteOutcome, StoreError>;
    async fn count_all(&self) -> Result<u64, StoreError>;
}

/// Configuration for selecting and building a store backend.
///
/// # Example
/// ```
/// use store::{MongoSettings, StoreConfig};
///
/// // In-memory (for testing)
/// let config = StoreConfig::in_memory();
///
/// // MongoDB
/// let config = StoreConfig::mongodb(MongoSettings::new("localhost:27017"), "songs", "songs");
/// ```
#[derive(Clone, Debug, Default)]
pub enum StoreConfig {
    /// A MongoDB collection. Requires the `backend-mongodb` feature.
    MongoDb {
        settings: MongoSettings,
        database: String,
        collection: String,
    },
    /// A process-local store, useful for tests and demos.
    #[default]
    InMemory,
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        StoreConfig::InMemory
    }

    pub fn mongodb(
        settings: MongoSettings,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        StoreConfig::MongoDb {
            settings,
            database: database.into(),
            collection: collection.into(),
        }
    }

    /// Build the configured backend.
    pub async fn connect(&self) -> Result<Arc<dyn SongStore>, StoreError> {
        match self {
            StoreConfig::InMemory => Ok(Arc::new(InMemoryStore::new())),
            StoreConfig::MongoDb {
                settings,
                database,
                collection,
            } => {
                tracing::info!(
                    uri = %settings.redacted(),
                    database = %database,
                    collection = %collection,
                    "connecting to mongodb"
                );
                #[cfg(feature = "backend-mongodb")]
                {
                    let store =
                        MongoStore::connect(&settings.connection_string(), database, collection)
                            .await?;
                    Ok(Arc::new(store))
                }
                #[cfg(not(feature = "backend-mongodb"))]
                {
                    let _ = (settings, database, collection);
                    Err(StoreError::Connection(
                        "mongodb backend disabled at compile time".into(),
                    ))
                }
            }
        }
    }
}

/// An in-memory backend using a `RwLock` around a `Vec`.
///
/// Mirrors the MongoDB backend as seen through [`SongStore`]: documents get a
/// fresh ObjectId on insert, updates that change nothing report
/// `modified == 0`, and a second document with an existing `id` is rejected
/// the way a unique index would reject it.
pub struct InMemoryStore {
    songs: RwLock<Vec<Song>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            songs: RwLock::new(Vec::new()),
        }
    }

    fn poisoned() -> StoreError {
        StoreError::backend("poisoned lock")
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SongStore for InMemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.songs.read().map_err(|_| Self::poisoned())?;
        Ok(())
    }

    async fn seed_collection(&self, songs: Vec<Song>) -> Result<(), StoreError> {
        let mut seen = HashSet::with_capacity(songs.len());
        if let Some(song) = songs.iter().find(|song| !seen.insert(song.id)) {
            return Err(StoreError::DuplicateKey(song.id));
        }

        let mut guard = self.songs.write().map_err(|_| Self::poisoned())?;
        *guard = songs
            .into_iter()
            .map(|mut song| {
                song.object_id = Some(ObjectId::new());
                song
            })
            .collect();
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Song>, StoreError> {
        let guard = self.songs.read().map_err(|_| Self::poisoned())?;
        Ok(guard.clone())
    }

    async fn find_one(&self, filter: Filter) -> Result<Option<Song>, StoreError> {
        let guard = self.songs.read().map_err(|_| Self::poisoned())?;
        Ok(guard.iter().find(|song| filter.matches(song)).cloned())
    }

    async fn insert_one(&self, song: &Song) -> Result<InsertOutcome, StoreError> {
        let mut guard = self.songs.write().map_err(|_| Self::poisoned())?;
        if guard.iter().any(|existing| existing.id == song.id) {
            return Err(StoreError::DuplicateKey(song.id));
        }

        let object_id = ObjectId::new();
        let mut stored = song.clone();
        stored.object_id = Some(object_id);
        guard.push(stored);

        Ok(InsertOutcome {
            inserted_id: object_id.to_hex(),
        })
    }

    async fn update_one(
        &self,
        filter: Filter,
        fields: &SongFields,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut guard = self.songs.write().map_err(|_| Self::poisoned())?;
        let Some(song) = guard.iter_mut().find(|song| filter.matches(song)) else {
            return Ok(UpdateOutcome::default());
        };

        if song.matches_fields(fields) {
            return Ok(UpdateOutcome {
                matched: 1,
                modified: 0,
            });
        }

        song.title.clone_from(&fields.title);
        song.lyrics.clone_from(&fields.lyrics);
        Ok(UpdateOutcome {
            matched: 1,
            modified: 1,
        })
    }

    async fn delete_one(&self, filter: Filter) -> Result<DeleteOutcome, StoreError> {
        let mut guard = self.songs.write().map_err(|_| Self::poisoned())?;
        match guard.iter().position(|song| filter.matches(song)) {
            Some(index) => {
                guard.remove(index);
                Ok(DeleteOutcome { deleted: 1 })
            }
            None => Ok(DeleteOutcome::default()),
        }
    }

    async fn count_all(&self) -> Result<u64, StoreError> {
        let guard = self.songs.read().map_err(|_| Self::poisoned())?;
        Ok(guard.len() as u64)
    }
}

/// The MongoDB backend implementation.
#[cfg(feature = "backend-mongodb")]
pub mod mongo;

#[cfg(feature = "backend-mongodb")]
pub use mongo::MongoStore;
