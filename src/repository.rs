//! Song-level operations over a [`SongStore`].
//!
//! Every operation is one store round trip, except `create` (existence check,
//! then insert) and a successful `update` (write, then re-read). The
//! check-then-insert in `create` is not atomic; a store that enforces a unique
//! `id` rejects the losing insert with [`StoreError::DuplicateKey`], which is
//! reported as [`CreateOutcome::Duplicate`] like the pre-check.

use std::sync::Arc;

use serde::Deserialize;
use store::{Filter, Song, SongFields, SongStore, StoreError};
use thiserror::Error;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Failures that are not part of an operation's normal outcomes.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Input is missing a required field. Never reaches the store.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A song as submitted by a client; every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SongDraft {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub lyrics: Option<String>,
}

impl SongDraft {
    pub fn new(id: i64, title: impl Into<String>, lyrics: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            title: Some(title.into()),
            lyrics: Some(lyrics.into()),
        }
    }

    fn fields(&self, mut missing: Vec<&'static str>) -> RepositoryResult<SongFields> {
        match (&self.title, &self.lyrics) {
            (Some(title), Some(lyrics)) if missing.is_empty() => Ok(SongFields {
                title: title.clone(),
                lyrics: lyrics.clone(),
            }),
            (title, lyrics) => {
                if title.is_none() {
                    missing.push("title");
                }
                if lyrics.is_none() {
                    missing.push("lyrics");
                }
                Err(RepositoryError::Validation(format!(
                    "missing required field(s): {}",
                    missing.join(", ")
                )))
            }
        }
    }

    /// Check that `id`, `title` and `lyrics` are all present.
    pub fn into_song(self) -> RepositoryResult<Song> {
        let missing = if self.id.is_none() { vec!["id"] } else { vec![] };
        let fields = self.fields(missing)?;
        let id = self.id.ok_or_else(|| RepositoryError::Validation("missing id".into()))?;
        Ok(Song::new(id, fields.title, fields.lyrics))
    }

    /// Check that `title` and `lyrics` are present; `id` is ignored.
    pub fn into_fields(self) -> RepositoryResult<SongFields> {
        self.fields(Vec::new())
    }
}

/// Result of [`SongRepository::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created { inserted_id: String },
    /// A song with this `id` already exists; nothing was written.
    Duplicate { id: i64 },
}

/// Result of [`SongRepository::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResult {
    /// The song after the update.
    Updated(Song),
    /// The song exists but already had these values.
    Unchanged,
    NotFound,
}

/// Result of [`SongRepository::delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteResult {
    Deleted,
    NotFound,
}

/// Domain operations on the song collection.
#[derive(Clone)]
pub struct SongRepository {
    store: Arc<dyn SongStore>,
}

impl SongRepository {
    pub fn new(store: Arc<dyn SongStore>) -> Self {
        Self { store }
    }

    pub async fn ping(&self) -> RepositoryResult<()> {
        Ok(self.store.ping().await?)
    }

    /// Replace the whole collection with `songs`.
    pub async fn reseed(&self, songs: Vec<Song>) -> RepositoryResult<()> {
        Ok(self.store.seed_collection(songs).await?)
    }

    pub async fn get_all(&self) -> RepositoryResult<Vec<Song>> {
        Ok(self.store.find_all().await?)
    }

    pub async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<Song>> {
        Ok(self.store.find_one(Filter::ById(id)).await?)
    }

    pub async fn create(&self, draft: SongDraft) -> RepositoryResult<CreateOutcome> {
        let song = draft.into_song()?;

        if self.store.find_one(Filter::ById(song.id)).await?.is_some() {
            return Ok(CreateOutcome::Duplicate { id: song.id });
        }

        match self.store.insert_one(&song).await {
            Ok(outcome) => Ok(CreateOutcome::Created {
                inserted_id: outcome.inserted_id,
            }),
            Err(StoreError::DuplicateKey(id)) => {
                tracing::warn!(id, "concurrent create lost the race on song id");
                Ok(CreateOutcome::Duplicate { id })
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update(&self, id: i64, draft: SongDraft) -> RepositoryResult<UpdateResult> {
        let fields = draft.into_fields()?;

        let outcome = self.store.update_one(Filter::ById(id), &fields).await?;
        if outcome.matched == 0 {
            return Ok(UpdateResult::NotFound);
        }
        if outcome.modified == 0 {
            return Ok(UpdateResult::Unchanged);
        }

        match self.store.find_one(Filter::ById(id)).await? {
            Some(song) => Ok(UpdateResult::Updated(song)),
            // Deleted between the write and the re-read.
            None => Ok(UpdateResult::NotFound),
        }
    }

    pub async fn delete(&self, id: i64) -> RepositoryResult<DeleteResult> {
        let outcome = self.store.delete_one(Filter::ById(id)).await?;
        if outcome.deleted == 0 {
            Ok(DeleteResult::NotFound)
        } else {
            Ok(DeleteResult::Deleted)
        }
    }

    pub async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.store.count_all().await?)
    }
}
