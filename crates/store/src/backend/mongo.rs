//! MongoDB backend for the song collection.
//!
//! Each [`SongStore`] method maps onto one driver call. The driver owns
//! connection pooling, so a single [`MongoStore`] is shared by every request.
//!
//! Seeding also creates a unique index on `id`; once it exists the server
//! rejects a second document with the same key, and that write error is
//! surfaced as [`StoreError::DuplicateKey`].

use crate::{
    DeleteOutcome, Filter, InsertOutcome, Song, SongFields, SongStore, StoreError, UpdateOutcome,
};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::error::{Error as DriverError, ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};

/// Server error code for a unique-index violation.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB backend bound to one collection.
pub struct MongoStore {
    client: Client,
    collection: Collection<Song>,
}

impl MongoStore {
    /// Create a client for `uri` and bind it to `database.collection`.
    ///
    /// The driver connects lazily, so authentication problems only show up on
    /// the first command; call [`SongStore::ping`] to surface them early.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let collection = client.database(database).collection::<Song>(collection);

        tracing::debug!(database, collection = collection.name(), "mongodb client created");
        Ok(Self { client, collection })
    }

    async fn ensure_unique_id_index(&self) -> Result<(), StoreError> {
        let index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection
            .create_index(index)
            .await
            .map_err(backend_error)?;
        Ok(())
    }
}

fn backend_error(err: DriverError) -> StoreError {
    StoreError::backend(err.to_string())
}

fn is_duplicate_key(err: &DriverError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

#[async_trait]
impl SongStore for MongoStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn seed_collection(&self, songs: Vec<Song>) -> Result<(), StoreError> {
        self.collection.drop().await.map_err(backend_error)?;

        let total = songs.len();
        if !songs.is_empty() {
            self.collection
                .insert_many(songs)
                .await
                .map_err(backend_error)?;
        }
        self.ensure_unique_id_index().await?;

        tracing::info!(
            collection = self.collection.name(),
            songs = total,
            "collection seeded"
        );
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Song>, StoreError> {
        let cursor = self
            .collection
            .find(Filter::All.to_document())
            .await
            .map_err(backend_error)?;
        cursor.try_collect().await.map_err(backend_error)
    }

    async fn find_one(&self, filter: Filter) -> Result<Option<Song>, StoreError> {
        self.collection
            .find_one(filter.to_document())
            .await
            .map_err(backend_error)
    }

    async fn insert_one(&self, song: &Song) -> Result<InsertOutcome, StoreError> {
        let result = self.collection.insert_one(song).await.map_err(|e| {
            if is_duplicate_key(&e) {
                StoreError::DuplicateKey(song.id)
            } else {
                backend_error(e)
            }
        })?;

        let inserted_id = match result.inserted_id.as_object_id() {
            Some(oid) => oid.to_hex(),
            None => result.inserted_id.to_string(),
        };
        Ok(InsertOutcome { inserted_id })
    }

    async fn update_one(
        &self,
        filter: Filter,
        fields: &SongFields,
    ) -> Result<UpdateOutcome, StoreError> {
        let update = doc! {
            "$set": {
                "title": fields.title.as_str(),
                "lyrics": fields.lyrics.as_str(),
            }
        };
        let result = self
            .collection
            .update_one(filter.to_document(), update)
            .await
            .map_err(backend_error)?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_one(&self, filter: Filter) -> Result<DeleteOutcome, StoreError> {
        let result = self
            .collection
            .delete_one(filter.to_document())
            .await
            .map_err(backend_error)?;
        Ok(DeleteOutcome {
            deleted: result.deleted_count,
        })
    }

    async fn count_all(&self) -> Result<u64, StoreError> {
        self.collection
            .count_documents(Filter::All.to_document())
            .await
            .map_err(backend_error)
    }
}
