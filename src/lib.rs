//! Domain layer for the songbook service.
//!
//! This crate sits between the HTTP handlers and the document store. It
//! re-exports the store model and exposes [`SongRepository`], which expresses
//! every API operation in terms of songs and hides query shapes and the
//! duplicate-key check from callers.

pub mod repository;
pub mod seed;

pub use repository::{
    CreateOutcome, DeleteResult, RepositoryError, RepositoryResult, SongDraft, SongRepository,
    UpdateResult,
};
pub use seed::{load_seed_file, SeedError};
pub use store::{
    DeleteOutcome, Filter, InMemoryStore, InsertOutcome, MongoSettings, Song, SongFields,
    SongStore, StoreConfig, StoreError, UpdateOutcome,
};
