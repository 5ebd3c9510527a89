//! Startup seed data.
//!
//! The seed file is a JSON array of `{ "id", "title", "lyrics" }` records. It
//! is read once at startup and handed to
//! [`SongStore::seed_collection`](crate::SongStore::seed_collection); nothing
//! keeps it afterwards.

use std::fs;
use std::path::Path;

use store::Song;
use thiserror::Error;

/// Errors that can occur while loading the seed file.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read and parse the seed file at `path`.
pub fn load_seed_file(path: impl AsRef<Path>) -> Result<Vec<Song>, SeedError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let songs: Vec<Song> = serde_json::from_str(&raw)?;
    tracing::debug!(path = %path.display(), songs = songs.len(), "seed file loaded");
    Ok(songs)
}
