use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A song-lyrics document.
///
/// `id` is the application-level key used in URLs. The store-assigned `_id`
/// is read back from the database but never serialized, so it neither leaks
/// into API responses nor gets sent on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    #[serde(rename = "_id", default, skip_serializing)]
    pub object_id: Option<ObjectId>,
    pub id: i64,
    pub title: String,
    pub lyrics: String,
}

impl Song {
    pub fn new(id: i64, title: impl Into<String>, lyrics: impl Into<String>) -> Self {
        Self {
            object_id: None,
            id,
            title: title.into(),
            lyrics: lyrics.into(),
        }
    }

    /// Whether applying `fields` would leave this song unchanged.
    pub fn matches_fields(&self, fields: &SongFields) -> bool {
        self.title == fields.title && self.lyrics == fields.lyrics
    }
}

/// The mutable part of a song, written together by an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongFields {
    pub title: String,
    pub lyrics: String,
}
