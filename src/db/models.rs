// Data models: Rust structs that map to database rows.
//
// Kept separate from the queries so the pipelines can use them without
// depending on rusqlite directly.

use serde::{Deserialize, Serialize};

/// A collected sticker as stored in the `stickers` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sticker {
    pub id: i64,
    pub url: String,
    pub emotion: String,
    pub description: String,
    pub source_platform: Option<String>,
    pub source_group_id: Option<String>,
    pub source_sender_id: Option<String>,
    /// UTC timestamp text assigned by SQLite at insert time
    pub created_at: String,
}

/// A sticker that hasn't been written yet. `id` and `created_at` come from
/// the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSticker {
    pub url: String,
    pub emotion: String,
    pub description: String,
    pub source_platform: Option<String>,
    pub source_group_id: Option<String>,
    pub source_sender_id: Option<String>,
}

impl NewSticker {
    /// A sticker with no provenance attached.
    pub fn new(
        url: impl Into<String>,
        emotion: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            emotion: emotion.into(),
            description: description.into(),
            source_platform: None,
            source_group_id: None,
            source_sender_id: None,
        }
    }
}
