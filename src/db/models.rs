//! Row types for the four catalog tables.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::Serialize;

/// A still image: the source of a group, or one of its lettered derivations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub id: i64,
    pub filename: String,
    pub group_name: String,
    /// `None` for the group's source image.
    pub derivation: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Image {
    pub(crate) const COLUMNS: &'static str = "id, filename, group_name, derivation, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            filename: row.get(1)?,
            group_name: row.get(2)?,
            derivation: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

/// A rendered clip owned by one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Video {
    pub id: i64,
    pub image_id: i64,
    pub filename: String,
    pub video_number: i64,
    pub created_at: DateTime<Utc>,
}

impl Video {
    pub(crate) const COLUMNS: &'static str = "id, image_id, filename, video_number, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            image_id: row.get(1)?,
            filename: row.get(2)?,
            video_number: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

impl Tag {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

/// A video together with its tags, ordered by tag name.
#[derive(Debug, Clone, Serialize)]
pub struct VideoWithTags {
    #[serde(flatten)]
    pub video: Video,
    pub tags: Vec<Tag>,
}

impl VideoWithTags {
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }
}
