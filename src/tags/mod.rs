//! Free-form tags on videos.
//!
//! Tag names are stored trimmed and lower-cased, so `"Sunset "` and `"sunset"`
//! are the same tag. Tags are never deleted, even once nothing references them.

mod search;

pub use search::{search_tags, search_tags_limited, search_videos_by_tag, suggest_tags, TaggedVideo};

use rusqlite::{params, Connection, TransactionBehavior};

use crate::db::media::video_by_id;
use crate::db::models::{Tag, VideoWithTags};
use crate::db::Db;
use crate::error::{Result, TaggaiError};

/// Maximum number of tags returned by a substring search
pub const TAG_SEARCH_LIMIT: usize = 20;

pub fn normalize_tag_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Return the id of the tag called `name`, creating it if needed.
///
/// One statement, so concurrent callers cannot both create the same name.
pub fn get_or_create_tag_with(conn: &Connection, name: &str) -> Result<i64> {
    let name = normalize_tag_name(name);
    if name.is_empty() {
        return Err(TaggaiError::InvalidInput("Tag name required".to_string()));
    }
    let id = conn.query_row(
        "INSERT INTO tags (name) VALUES (?1) \
         ON CONFLICT(name) DO UPDATE SET name = excluded.name \
         RETURNING id",
        params![name],
        |row| row.get(0),
    )?;
    Ok(id)
}

/// Link a tag to a video. Returns false when the link already existed or
/// either id is unknown.
pub fn attach_tag_with(conn: &Connection, video_id: i64, tag_id: i64) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO video_tags (video_id, tag_id) \
         SELECT ?1, ?2 \
         WHERE EXISTS (SELECT 1 FROM videos WHERE id = ?1) \
           AND EXISTS (SELECT 1 FROM tags WHERE id = ?2)",
        params![video_id, tag_id],
    )?;
    Ok(changed > 0)
}

/// Unlink a tag from a video. Returns false when there was no such link.
pub fn detach_tag_with(conn: &Connection, video_id: i64, tag_id: i64) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM video_tags WHERE video_id = ?1 AND tag_id = ?2",
        params![video_id, tag_id],
    )?;
    Ok(changed > 0)
}

pub fn tags_for_video_with(conn: &Connection, video_id: i64) -> Result<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name FROM tags t \
         INNER JOIN video_tags vt ON vt.tag_id = t.id \
         WHERE vt.video_id = ?1 \
         ORDER BY t.name",
    )?;
    let tags = stmt
        .query_map(params![video_id], Tag::from_row)?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
    Ok(tags)
}

fn video_with_tags_with(conn: &Connection, video_id: i64) -> Result<Option<VideoWithTags>> {
    let Some(video) = video_by_id(conn, video_id)? else {
        return Ok(None);
    };
    let tags = tags_for_video_with(conn, video_id)?;
    Ok(Some(VideoWithTags { video, tags }))
}

pub(crate) fn list_tags_with(conn: &Connection) -> Result<Vec<Tag>> {
    let mut stmt = conn.prepare("SELECT id, name FROM tags ORDER BY name")?;
    let tags = stmt
        .query_map([], Tag::from_row)?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
    Ok(tags)
}

pub async fn get_or_create_tag(db: &Db, name: &str) -> Result<i64> {
    let name = name.to_string();
    db.with_connection(move |conn| get_or_create_tag_with(conn, &name)).await
}

pub async fn attach_tag(db: &Db, video_id: i64, tag_id: i64) -> Result<bool> {
    db.with_connection(move |conn| attach_tag_with(conn, video_id, tag_id)).await
}

pub async fn detach_tag(db: &Db, video_id: i64, tag_id: i64) -> Result<bool> {
    db.with_connection(move |conn| detach_tag_with(conn, video_id, tag_id)).await
}

/// Tags on a video, ordered by name. Empty for unknown videos.
pub async fn tags_for_video(db: &Db, video_id: i64) -> Result<Vec<Tag>> {
    db.with_connection(move |conn| tags_for_video_with(conn, video_id)).await
}

/// Every tag, ordered by name
pub async fn list_tags(db: &Db) -> Result<Vec<Tag>> {
    db.with_connection(|conn| list_tags_with(conn)).await
}

pub async fn video_with_tags(db: &Db, video_id: i64) -> Result<Option<VideoWithTags>> {
    db.with_connection(move |conn| video_with_tags_with(conn, video_id)).await
}

/// Tag a video by name, creating the tag on first use.
///
/// Returns the video with its updated tags, or `None` if the video does not
/// exist (in which case no tag is created).
pub async fn tag_video(db: &Db, video_id: i64, name: &str) -> Result<Option<VideoWithTags>> {
    let name = name.to_string();
    db.with_connection(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if video_by_id(&tx, video_id)?.is_none() {
            return Ok(None);
        }
        let tag_id = get_or_create_tag_with(&tx, &name)?;
        attach_tag_with(&tx, video_id, tag_id)?;
        let result = video_with_tags_with(&tx, video_id)?;
        tx.commit()?;
        Ok(result)
    })
    .await
}

/// Remove a tag from a video and return the video with its remaining tags.
pub async fn untag_video(db: &Db, video_id: i64, tag_id: i64) -> Result<Option<VideoWithTags>> {
    db.with_connection(move |conn| {
        let tx = conn.transaction()?;
        detach_tag_with(&tx, video_id, tag_id)?;
        let result = video_with_tags_with(&tx, video_id)?;
        tx.commit()?;
        Ok(result)
    })
    .await
}
