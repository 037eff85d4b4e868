//! Image and video primitives: insert-if-absent writes and point lookups.
//!
//! The connection-level functions take `&Connection` so the sync phases can run
//! them inside a single transaction; the `fetch_*` wrappers are for callers
//! holding only a [`Db`].

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{Image, Video};
use super::Db;
use crate::error::{Result, TaggaiError};

/// Outcome of an insert-if-absent keyed by a unique filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted(i64),
    Existing(i64),
}

impl Upsert {
    pub fn id(self) -> i64 {
        match self {
            Upsert::Inserted(id) | Upsert::Existing(id) => id,
        }
    }

    pub fn inserted(self) -> bool {
        matches!(self, Upsert::Inserted(_))
    }
}

/// Insert an image unless any unique key already holds it.
///
/// Returns the new row id, or `None` when the insert was ignored.
pub fn insert_image_if_absent(
    conn: &Connection,
    filename: &str,
    group_name: &str,
    derivation: Option<&str>,
    created_at: DateTime<Utc>,
) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "INSERT OR IGNORE INTO images (filename, group_name, derivation, created_at) \
             VALUES (?1, ?2, ?3, ?4) RETURNING id",
            params![filename, group_name, derivation, created_at],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Insert the image or return the id already stored under `filename`.
///
/// `None` means the insert was refused by a different unique key (the group
/// already has a source image, or already has this derivation) and no row
/// exists for this filename.
pub fn upsert_image(
    conn: &Connection,
    filename: &str,
    group_name: &str,
    derivation: Option<&str>,
    created_at: DateTime<Utc>,
) -> Result<Option<Upsert>> {
    if let Some(id) = insert_image_if_absent(conn, filename, group_name, derivation, created_at)? {
        return Ok(Some(Upsert::Inserted(id)));
    }
    Ok(image_by_filename(conn, filename)?.map(|image| Upsert::Existing(image.id)))
}

pub fn image_by_id(conn: &Connection, id: i64) -> Result<Option<Image>> {
    let sql = format!("SELECT {} FROM images WHERE id = ?1", Image::COLUMNS);
    Ok(conn.query_row(&sql, params![id], Image::from_row).optional()?)
}

pub fn image_by_filename(conn: &Connection, filename: &str) -> Result<Option<Image>> {
    let sql = format!("SELECT {} FROM images WHERE filename = ?1", Image::COLUMNS);
    Ok(conn.query_row(&sql, params![filename], Image::from_row).optional()?)
}

/// Find the image whose filename minus its `.jpg` extension equals `base_name`.
///
/// Tries the lower-case extension first, then any casing of `.jpg`.
pub fn image_by_base_name(conn: &Connection, base_name: &str) -> Result<Option<Image>> {
    if let Some(image) = image_by_filename(conn, &format!("{}.jpg", base_name))? {
        return Ok(Some(image));
    }
    let sql = format!(
        "SELECT {} FROM images \
         WHERE length(filename) = length(?1) + 4 \
           AND substr(filename, 1, length(?1)) = ?1 \
           AND lower(substr(filename, -4)) = '.jpg' \
         ORDER BY id LIMIT 1",
        Image::COLUMNS
    );
    Ok(conn.query_row(&sql, params![base_name], Image::from_row).optional()?)
}

/// Insert a video unless its filename is already stored.
pub fn insert_video_if_absent(
    conn: &Connection,
    image_id: i64,
    filename: &str,
    video_number: i64,
    created_at: DateTime<Utc>,
) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "INSERT OR IGNORE INTO videos (image_id, filename, video_number, created_at) \
             VALUES (?1, ?2, ?3, ?4) RETURNING id",
            params![image_id, filename, video_number, created_at],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Insert the video or return the id already stored under `filename`.
pub fn upsert_video(
    conn: &Connection,
    image_id: i64,
    filename: &str,
    video_number: i64,
    created_at: DateTime<Utc>,
) -> Result<Upsert> {
    if let Some(id) = insert_video_if_absent(conn, image_id, filename, video_number, created_at)? {
        return Ok(Upsert::Inserted(id));
    }
    video_by_filename(conn, filename)?
        .map(|video| Upsert::Existing(video.id))
        .ok_or_else(|| {
            TaggaiError::Database(rusqlite::Error::QueryReturnedNoRows)
        })
}

pub fn video_by_id(conn: &Connection, id: i64) -> Result<Option<Video>> {
    let sql = format!("SELECT {} FROM videos WHERE id = ?1", Video::COLUMNS);
    Ok(conn.query_row(&sql, params![id], Video::from_row).optional()?)
}

pub fn video_by_filename(conn: &Connection, filename: &str) -> Result<Option<Video>> {
    let sql = format!("SELECT {} FROM videos WHERE filename = ?1", Video::COLUMNS);
    Ok(conn.query_row(&sql, params![filename], Video::from_row).optional()?)
}

pub fn videos_for_image(conn: &Connection, image_id: i64) -> Result<Vec<Video>> {
    let sql = format!(
        "SELECT {} FROM videos WHERE image_id = ?1 ORDER BY video_number, id",
        Video::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let videos = stmt
        .query_map(params![image_id], Video::from_row)?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
    Ok(videos)
}

pub async fn fetch_image(db: &Db, id: i64) -> Result<Option<Image>> {
    db.with_connection(move |conn| image_by_id(conn, id)).await
}

pub async fn fetch_video(db: &Db, id: i64) -> Result<Option<Video>> {
    db.with_connection(move |conn| video_by_id(conn, id)).await
}

pub async fn fetch_videos_for_image(db: &Db, image_id: i64) -> Result<Vec<Video>> {
    db.with_connection(move |conn| videos_for_image(conn, image_id)).await
}
