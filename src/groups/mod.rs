//! Read-side queries over image groups.
//!
//! A group is every image sharing a `group_name`: at most one source image plus
//! its lettered derivations. Listings put the source first, then derivations
//! alphabetically.

mod filter;
mod stats;

pub use filter::DerivationFilter;
pub use stats::{catalog_stats, CatalogStats};

use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::Serialize;

use crate::db::models::{Image, Tag, Video};
use crate::db::Db;
use crate::error::Result;
use crate::tags::tags_for_video_with;

/// One row of the group overview
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub group_name: String,
    /// Source image if the group has one, else its lexicographically first image.
    pub filename: String,
    pub source_filename: Option<String>,
    pub total_videos: i64,
    /// Distinct derivation codes, not counting the source
    pub derivation_count: i64,
    /// Newest image creation time in the group
    pub created_at: DateTime<Utc>,
}

/// A video in a group listing, with its image's identity and its tags.
#[derive(Debug, Clone, Serialize)]
pub struct GroupVideo {
    #[serde(flatten)]
    pub video: Video,
    pub image_filename: String,
    pub derivation: Option<String>,
    pub tags: Vec<Tag>,
}

/// Image and video counts for one derivation of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivationSummary {
    /// `None` for the source image
    pub derivation: Option<String>,
    pub image_count: i64,
    pub video_count: i64,
}

/// All groups, most recently created first.
pub async fn list_groups(db: &Db) -> Result<Vec<GroupSummary>> {
    db.with_connection(|conn| {
        let mut stmt = conn.prepare(
            r#"
            SELECT
                i.group_name,
                MIN(CASE WHEN i.derivation IS NULL THEN i.filename END) AS source_filename,
                MIN(i.filename) AS first_filename,
                COUNT(DISTINCT v.id) AS total_videos,
                COUNT(DISTINCT i.derivation) AS derivation_count,
                MAX(i.created_at) AS created_at
            FROM images i
            LEFT JOIN videos v ON v.image_id = i.id
            GROUP BY i.group_name
            ORDER BY MAX(i.created_at) DESC, MAX(i.id) DESC
            "#,
        )?;
        let groups = stmt
            .query_map([], |row| {
                let source_filename: Option<String> = row.get(1)?;
                let first_filename: String = row.get(2)?;
                Ok(GroupSummary {
                    group_name: row.get(0)?,
                    filename: source_filename.clone().unwrap_or(first_filename),
                    source_filename,
                    total_videos: row.get(3)?,
                    derivation_count: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(groups)
    })
    .await
}

/// Images of a group, source first. Empty for an unknown group.
pub async fn list_images_in_group(db: &Db, group_name: &str) -> Result<Vec<Image>> {
    let group_name = group_name.to_string();
    db.with_connection(move |conn| {
        let sql = format!(
            "SELECT {} FROM images WHERE group_name = ?1 \
             ORDER BY derivation IS NOT NULL, derivation, filename",
            Image::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let images = stmt
            .query_map(params![group_name], Image::from_row)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(images)
    })
    .await
}

/// Videos of a group narrowed by `filter`.
///
/// Ordered source first, then by derivation code, then by video number.
pub async fn list_videos_for_group(
    db: &Db,
    group_name: &str,
    filter: &DerivationFilter,
) -> Result<Vec<GroupVideo>> {
    let mut bindings = vec![group_name.to_string()];
    let derivation_clause = match filter {
        DerivationFilter::All => "",
        DerivationFilter::Source => "AND i.derivation IS NULL",
        DerivationFilter::Derivation(code) => {
            bindings.push(code.clone());
            "AND i.derivation = ?2"
        }
    };
    let sql = format!(
        "SELECT v.id, v.image_id, v.filename, v.video_number, v.created_at, \
                i.filename, i.derivation \
         FROM videos v \
         INNER JOIN images i ON i.id = v.image_id \
         WHERE i.group_name = ?1 {} \
         ORDER BY i.derivation IS NOT NULL, i.derivation, v.video_number, v.id",
        derivation_clause
    );

    db.with_connection(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let videos = stmt
            .query_map(rusqlite::params_from_iter(bindings), |row| {
                Ok(GroupVideo {
                    video: Video::from_row(row)?,
                    image_filename: row.get(5)?,
                    derivation: row.get(6)?,
                    tags: Vec::new(),
                })
            })?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        videos
            .into_iter()
            .map(|mut v| -> Result<GroupVideo> {
                v.tags = tags_for_video_with(conn, v.video.id)?;
                Ok(v)
            })
            .collect()
    })
    .await
}

/// Per-derivation image and video counts for a group, source first.
pub async fn list_derivations_for_group(db: &Db, group_name: &str) -> Result<Vec<DerivationSummary>> {
    let group_name = group_name.to_string();
    db.with_connection(move |conn| {
        let mut stmt = conn.prepare(
            r#"
            SELECT i.derivation, COUNT(DISTINCT i.id), COUNT(DISTINCT v.id)
            FROM images i
            LEFT JOIN videos v ON v.image_id = i.id
            WHERE i.group_name = ?1
            GROUP BY i.derivation
            ORDER BY i.derivation IS NOT NULL, i.derivation
            "#,
        )?;
        let rows = stmt
            .query_map(params![group_name], |row| {
                Ok(DerivationSummary {
                    derivation: row.get(0)?,
                    image_count: row.get(1)?,
                    video_count: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(rows)
    })
    .await
}
