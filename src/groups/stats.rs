use serde::Serialize;

use crate::db::Db;
use crate::error::Result;

/// Row counts across the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub groups: i64,
    pub images: i64,
    pub videos: i64,
    pub tags: i64,
    /// Video/tag links
    pub video_tags: i64,
}

pub async fn catalog_stats(db: &Db) -> Result<CatalogStats> {
    db.with_connection(|conn| {
        let stats = conn.query_row(
            r#"
            SELECT
                (SELECT COUNT(DISTINCT group_name) FROM images),
                (SELECT COUNT(*) FROM images),
                (SELECT COUNT(*) FROM videos),
                (SELECT COUNT(*) FROM tags),
                (SELECT COUNT(*) FROM video_tags)
            "#,
            [],
            |row| {
                Ok(CatalogStats {
                    groups: row.get(0)?,
                    images: row.get(1)?,
                    videos: row.get(2)?,
                    tags: row.get(3)?,
                    video_tags: row.get(4)?,
                })
            },
        )?;
        Ok(stats)
    })
    .await
}
