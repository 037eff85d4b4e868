//! Substring search over tag names.
//!
//! Matching is plain containment on the lower-cased name (`instr`), not a
//! tokenized or ranked search. `%` and `_` in a query are literal characters.
//! Queries are lower-cased but keep their whitespace: `"golden "` does not
//! match a tag named `golden`.

use rusqlite::params;
use serde::Serialize;

use crate::db::models::{Tag, Video};
use crate::db::Db;
use crate::error::Result;
use super::{list_tags_with, tags_for_video_with, TAG_SEARCH_LIMIT};

/// A video found through one of its tags, with its image's identity and all its tags.
#[derive(Debug, Clone, Serialize)]
pub struct TaggedVideo {
    #[serde(flatten)]
    pub video: Video,
    pub image_filename: String,
    pub group_name: String,
    pub derivation: Option<String>,
    pub tags: Vec<Tag>,
}

/// Up to [`TAG_SEARCH_LIMIT`] tags whose name contains `query`, ordered by name.
pub async fn search_tags(db: &Db, query: &str) -> Result<Vec<Tag>> {
    search_tags_limited(db, query, TAG_SEARCH_LIMIT).await
}

pub async fn search_tags_limited(db: &Db, query: &str, limit: usize) -> Result<Vec<Tag>> {
    let needle = query.to_lowercase();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.with_connection(move |conn| {
        let mut stmt = conn.prepare(
            "SELECT id, name FROM tags \
             WHERE instr(name, ?1) > 0 \
             ORDER BY name \
             LIMIT ?2",
        )?;
        let tags = stmt
            .query_map(params![needle, limit], Tag::from_row)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(tags)
    })
    .await
}

/// Autocomplete: every tag for a blank query, otherwise a limited search.
pub async fn suggest_tags(db: &Db, query: &str, limit: usize) -> Result<Vec<Tag>> {
    if query.trim().is_empty() {
        return db.with_connection(|conn| list_tags_with(conn)).await;
    }
    search_tags_limited(db, query, limit).await
}

/// Distinct videos carrying any tag whose name contains `query`, newest first.
///
/// A blank query matches nothing.
pub async fn search_videos_by_tag(db: &Db, query: &str) -> Result<Vec<TaggedVideo>> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }
    let needle = query.to_lowercase();

    db.with_connection(move |conn| {
        let mut stmt = conn.prepare(
            "SELECT v.id, v.image_id, v.filename, v.video_number, v.created_at, \
                    i.filename, i.group_name, i.derivation \
             FROM videos v \
             INNER JOIN images i ON i.id = v.image_id \
             WHERE EXISTS ( \
                 SELECT 1 FROM video_tags vt \
                 INNER JOIN tags t ON t.id = vt.tag_id \
                 WHERE vt.video_id = v.id AND instr(t.name, ?1) > 0 \
             ) \
             ORDER BY v.created_at DESC, v.id DESC",
        )?;
        let videos = stmt
            .query_map(params![needle], |row| {
                Ok(TaggedVideo {
                    video: Video::from_row(row)?,
                    image_filename: row.get(5)?,
                    group_name: row.get(6)?,
                    derivation: row.get(7)?,
                    tags: Vec::new(),
                })
            })?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        videos
            .into_iter()
            .map(|mut v| -> Result<TaggedVideo> {
                v.tags = tags_for_video_with(conn, v.video.id)?;
                Ok(v)
            })
            .collect()
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::setup_test_db;
    use crate::tags::test_support::seed_videos;
    use crate::tags::{get_or_create_tag, tag_video};

    #[tokio::test]
    async fn test_search_tags_substring_case_insensitive() {
        let (db, _temp_dir) = setup_test_db().await;
        for name in ["sunset", "sunrise", "moon", "Sunday best"] {
            get_or_create_tag(&db, name).await.unwrap();
        }

        let names: Vec<_> = search_tags(&db, "SUN").await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["sunday best", "sunrise", "sunset"]);

        let names: Vec<_> = search_tags(&db, "set").await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["sunset"]);
    }

    #[tokio::test]
    async fn test_query_whitespace_is_significant() {
        let (db, _temp_dir) = setup_test_db().await;
        let (first, second) = seed_videos(&db).await;
        tag_video(&db, first, "golden").await.unwrap();
        tag_video(&db, second, "golden hour").await.unwrap();

        let names: Vec<_> = search_tags(&db, "Golden ").await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["golden hour"]);

        let found = search_videos_by_tag(&db, "golden ").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].video.id, second);
        assert_eq!(search_videos_by_tag(&db, "golden").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_tags_is_limited() {
        let (db, _temp_dir) = setup_test_db().await;
        for i in 0..25 {
            get_or_create_tag(&db, &format!("tag{:02}", i)).await.unwrap();
        }

        let tags = search_tags(&db, "tag").await.unwrap();
        assert_eq!(tags.len(), TAG_SEARCH_LIMIT);
        assert_eq!(tags[0].name, "tag00");

        assert_eq!(search_tags_limited(&db, "tag", 3).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_wildcards_are_literal() {
        let (db, _temp_dir) = setup_test_db().await;
        get_or_create_tag(&db, "100%").await.unwrap();
        get_or_create_tag(&db, "plain").await.unwrap();

        let tags = search_tags(&db, "%").await.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "100%");
        assert!(search_tags(&db, "_").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_suggest_tags_blank_lists_all() {
        let (db, _temp_dir) = setup_test_db().await;
        for name in ["b", "a", "c"] {
            get_or_create_tag(&db, name).await.unwrap();
        }

        let all: Vec<_> = suggest_tags(&db, "  ", 2).await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(all, vec!["a", "b", "c"]);
        assert_eq!(suggest_tags(&db, "a", 2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_videos_by_tag() {
        let (db, _temp_dir) = setup_test_db().await;
        let (first, second) = seed_videos(&db).await;

        tag_video(&db, first, "sunset").await.unwrap();
        tag_video(&db, first, "sunrise").await.unwrap();
        tag_video(&db, second, "sunny").await.unwrap();

        let found = search_videos_by_tag(&db, "sun").await.unwrap();
        let ids: Vec<_> = found.iter().map(|v| v.video.id).collect();
        // Distinct videos, newest first
        assert_eq!(ids, vec![second, first]);
        assert_eq!(found[0].image_filename, "cat.jpg");
        assert_eq!(found[0].group_name, "cat");
        assert_eq!(found[0].derivation, None);
        let names: Vec<_> = found[0].tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["sunny"]);
        // Every tag of the video, not only the matching ones
        let names: Vec<_> = found[1].tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["sunrise", "sunset"]);

        let found = search_videos_by_tag(&db, "RISE").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].video.id, first);

        assert!(search_videos_by_tag(&db, "moon").await.unwrap().is_empty());
        assert!(search_videos_by_tag(&db, "   ").await.unwrap().is_empty());
    }
}
