use std::fs;
use std::path::{Path, PathBuf};

use taggai::db::Db;
use taggai::{groups, tags, DerivationFilter, MediaLibrary};
use tempfile::TempDir;

fn migrations_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations")
}

async fn library_with(files: &[&str]) -> (MediaLibrary, TempDir, TempDir) {
    let media = TempDir::new().unwrap();
    let db_dir = TempDir::new().unwrap();
    for name in files {
        fs::write(media.path().join(name), b"media").unwrap();
    }
    let library = MediaLibrary::new(Db::new(db_dir.path().join("taggai.db")), media.path());
    library.migrate(&migrations_dir()).await.unwrap();
    (library, media, db_dir)
}

#[tokio::test]
async fn sync_group_tag_and_search() {
    let (library, _media, _db_dir) = library_with(&[
        "cat.jpg", "cat_a.jpg", "cat_b.jpg", "cat-1.mp4", "cat_a-1.mp4", "cat_a-2.mp4", "ghost-1.mp4",
    ])
    .await;
    let db = library.db();

    let report = library.synchronize().await.unwrap();
    assert_eq!((report.images, report.videos), (3, 3));
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("ghost-1.mp4"));

    let groups = groups::list_groups(db).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].filename, "cat.jpg");
    assert_eq!(groups[0].total_videos, 3);
    assert_eq!(groups[0].derivation_count, 2);

    let filter = DerivationFilter::from_query(Some("a")).unwrap();
    let videos = groups::list_videos_for_group(db, "cat", &filter).await.unwrap();
    let names: Vec<_> = videos.iter().map(|v| v.video.filename.as_str()).collect();
    assert_eq!(names, vec!["cat_a-1.mp4", "cat_a-2.mp4"]);

    let target = videos[1].video.id;
    let tagged = tags::tag_video(db, target, "Golden Hour ").await.unwrap().unwrap();
    assert_eq!(tagged.tag_names(), vec!["golden hour"]);
    tags::tag_video(db, target, "golden hour").await.unwrap();
    assert_eq!(tags::tags_for_video(db, target).await.unwrap().len(), 1);

    let found = tags::search_videos_by_tag(db, "GOLDEN").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].video.filename, "cat_a-2.mp4");
    assert_eq!(found[0].image_filename, "cat_a.jpg");
    assert_eq!(found[0].derivation.as_deref(), Some("a"));

    let tag_id = tagged.tags[0].id;
    let after = tags::untag_video(db, target, tag_id).await.unwrap().unwrap();
    assert!(after.tags.is_empty());
    assert!(tags::search_videos_by_tag(db, "golden").await.unwrap().is_empty());
    assert_eq!(tags::list_tags(db).await.unwrap().len(), 1);
}

#[tokio::test]
async fn resync_after_success_is_idempotent() {
    let (library, media, _db_dir) = library_with(&["owl.jpg", "owl_m.jpg", "owl-1.mp4", "owl_m-01.mp4"]).await;

    let first = library.synchronize().await.unwrap();
    assert_eq!((first.images, first.videos, first.errors.len()), (2, 2, 0));
    assert!(library.synchronize().await.unwrap().is_noop());

    fs::write(media.path().join("owl_m-2.mp4"), b"media").unwrap();
    let third = library.synchronize().await.unwrap();
    assert_eq!((third.images, third.videos), (0, 1));

    let stats = groups::catalog_stats(library.db()).await.unwrap();
    assert_eq!((stats.groups, stats.images, stats.videos), (1, 2, 3));
}

#[tokio::test]
async fn missing_folder_reports_single_error() {
    let db_dir = TempDir::new().unwrap();
    let library = MediaLibrary::new(Db::new(db_dir.path().join("taggai.db")), db_dir.path().join("absent"));
    library.migrate(&migrations_dir()).await.unwrap();

    let report = library.synchronize().await.unwrap();
    assert_eq!(report.images, 0);
    assert_eq!(report.videos, 0);
    assert_eq!(report.errors.len(), 1);
    assert!(report.folder_unreadable());
}
