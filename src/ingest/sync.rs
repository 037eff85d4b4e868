//! Filesystem-to-catalog reconciliation.
//!
//! Two phases, each one `IMMEDIATE` transaction: images first, then videos.
//! Every write is insert-if-absent keyed by filename, so re-running over an
//! unchanged folder writes nothing.

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};

use crate::db::media::{image_by_base_name, upsert_image, upsert_video};
use crate::db::Db;
use crate::error::Result;
use super::naming::{parse_image_name, parse_video_name, ImageName};
use super::walker::{discover_media, Listing};

/// What one sync run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Image rows added by this run
    pub images: usize,
    /// Video rows added by this run
    pub videos: usize,
    pub errors: Vec<String>,
}

const UNREADABLE_FOLDER: &str = "failed to read media folder";

impl SyncReport {
    fn unreadable(root: &Path, err: &dyn std::fmt::Display) -> Self {
        Self {
            images: 0,
            videos: 0,
            errors: vec![format!("{} {}: {}", UNREADABLE_FOLDER, root.display(), err)],
        }
    }

    /// The run never started because the folder itself could not be listed.
    pub fn folder_unreadable(&self) -> bool {
        self.images == 0
            && self.videos == 0
            && self.errors.len() == 1
            && self.errors[0].starts_with(UNREADABLE_FOLDER)
    }

    /// No files were added and nothing was skipped.
    pub fn is_noop(&self) -> bool {
        self.images == 0 && self.videos == 0 && self.errors.is_empty()
    }
}

fn unparseable(filename: &str) -> String {
    format!("skipped {}: unparseable", filename)
}

/// Scan `media_root` and bring the catalog up to date.
///
/// Per-file problems end up in [`SyncReport::errors`]. An unreadable folder
/// yields an empty report with a single error. `Err` is reserved for store
/// failures.
pub async fn synchronize(db: &Db, media_root: &Path) -> Result<SyncReport> {
    let root = media_root.to_path_buf();
    let report = db
        .with_connection(move |conn| synchronize_with(conn, &root))
        .await?;

    log::info!(
        "Sync complete: {} images, {} videos added",
        report.images,
        report.videos
    );
    if !report.errors.is_empty() {
        log::warn!("Sync finished with {} errors", report.errors.len());
        for error in &report.errors {
            log::warn!("  - {}", error);
        }
    }

    Ok(report)
}

/// Blocking body of [`synchronize`] on an already-open connection.
pub fn synchronize_with(conn: &mut Connection, media_root: &Path) -> Result<SyncReport> {
    let listing = match discover_media(media_root) {
        Ok(listing) => listing,
        Err(e) => {
            log::error!("Failed to read media folder {}: {}", media_root.display(), e);
            return Ok(SyncReport::unreadable(media_root, &e));
        }
    };

    let mut report = SyncReport {
        errors: listing.problems.clone(),
        ..SyncReport::default()
    };

    // base_name -> image id, only for the lifetime of this run
    let mut image_ids = HashMap::new();

    sync_images(conn, &listing, &mut image_ids, &mut report)?;
    sync_videos(conn, &listing, &mut image_ids, &mut report)?;

    Ok(report)
}

fn sync_images(
    conn: &mut Connection,
    listing: &Listing,
    image_ids: &mut HashMap<String, i64>,
    report: &mut SyncReport,
) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    for file in listing.images() {
        let Some(parsed) = parse_image_name(&file.filename) else {
            report.errors.push(unparseable(&file.filename));
            continue;
        };

        let outcome = upsert_image(
            &tx,
            &file.filename,
            &parsed.group_name,
            parsed.derivation.as_deref(),
            Utc::now(),
        )?;

        match outcome {
            Some(upsert) => {
                if upsert.inserted() {
                    log::debug!("Added image {}", file.filename);
                    report.images += 1;
                }
                image_ids.insert(parsed.base_name, upsert.id());
            }
            None => report.errors.push(duplicate_slot(&file.filename, &parsed)),
        }
    }

    tx.commit()?;
    Ok(())
}

fn duplicate_slot(filename: &str, parsed: &ImageName) -> String {
    match &parsed.derivation {
        None => format!(
            "skipped {}: group {} already has a source image",
            filename, parsed.group_name
        ),
        Some(d) => format!(
            "skipped {}: group {} already has derivation {}",
            filename, parsed.group_name, d
        ),
    }
}

fn sync_videos(
    conn: &mut Connection,
    listing: &Listing,
    image_ids: &mut HashMap<String, i64>,
    report: &mut SyncReport,
) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    for file in listing.videos() {
        let Some(parsed) = parse_video_name(&file.filename) else {
            report.errors.push(unparseable(&file.filename));
            continue;
        };

        let image_id = match image_ids.get(&parsed.base_name) {
            Some(id) => *id,
            None => match image_by_base_name(&tx, &parsed.base_name)? {
                Some(image) => {
                    image_ids.insert(parsed.base_name.clone(), image.id);
                    image.id
                }
                None => {
                    report
                        .errors
                        .push(format!("skipped {}: no matching image", file.filename));
                    continue;
                }
            },
        };

        if upsert_video(&tx, image_id, &file.filename, parsed.video_number, Utc::now())?.inserted() {
            log::debug!("Added video {}", file.filename);
            report.videos += 1;
        }
    }

    tx.commit()?;
    Ok(())
}
