use walkdir::WalkDir;
use std::path::Path;
use crate::error::{Result, TaggaiError};

/// Kind of media a directory entry looks like, judged by extension only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// A candidate file found directly inside the media folder
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub filename: String,
    pub kind: MediaKind,
}

/// Result of listing the media folder
#[derive(Debug, Default)]
pub struct Listing {
    /// `.jpg` and `.mp4` files, sorted by filename.
    pub files: Vec<MediaFile>,
    /// Entries that could not be read or named; reported, never fatal.
    pub problems: Vec<String>,
}

impl Listing {
    pub fn images(&self) -> impl Iterator<Item = &MediaFile> {
        self.files.iter().filter(|f| f.kind == MediaKind::Image)
    }

    pub fn videos(&self) -> impl Iterator<Item = &MediaFile> {
        self.files.iter().filter(|f| f.kind == MediaKind::Video)
    }
}

/// List the media files directly inside `root`.
///
/// Sub-directories are not descended into and other file types are skipped.
/// Only a failure to read `root` itself is an error.
pub fn discover_media(root: &Path) -> Result<Listing> {
    if !std::fs::metadata(root)?.is_dir() {
        return Err(TaggaiError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("{} is not a directory", root.display()),
        )));
    }

    let mut listing = Listing::default();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                let io = e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop")
                });
                return Err(TaggaiError::Io(io));
            }
            Err(e) => {
                log::warn!("Unreadable entry in {}: {}", root.display(), e);
                listing.problems.push(format!("skipped entry: {}", e));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Some(filename) = entry.file_name().to_str() else {
            let lossy = entry.file_name().to_string_lossy().to_string();
            listing.problems.push(format!("skipped {}: filename is not valid UTF-8", lossy));
            continue;
        };

        let kind = if super::naming::has_image_extension(filename) {
            MediaKind::Image
        } else if super::naming::has_video_extension(filename) {
            MediaKind::Video
        } else {
            log::debug!("Ignoring non-media file {}", filename);
            continue;
        };

        listing.files.push(MediaFile {
            filename: filename.to_string(),
            kind,
        });
    }

    log::info!("Discovered {} media files in {}", listing.files.len(), root.display());
    Ok(listing)
}
