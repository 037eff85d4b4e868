//! Filename conventions for the media folder.
//!
//! ```text
//! "cat.jpg"      -> image, group "cat", source
//! "cat_a.jpg"    -> image, group "cat", derivation "a"
//! "cat_a-2.mp4"  -> video #2 of the image whose stem is "cat_a"
//! ```

use regex::Regex;
use std::sync::OnceLock;

/// Identity of an image parsed from its filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageName {
    pub group_name: String,
    /// Lower-cased single letter; `None` for the group's source image.
    pub derivation: Option<String>,
    /// Filename without extension; videos join on this.
    pub base_name: String,
}

/// Identity of a video parsed from its filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoName {
    pub base_name: String,
    pub video_number: i64,
}

fn image_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(.+)\.jpg$").expect("Invalid regex pattern"))
}

fn derivation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+)_([A-Za-z])$").expect("Invalid regex pattern"))
}

fn video_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(.+)-([0-9]+)\.mp4$").expect("Invalid regex pattern"))
}

/// Parse `<group>.jpg` or `<group>_<letter>.jpg`.
pub fn parse_image_name(name: &str) -> Option<ImageName> {
    let base_name = image_regex().captures(name)?.get(1)?.as_str();

    if let Some(caps) = derivation_regex().captures(base_name) {
        return Some(ImageName {
            group_name: caps.get(1)?.as_str().to_string(),
            derivation: Some(caps.get(2)?.as_str().to_lowercase()),
            base_name: base_name.to_string(),
        });
    }

    Some(ImageName {
        group_name: base_name.to_string(),
        derivation: None,
        base_name: base_name.to_string(),
    })
}

/// Parse `<base>-<digits>.mp4`. Numbers beyond `i64` do not parse.
pub fn parse_video_name(name: &str) -> Option<VideoName> {
    let caps = video_regex().captures(name)?;
    Some(VideoName {
        base_name: caps.get(1)?.as_str().to_string(),
        video_number: caps.get(2)?.as_str().parse().ok()?,
    })
}

/// True when the extension marks a file the sync should look at.
pub fn has_image_extension(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".jpg")
}

pub fn has_video_extension(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".mp4")
}
