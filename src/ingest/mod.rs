pub mod naming;
pub mod walker;
pub mod sync;

pub use naming::{parse_image_name, parse_video_name, ImageName, VideoName};
pub use walker::{discover_media, Listing, MediaFile, MediaKind};
pub use sync::{synchronize, synchronize_with, SyncReport};
