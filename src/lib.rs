pub mod config;
pub mod error;
pub mod db;
pub mod ingest;
pub mod tags;
pub mod groups;
pub mod library;

pub use config::Config;
pub use error::{TaggaiError, Result};
pub use groups::DerivationFilter;
pub use ingest::SyncReport;
pub use library::MediaLibrary;
