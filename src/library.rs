use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use crate::config::Config;
use crate::db::{migrate, Db};
use crate::error::Result;
use crate::ingest::{self, SyncReport};

/// Store handle plus the media folder it catalogs.
///
/// Sync runs through one handle are serialized; the queries and tag
/// operations take `&Db` directly and need no coordination.
#[derive(Debug)]
pub struct MediaLibrary {
    db: Db,
    media_root: PathBuf,
    sync_lock: Mutex<()>,
}

impl MediaLibrary {
    pub fn new(db: Db, media_root: impl Into<PathBuf>) -> Self {
        Self {
            db,
            media_root: media_root.into(),
            sync_lock: Mutex::new(()),
        }
    }

    /// Open the configured database and apply pending migrations.
    pub async fn open(config: &Config) -> Result<Self> {
        let library = Self::new(Db::new(config.db_path()), config.media_folder());
        library.migrate(config.migrations_dir()).await?;
        Ok(library)
    }

    pub async fn migrate(&self, migrations_dir: &Path) -> Result<()> {
        let migrations_dir = migrations_dir.to_path_buf();
        self.db
            .with_connection(move |conn| migrate::run_migrations(conn, &migrations_dir))
            .await
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    /// Reconcile the media folder with the catalog, one run at a time.
    pub async fn synchronize(&self) -> Result<SyncReport> {
        let _guard = self.sync_lock.lock().await;
        log::info!("Syncing media folder: {}", self.media_root.display());
        ingest::synchronize(&self.db, &self.media_root).await
    }
}
