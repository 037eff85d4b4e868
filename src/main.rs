use clap::{Parser, Subcommand};
use serde::Serialize;
use taggai::db::{migrate, Db};
use taggai::error::TaggaiError;
use taggai::{groups, tags, Config, DerivationFilter, MediaLibrary};
use anyhow::Result;

#[derive(Parser, Debug)]
#[command(name = "taggai")]
#[command(about = "Catalog generated images and their videos, tag and search them", version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply migrations and check the database schema (default)
    Verify,
    /// Scan the media folder and add new images and videos
    Sync,
    /// List image groups, newest first
    Groups,
    /// List the images of a group
    Images { group: String },
    /// List the videos of a group
    Videos {
        group: String,
        /// 'all', 'source' or a derivation letter
        #[arg(short, long, default_value = "all")]
        derivation: String,
    },
    /// Image and video counts per derivation of a group
    Derivations { group: String },
    /// Show a video with its tags
    Video { id: i64 },
    /// Add a tag to a video
    Tag { video: i64, name: String },
    /// Remove a tag from a video
    Untag { video: i64, tag: i64 },
    /// List tags, optionally only those containing a substring
    Tags {
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Find videos by tag substring
    Search { query: String },
    /// Catalog row counts
    Stats,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", &config.taggai.log_level)
    ).init();

    log::debug!("Media folder: {}", config.media_folder().display());
    log::debug!("Database path: {}", config.db_path().display());

    let library = MediaLibrary::open(&config).await?;
    let db = library.db();

    match args.command.unwrap_or(Command::Verify) {
        Command::Verify => verify_database_schema(db).await?,
        Command::Sync => print_json(&library.synchronize().await?)?,
        Command::Groups => print_json(&groups::list_groups(db).await?)?,
        Command::Images { group } => print_json(&groups::list_images_in_group(db, &group).await?)?,
        Command::Videos { group, derivation } => {
            let filter: DerivationFilter = derivation.parse()?;
            print_json(&groups::list_videos_for_group(db, &group, &filter).await?)?
        }
        Command::Derivations { group } => {
            print_json(&groups::list_derivations_for_group(db, &group).await?)?
        }
        Command::Video { id } => {
            let video = tags::video_with_tags(db, id)
                .await?
                .ok_or(TaggaiError::VideoNotFound(id))?;
            print_json(&video)?
        }
        Command::Tag { video, name } => {
            let tagged = tags::tag_video(db, video, &name)
                .await?
                .ok_or(TaggaiError::VideoNotFound(video))?;
            print_json(&tagged)?
        }
        Command::Untag { video, tag } => {
            let untagged = tags::untag_video(db, video, tag)
                .await?
                .ok_or(TaggaiError::VideoNotFound(video))?;
            print_json(&untagged)?
        }
        Command::Tags { query } => {
            let found = tags::suggest_tags(
                db,
                query.as_deref().unwrap_or(""),
                config.search.tag_suggestion_limit,
            )
            .await?;
            print_json(&found)?
        }
        Command::Search { query } => print_json(&tags::search_videos_by_tag(db, &query).await?)?,
        Command::Stats => print_json(&groups::catalog_stats(db).await?)?,
    }

    Ok(())
}

/// Verify that all expected database objects exist
async fn verify_database_schema(db: &Db) -> Result<()> {
    db.with_connection(|conn| {
        let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?;
        let tables: Vec<String> = stmt.query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

        for table in ["images", "videos", "tags", "video_tags", "schema_migrations"] {
            if !tables.iter().any(|t| t == table) {
                return Err(TaggaiError::Config(format!("Missing table: {}", table)));
            }
            log::debug!("✓ Table exists: {}", table);
        }

        let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%'")?;
        let indexes: Vec<String> = stmt.query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

        for index in [
            "idx_images_group_name",
            "idx_videos_image_id",
            "idx_video_tags_video_id",
            "idx_video_tags_tag_id",
            "idx_tags_name",
        ] {
            if indexes.iter().any(|i| i == index) {
                log::debug!("✓ Index exists: {}", index);
            } else {
                log::warn!("Index not found: {}", index);
            }
        }

        let applied = migrate::get_applied_migrations(conn)?;
        log::debug!("✓ {} migrations applied", applied.len());

        let journal_mode: String = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
        if journal_mode.to_uppercase() != "WAL" {
            return Err(TaggaiError::Config(format!("Journal mode is not WAL: {}", journal_mode)));
        }

        let foreign_keys: i32 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
        if foreign_keys != 1 {
            return Err(TaggaiError::Config("Foreign keys not enabled".to_string()));
        }

        let integrity: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        if integrity != "ok" {
            return Err(TaggaiError::Config(format!("Database integrity check failed: {}", integrity)));
        }
        log::info!("✓ Database integrity: OK");

        Ok(())
    }).await?;

    log::info!("✓ Database schema verification complete");
    Ok(())
}
