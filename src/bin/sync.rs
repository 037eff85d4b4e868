use clap::Parser;
use taggai::{Config, MediaLibrary};
use std::path::PathBuf;
use std::time::Instant;
use anyhow::Result;

#[derive(Parser, Debug)]
#[command(name = "sync")]
#[command(about = "Add new images and videos from the media folder to the Taggai database")]
struct Args {
    /// Scan this folder instead of the configured media_folder
    #[arg(short, long)]
    media: Option<PathBuf>,

    /// Print the report as compact JSON on one line
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "info")
    ).init();

    let args = Args::parse();

    log::info!("Starting Taggai sync");

    let config = Config::load()?;
    let mut library = MediaLibrary::open(&config).await?;
    if let Some(media) = args.media {
        library = MediaLibrary::new(library.db().clone(), media);
    }
    log::info!("Database path: {}", config.db_path().display());

    let start = Instant::now();
    let report = library.synchronize().await?;
    log::info!("Time: {:?}", start.elapsed());

    let json = if args.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{}", json);

    if report.folder_unreadable() {
        std::process::exit(1);
    }

    Ok(())
}
