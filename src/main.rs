use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use nml_resolve::collection;
use nml_resolve::history;
use nml_resolve::models::CollectionIndex;

#[derive(Parser)]
#[command(name = "nml-resolve")]
#[command(about = "Resolve NML play-history files against a collection export")]
struct Args {
    /// History (.nml) files to resolve, in order
    #[arg(required = true)]
    history: Vec<PathBuf>,

    /// Collection export used to enrich history entries; without it,
    /// resolution runs in heuristic-only mode
    #[arg(long)]
    collection: Option<PathBuf>,

    /// Log per-tier resolution counters as JSON to stderr
    #[arg(long)]
    stats: bool,
}

fn load_collection(path: &Path) -> Result<CollectionIndex> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read collection file {}", path.display()))?;
    let index = collection::build_index(&text);
    if index.is_loaded() {
        println!(
            "Collection loaded ({} paths, {} keys)",
            index.path_count(),
            index.key_count()
        );
    } else {
        println!("Could not extract collection metadata");
    }
    Ok(index)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let index = match &args.collection {
        Some(path) => load_collection(path)?,
        None => CollectionIndex::default(),
    };

    for path in &args.history {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read history file {}", path.display()))?;
        let (tracks, stats) = history::resolve_with_stats(&text, &index);

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("history");
        println!("\n{} ({} tracks)", name, tracks.len());
        for (i, track) in tracks.iter().enumerate() {
            let artist = if track.artist.is_empty() {
                "Unknown Artist"
            } else {
                track.artist.as_str()
            };
            let title = if track.title.is_empty() {
                "Unknown Title"
            } else {
                track.title.as_str()
            };
            println!("{:02}  {} - {}", i + 1, artist, title);
        }

        if args.stats {
            stats.log(name);
        }
    }

    Ok(())
}
