//! Convert an export document into one CSV waypoint table per route.

use airspace_cli::{csv_path, init_tracing, load_document, write_output, Config};
use airspace_core::to_csv;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// Export document to CSV converter
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Export document (JSON)
    input: PathBuf,

    /// Output directory (default: AIRSPACE_OUTPUT_DIR or the current directory)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Only export the route with this id
    #[arg(long)]
    id: Option<String>,
}

fn main() -> Result<()> {
    init_tracing()?;
    let args = Args::parse();
    let config = Config::from_env();
    let out_dir = args.out_dir.unwrap_or(config.output_dir);

    let patterns = load_document(&args.input)?.into_patterns()?;
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let mut written = 0usize;
    for pattern in patterns
        .iter()
        .filter(|p| args.id.as_deref().map_or(true, |id| p.id == id))
    {
        let path = csv_path(&out_dir, pattern);
        write_output(Some(&path), &to_csv(pattern))?;
        written += 1;
    }

    if written == 0 {
        tracing::warn!("No routes matched in {}", args.input.display());
    }
    Ok(())
}
