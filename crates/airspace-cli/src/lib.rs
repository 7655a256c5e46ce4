//! Airspace CLI - command line tools over the pattern engine.
//!
//! Binaries:
//! - generate_pattern: build a trombone or point-merge pattern and export it
//! - export_csv: turn an export document into one CSV table per route
//! - snap_probe: resolve a screen position against an export document

pub mod config;

use airspace_core::{ExportDocument, NamedPoints, Pattern};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use config::Config;

/// Install the fmt subscriber; `RUST_LOG` refines the default directive.
pub fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("airspace_cli=debug".parse()?),
        )
        .init();
    Ok(())
}

pub fn load_document(path: &Path) -> Result<ExportDocument> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading export document {}", path.display()))?;
    let document = ExportDocument::from_json_str(&json)
        .with_context(|| format!("parsing export document {}", path.display()))?;
    tracing::debug!("Loaded {} routes from {}", document.routes.len(), path.display());
    Ok(document)
}

/// Gazetteer at `path`, or an empty one.
pub fn load_gazetteer(path: Option<&Path>) -> Result<NamedPoints> {
    let Some(path) = path else {
        return Ok(NamedPoints::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading gazetteer {}", path.display()))?;
    let gazetteer = NamedPoints::from_json_str(&json)
        .with_context(|| format!("parsing gazetteer {}", path.display()))?;
    tracing::debug!("Loaded {} named points from {}", gazetteer.len(), path.display());
    Ok(gazetteer)
}

/// Write to `path`, or stdout when `None`.
pub fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => print!("{contents}"),
    }
    Ok(())
}

/// `<dir>/<id>.csv` with characters unsafe in file names replaced.
pub fn csv_path(dir: &Path, pattern: &Pattern) -> PathBuf {
    let stem: String = pattern
        .id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    dir.join(format!("{stem}.csv"))
}
