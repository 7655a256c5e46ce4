//! Resolve a screen position against the routes of an export document and
//! the configured gazetteer, printing the snap result as JSON.

use airspace_cli::{init_tracing, load_document, load_gazetteer, Config};
use airspace_core::{
    collect_candidates, snap, Gazetteer, PatternStore, Projection, SnapCandidate, SnapMode,
    SnapQuery, ViewportProjection,
};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Source {
    Endpoint,
    Midpoint,
    Intersection,
    Waypoint,
}

impl From<Source> for SnapMode {
    fn from(source: Source) -> Self {
        match source {
            Source::Endpoint => SnapMode::ENDPOINT,
            Source::Midpoint => SnapMode::MIDPOINT,
            Source::Intersection => SnapMode::INTERSECTION,
            Source::Waypoint => SnapMode::WAYPOINT,
        }
    }
}

/// Snap query probe
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Export document (JSON)
    input: PathBuf,

    /// Viewport center latitude
    #[arg(long, allow_hyphen_values = true)]
    center_lat: f64,

    /// Viewport center longitude
    #[arg(long, allow_hyphen_values = true)]
    center_lon: f64,

    #[arg(long, default_value_t = 2000.0)]
    pixels_per_degree: f64,

    #[arg(long, default_value_t = 1600.0)]
    width: f64,

    #[arg(long, default_value_t = 1200.0)]
    height: f64,

    /// Cursor x in pixels
    #[arg(long, allow_hyphen_values = true)]
    x: f64,

    /// Cursor y in pixels
    #[arg(long, allow_hyphen_values = true)]
    y: f64,

    /// Snap sources to enable (default: rules)
    #[arg(long, value_enum, value_delimiter = ',')]
    sources: Vec<Source>,

    /// Gazetteer JSON (default: AIRSPACE_GAZETTEER)
    #[arg(long)]
    gazetteer: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ProbeReport {
    cursor_geo: (f64, f64),
    tolerance_px: f64,
    snapped: Option<SnapCandidate>,
    /// Gazetteer name at the snapped position, if any
    gazetteer_name: Option<String>,
    nearby: Vec<NearbyCandidate>,
}

#[derive(Debug, Serialize)]
struct NearbyCandidate {
    candidate: SnapCandidate,
    distance_px: f64,
}

fn main() -> Result<()> {
    init_tracing()?;
    let args = Args::parse();
    let config = Config::from_env();
    let rules = config.load_rules()?;

    let gazetteer_path = args.gazetteer.clone().or(config.gazetteer_path.clone());
    let gazetteer = load_gazetteer(gazetteer_path.as_deref())?;

    let mut store = PatternStore::new();
    store.import(load_document(&args.input)?.into_patterns()?);

    let viewport = ViewportProjection {
        center: (args.center_lat, args.center_lon),
        pixels_per_degree: args.pixels_per_degree,
        width_px: args.width,
        height_px: args.height,
    };
    let mode = if args.sources.is_empty() {
        rules.snap_mode
    } else {
        args.sources
            .iter()
            .fold(SnapMode::NONE, |mode, source| mode | SnapMode::from(*source))
    };
    let query = SnapQuery::new((args.x, args.y), mode, rules.snap_tolerance_px);

    let snapped = snap::query(&query, &viewport, store.patterns(), &gazetteer);
    let gazetteer_name = snapped.as_ref().and_then(|c| {
        gazetteer.find_by_position(c.position.0, c.position.1, rules.gazetteer_epsilon_deg)
    });
    let nearby = collect_candidates(&query, &viewport, store.patterns(), &gazetteer)
        .into_iter()
        .map(|scored| NearbyCandidate {
            candidate: scored.candidate,
            distance_px: scored.distance_px,
        })
        .collect();

    let report = ProbeReport {
        cursor_geo: viewport.screen_to_geo(args.x, args.y),
        tolerance_px: rules.snap_tolerance_px,
        snapped,
        gazetteer_name,
        nearby,
    };
    match &report.snapped {
        Some(candidate) => {
            tracing::info!("Snapped to {:?} {}", candidate.kind, candidate.description)
        }
        None => tracing::info!("No snap target within {} px", rules.snap_tolerance_px),
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
