//! Generate a trombone or point-merge pattern and write it as an export
//! document (JSON) or CSV waypoint table.

use airspace_cli::{init_tracing, write_output, Config};
use airspace_core::{
    to_csv, DesignerRules, ExportDocument, PatternStore, SecondLeg, TromboneConfig,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Debug, Subcommand)]
enum PatternArgs {
    /// Trombone anchored on a runway threshold
    Trombone {
        #[arg(long, allow_hyphen_values = true)]
        threshold_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        threshold_lon: f64,
        /// Runway heading; used as the fallback when the far threshold coincides
        #[arg(long)]
        heading: Option<f64>,
        /// Far threshold latitude, to derive the heading
        #[arg(long, allow_hyphen_values = true, requires = "far_lon")]
        far_lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true, requires = "far_lat")]
        far_lon: Option<f64>,
        #[arg(long, default_value = "")]
        approach_id: String,
        #[arg(long)]
        threshold_distance: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        base_angle: Option<f64>,
        #[arg(long)]
        base_distance: Option<f64>,
        #[arg(long)]
        extension: Option<f64>,
    },
    /// Point-merge sequencing legs around a merge point
    PointMerge {
        #[arg(long, allow_hyphen_values = true)]
        merge_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        merge_lon: f64,
        /// Bearing of the first leg point from the merge point
        #[arg(long)]
        bearing: f64,
        #[arg(long)]
        radius: Option<f64>,
        /// Arc lengths in NM, comma separated
        #[arg(long, value_delimiter = ',')]
        segments: Vec<f64>,
        #[arg(long)]
        counter_clockwise: bool,
        /// Offset of a second leg in NM
        #[arg(long)]
        second_offset: Option<f64>,
        /// Place the second leg inside the main one
        #[arg(long)]
        second_inner: bool,
        #[arg(long, value_delimiter = ',')]
        second_segments: Vec<f64>,
        /// Base segment distance of a double-merge inner arc
        #[arg(long)]
        double_merge: Option<f64>,
    },
}

/// Pattern generator
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    pattern: PatternArgs,

    /// Display name of the pattern
    #[arg(long, global = true)]
    name: Option<String>,

    #[arg(long, value_enum, default_value = "json", global = true)]
    format: OutputFormat,

    /// Output file (stdout when omitted)
    #[arg(long, global = true)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing()?;
    let args = Args::parse();
    let config = Config::from_env();
    let rules = config.load_rules()?;

    let mut store = PatternStore::new();
    let id = create_pattern(&mut store, &rules, args.pattern, args.name)?;
    let Some(pattern) = store.get(&id) else {
        bail!("pattern {id} vanished from the store");
    };

    let contents = match args.format {
        OutputFormat::Json => ExportDocument::from_patterns(std::slice::from_ref(pattern))?
            .to_json_string()?,
        OutputFormat::Csv => to_csv(pattern),
    };
    write_output(args.output.as_deref(), &contents)
}

fn create_pattern(
    store: &mut PatternStore,
    rules: &DesignerRules,
    pattern: PatternArgs,
    name: Option<String>,
) -> Result<String> {
    match pattern {
        PatternArgs::Trombone {
            threshold_lat,
            threshold_lon,
            heading,
            far_lat,
            far_lon,
            approach_id,
            threshold_distance,
            base_angle,
            base_distance,
            extension,
        } => {
            let threshold = (threshold_lat, threshold_lon);
            let defaults = &rules.trombone;
            let base = TromboneConfig {
                threshold_distance_nm: threshold_distance.unwrap_or(defaults.threshold_distance_nm),
                base_angle_deg: base_angle.unwrap_or(defaults.base_angle_deg),
                base_distance_nm: base_distance.unwrap_or(defaults.base_distance_nm),
                extension_length_nm: extension.unwrap_or(defaults.extension_length_nm),
                ..defaults.config(approach_id, threshold, heading.unwrap_or_default())
            };
            let config = match (far_lat.zip(far_lon), heading) {
                (Some(far), fallback) => base.aligned_to_runway(far, fallback)?,
                (None, Some(_)) => base,
                (None, None) => bail!("either --heading or --far-lat/--far-lon is required"),
            };
            let name = name.unwrap_or_else(|| airspace_core::trombone::name_stem(&config));
            store
                .create_trombone(&name, config)
                .context("generating trombone")
        }
        PatternArgs::PointMerge {
            merge_lat,
            merge_lon,
            bearing,
            radius,
            segments,
            counter_clockwise,
            second_offset,
            second_inner,
            second_segments,
            double_merge,
        } => {
            let defaults = &rules.point_merge;
            let mut config = defaults.config((merge_lat, merge_lon), bearing);
            if let Some(radius) = radius {
                config.leg_radius_nm = radius;
            }
            if !segments.is_empty() {
                config.segment_arc_lengths_nm = segments;
            }
            if counter_clockwise {
                config.clockwise = false;
            }
            config.second_leg = second_offset.map(|offset_nm| SecondLeg {
                is_inner: second_inner,
                offset_nm,
                segment_arc_lengths_nm: if second_segments.is_empty() {
                    config.segment_arc_lengths_nm.clone()
                } else {
                    second_segments
                },
            });
            config.double_merge_nm = double_merge;
            let name = name.unwrap_or_else(|| "Point merge".to_string());
            store
                .create_point_merge(&name, config)
                .context("generating point merge")
        }
    }
}
