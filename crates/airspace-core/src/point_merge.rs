//! Point-merge sequencing leg generator.
//!
//! Every leg is an arc of constant radius around the merge point. Segment
//! arc lengths only set the angular spacing between consecutive points, so
//! all points of a leg stay exactly on its circle however uneven the
//! segments are.

use crate::error::{require_finite, require_positive, GenError, GenResult};
use crate::geodesy::{destination_point, normalize_bearing};
use crate::models::{PointMergeConfig, Waypoint};

pub const MERGE_POINT_NAME: &str = "MP";

/// One arc of the pattern before it is turned into waypoints.
#[derive(Debug, Clone)]
struct LegPlan {
    number: usize,
    radius_nm: f64,
    bearings: Vec<f64>,
}

/// Generate the ordered waypoints of a point-merge pattern.
///
/// Output order: main leg, second leg (if any), double-merge arc (if any),
/// then the merge point itself named `"MP"`.
pub fn generate(config: &PointMergeConfig) -> GenResult<Vec<Waypoint>> {
    validate(config)?;

    let (merge_lat, merge_lon) = config.merge_point;
    let mut points = Vec::new();
    for leg in leg_plan(config) {
        points.extend(leg.bearings.iter().enumerate().map(|(i, bearing)| {
            let (lat, lon) = destination_point(merge_lat, merge_lon, leg.radius_nm, *bearing);
            Waypoint::new(lat, lon, leg_point_name(leg.number, i))
        }));
    }
    points.push(Waypoint::new(merge_lat, merge_lon, MERGE_POINT_NAME));
    Ok(points)
}

/// Names `generate` would assign, in output order.
pub fn point_names(config: &PointMergeConfig) -> Vec<String> {
    let mut names: Vec<String> = leg_plan(config)
        .iter()
        .flat_map(|leg| (0..leg.bearings.len()).map(move |i| leg_point_name(leg.number, i)))
        .collect();
    names.push(MERGE_POINT_NAME.to_string());
    names
}

/// Angular span of the main leg in degrees.
pub fn angular_span_deg(config: &PointMergeConfig) -> f64 {
    let total_arc: f64 = config.segment_arc_lengths_nm.iter().sum();
    (total_arc / config.leg_radius_nm).to_degrees()
}

fn leg_point_name(leg: usize, index: usize) -> String {
    format!("L{leg}WP{}", index + 1)
}

pub(crate) fn validate(config: &PointMergeConfig) -> GenResult<()> {
    require_finite("merge_point.lat", config.merge_point.0)?;
    require_finite("merge_point.lon", config.merge_point.1)?;
    require_finite("initial_bearing_deg", config.initial_bearing_deg)?;
    require_positive("leg_radius_nm", config.leg_radius_nm)?;
    validate_segments("segment_arc_lengths_nm", &config.segment_arc_lengths_nm)?;

    if let Some(second) = &config.second_leg {
        require_positive("second_leg.offset_nm", second.offset_nm)?;
        validate_segments("second_leg.segment_arc_lengths_nm", &second.segment_arc_lengths_nm)?;
        if second.is_inner && second.offset_nm >= config.leg_radius_nm {
            return Err(GenError::InvalidConfig(format!(
                "inner leg offset {} NM must be smaller than leg radius {} NM",
                second.offset_nm, config.leg_radius_nm
            )));
        }
    }

    if let Some(base) = config.double_merge_nm {
        require_positive("double_merge_nm", base)?;
        if config.leg_radius_nm - base <= 0.0 {
            return Err(GenError::InvalidConfig(format!(
                "double-merge radius {} NM - {} NM is not positive",
                config.leg_radius_nm, base
            )));
        }
    }

    Ok(())
}

fn validate_segments(name: &str, segments: &[f64]) -> GenResult<()> {
    if segments.is_empty() {
        return Err(GenError::InvalidConfig(format!("{name} must not be empty")));
    }
    for (i, length) in segments.iter().enumerate() {
        require_positive(&format!("{name}[{i}]"), *length)?;
    }
    Ok(())
}

/// Bearings from the merge point of every point on one arc.
///
/// Point 0 sits on `initial_bearing`; point `i` is displaced by the angle
/// subtended by the first `i` segments.
fn arc_bearings(
    initial_bearing: f64,
    radius_nm: f64,
    segments: &[f64],
    clockwise: bool,
) -> Vec<f64> {
    let direction = if clockwise { 1.0 } else { -1.0 };
    let mut bearings = Vec::with_capacity(segments.len() + 1);
    bearings.push(normalize_bearing(initial_bearing));

    let mut cumulative_arc = 0.0;
    for length in segments {
        cumulative_arc += length;
        let angular_displacement = (cumulative_arc / radius_nm).to_degrees();
        bearings.push(normalize_bearing(initial_bearing + direction * angular_displacement));
    }
    bearings
}

fn leg_plan(config: &PointMergeConfig) -> Vec<LegPlan> {
    let main_bearings = arc_bearings(
        config.initial_bearing_deg,
        config.leg_radius_nm,
        &config.segment_arc_lengths_nm,
        config.clockwise,
    );

    let mut legs = vec![LegPlan {
        number: 1,
        radius_nm: config.leg_radius_nm,
        bearings: main_bearings.clone(),
    }];

    if let Some(second) = &config.second_leg {
        let radius_nm = if second.is_inner {
            config.leg_radius_nm - second.offset_nm
        } else {
            config.leg_radius_nm + second.offset_nm
        };
        legs.push(LegPlan {
            number: legs.len() + 1,
            radius_nm,
            bearings: arc_bearings(
                config.initial_bearing_deg,
                radius_nm,
                &second.segment_arc_lengths_nm,
                config.clockwise,
            ),
        });
    }

    // Inner arc flown back over the main leg's span in the opposite sense.
    if let Some(base) = config.double_merge_nm {
        legs.push(LegPlan {
            number: legs.len() + 1,
            radius_nm: config.leg_radius_nm - base,
            bearings: main_bearings.iter().rev().copied().collect(),
        });
    }

    legs
}
