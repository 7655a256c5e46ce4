//! Rigid transforms and recomputation of placed patterns.
//!
//! Translate and rotate work on a local tangent plane, which is accurate
//! for regional-scale patterns (tens of NM) but not globally. Both flip the
//! pattern to `Modified`.

use crate::error::{GenError, GenResult};
use crate::gazetteer::Gazetteer;
use crate::geodesy::{from_local, normalize_bearing, to_local};
use crate::models::{Pattern, PatternConfig, Waypoint};
use crate::{point_merge, trombone};
use serde::{Deserialize, Serialize};

/// How an updated config is turned into points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecomputeMode {
    /// Regenerate purely from the supplied config. Only valid while `Generated`.
    #[default]
    FromConfig,
    /// Regenerate with the anchor (merge point / runway threshold) pinned to
    /// where the pattern currently is.
    KeepAnchor,
}

/// Shift every point and every positional config field by the same offset.
///
/// This is a planar shift in degrees, not geodesic transport: coordinate
/// differences between points are preserved exactly.
pub fn translate(pattern: &mut Pattern, delta_lat: f64, delta_lon: f64) {
    for point in &mut pattern.points {
        point.lat += delta_lat;
        point.lon += delta_lon;
    }

    match &mut pattern.config {
        PatternConfig::Trombone(cfg) => {
            cfg.approach_threshold.0 += delta_lat;
            cfg.approach_threshold.1 += delta_lon;
        }
        PatternConfig::PointMerge(cfg) => {
            cfg.merge_point.0 += delta_lat;
            cfg.merge_point.1 += delta_lon;
        }
        PatternConfig::UserRoute(_) => {}
    }

    pattern.refresh_metrics();
    pattern.mark_modified();
}

/// Rotate every point except `center_index` clockwise by `delta_bearing_deg`
/// around the point at `center_index`.
///
/// The positional config fields rotate with the points and the config
/// bearings (runway heading / initial bearing) shift by the same angle.
pub fn rotate(pattern: &mut Pattern, center_index: usize, delta_bearing_deg: f64) -> GenResult<()> {
    let center = pattern
        .points
        .get(center_index)
        .map(Waypoint::position)
        .ok_or(GenError::IndexOutOfRange {
            index: center_index,
            len: pattern.points.len(),
        })?;

    for (i, point) in pattern.points.iter_mut().enumerate() {
        if i == center_index {
            continue;
        }
        let (lat, lon) = rotate_about(center, point.position(), delta_bearing_deg);
        point.lat = lat;
        point.lon = lon;
    }

    match &mut pattern.config {
        PatternConfig::Trombone(cfg) => {
            cfg.approach_threshold =
                rotate_about(center, cfg.approach_threshold, delta_bearing_deg);
            cfg.runway_heading_deg = normalize_bearing(cfg.runway_heading_deg + delta_bearing_deg);
        }
        PatternConfig::PointMerge(cfg) => {
            cfg.merge_point = rotate_about(center, cfg.merge_point, delta_bearing_deg);
            cfg.initial_bearing_deg =
                normalize_bearing(cfg.initial_bearing_deg + delta_bearing_deg);
        }
        PatternConfig::UserRoute(_) => {}
    }

    pattern.refresh_metrics();
    pattern.mark_modified();
    Ok(())
}

/// Clockwise rotation of `point` about `center` on the tangent plane at `center`.
pub fn rotate_about(center: (f64, f64), point: (f64, f64), delta_bearing_deg: f64) -> (f64, f64) {
    let (x, y) = to_local(center, point);
    let (sin, cos) = delta_bearing_deg.to_radians().sin_cos();
    let rx = x * cos + y * sin;
    let ry = -x * sin + y * cos;
    from_local(center, rx, ry)
}

/// Move a single point, e.g. at the end of a drag.
///
/// `snapped_name` is the gazetteer name to adopt when the point was dropped
/// on a waypoint candidate. Otherwise a name previously adopted from the
/// gazetteer reverts to the positional default.
pub fn drag_point(
    pattern: &mut Pattern,
    index: usize,
    position: (f64, f64),
    snapped_name: Option<&str>,
    gazetteer: &dyn Gazetteer,
) -> GenResult<()> {
    let len = pattern.points.len();
    if index >= len {
        return Err(GenError::IndexOutOfRange { index, len });
    }

    let default_name = pattern.default_point_name(index);
    let point = &mut pattern.points[index];
    point.lat = position.0;
    point.lon = position.1;
    match snapped_name {
        Some(name) => point.name = name.to_string(),
        None if gazetteer.lookup(&point.name).is_some() => point.name = default_name,
        None => {}
    }

    // The merge point is always the last point; keep the config anchor with it.
    if let PatternConfig::PointMerge(cfg) = &mut pattern.config {
        if index == len - 1 {
            cfg.merge_point = position;
        }
    }

    pattern.refresh_metrics();
    pattern.mark_modified();
    Ok(())
}

/// Replace the config of a pattern and rebuild its points.
///
/// Fails without touching the pattern when the kind differs, when
/// `FromConfig` is requested on a `Modified` pattern, or when generation
/// fails.
pub fn recompute(
    pattern: &mut Pattern,
    config: PatternConfig,
    mode: RecomputeMode,
) -> GenResult<()> {
    if config.kind() != pattern.kind {
        return Err(GenError::KindMismatch {
            id: pattern.id.clone(),
            expected: pattern.kind.as_str(),
            actual: config.kind().as_str(),
        });
    }
    if mode == RecomputeMode::FromConfig && pattern.is_modified() {
        return Err(GenError::InvalidConfig(format!(
            "pattern {} was moved; only anchor-preserving recompute is allowed",
            pattern.id
        )));
    }

    let config = match (mode, config) {
        (RecomputeMode::KeepAnchor, PatternConfig::Trombone(mut cfg)) => {
            if let PatternConfig::Trombone(current) = &pattern.config {
                cfg.approach_threshold = current.approach_threshold;
            }
            PatternConfig::Trombone(cfg)
        }
        (RecomputeMode::KeepAnchor, PatternConfig::PointMerge(mut cfg)) => {
            cfg.merge_point = current_merge_point(pattern).unwrap_or(cfg.merge_point);
            PatternConfig::PointMerge(cfg)
        }
        (_, other) => other,
    };

    let points = match &config {
        PatternConfig::Trombone(cfg) => trombone::generate(cfg)?.to_vec(),
        PatternConfig::PointMerge(cfg) => point_merge::generate(cfg)?,
        PatternConfig::UserRoute(cfg) => rename_route_points(pattern, &cfg.name_prefix),
    };

    pattern.points = points;
    pattern.config = config;
    pattern.refresh_metrics();
    Ok(())
}

/// Where the merge point of a point-merge pattern currently sits.
///
/// The merge point is the last point whatever its name, since it may have
/// adopted a gazetteer name when dropped on a waypoint.
fn current_merge_point(pattern: &Pattern) -> Option<(f64, f64)> {
    match (&pattern.config, pattern.points.last()) {
        (PatternConfig::PointMerge(_), Some(last)) => Some(last.position()),
        (PatternConfig::PointMerge(cfg), None) => Some(cfg.merge_point),
        _ => None,
    }
}

/// Points of a user route with positional default names switched to `prefix`.
fn rename_route_points(pattern: &Pattern, prefix: &str) -> Vec<Waypoint> {
    pattern
        .points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let mut point = point.clone();
            if point.name == pattern.default_point_name(i) {
                point.name = format!("{prefix}{}", i + 1);
            }
            point
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gazetteer::NamedPoints;
    use crate::geodesy::{distance_nm, initial_bearing_deg};
    use crate::models::{PatternState, PointMergeConfig, TromboneConfig, UserRouteConfig};

    fn trombone_pattern() -> Pattern {
        let cfg = TromboneConfig {
            approach_id: "09".to_string(),
            approach_threshold: (45.0, -75.0),
            runway_heading_deg: 90.0,
            threshold_distance_nm: 5.0,
            base_angle_deg: 90.0,
            base_distance_nm: 4.0,
            extension_length_nm: 6.0,
        };
        let points = trombone::generate(&cfg).unwrap().to_vec();
        Pattern::new("t-1", "Trombone", PatternConfig::Trombone(cfg), points)
    }

    fn point_merge_pattern() -> Pattern {
        let cfg = PointMergeConfig {
            merge_point: (45.0, -75.0),
            initial_bearing_deg: 0.0,
            leg_radius_nm: 15.0,
            segment_arc_lengths_nm: vec![3.0, 3.0, 3.0],
            clockwise: true,
            second_leg: None,
            double_merge_nm: None,
        };
        let points = point_merge::generate(&cfg).unwrap();
        Pattern::new("pm-1", "PM", PatternConfig::PointMerge(cfg), points)
    }

    fn small_route() -> Pattern {
        let points = vec![
            Waypoint::new(45.0, -75.0, "WP1"),
            Waypoint::new(45.012, -75.005, "WP2"),
            Waypoint::new(45.004, -74.984, "WP3"),
        ];
        Pattern::new(
            "r-1",
            "Route",
            PatternConfig::UserRoute(UserRouteConfig::default()),
            points,
        )
    }

    #[test]
    fn translate_moves_points_and_anchor() {
        let mut pattern = trombone_pattern();
        let before = pattern.positions();
        translate(&mut pattern, 0.5, -0.25);
        for (old, new) in before.iter().zip(pattern.positions()) {
            assert!((new.0 - old.0 - 0.5).abs() < 1e-12);
            assert!((new.1 - old.1 + 0.25).abs() < 1e-12);
        }
        let PatternConfig::Trombone(cfg) = &pattern.config else {
            panic!("kind changed");
        };
        assert_eq!(cfg.approach_threshold, (45.5, -75.25));
        assert_eq!(pattern.state, PatternState::Modified);
    }

    #[test]
    fn translate_along_longitude_is_rigid() {
        let mut pattern = point_merge_pattern();
        let before = pattern.positions();
        translate(&mut pattern, 0.0, 3.7);
        let after = pattern.positions();
        for i in 0..before.len() {
            for j in 0..before.len() {
                if i == j {
                    continue;
                }
                let d0 = distance_nm(before[i].0, before[i].1, before[j].0, before[j].1);
                let d1 = distance_nm(after[i].0, after[i].1, after[j].0, after[j].1);
                assert!((d0 - d1).abs() < 1e-6);
                let b0 = initial_bearing_deg(before[i].0, before[i].1, before[j].0, before[j].1);
                let b1 = initial_bearing_deg(after[i].0, after[i].1, after[j].0, after[j].1);
                assert!((b0 - b1).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn rotate_preserves_distance_to_center() {
        let mut pattern = small_route();
        let center = pattern.points[0].position();
        let before: Vec<f64> = pattern
            .points
            .iter()
            .map(|p| distance_nm(center.0, center.1, p.lat, p.lon))
            .collect();

        rotate(&mut pattern, 0, 73.0).unwrap();

        assert_eq!(pattern.points[0].position(), center);
        for (i, p) in pattern.points.iter().enumerate().skip(1) {
            let d = distance_nm(center.0, center.1, p.lat, p.lon);
            assert!((d - before[i]).abs() < 1e-3, "point {i}: {d} vs {}", before[i]);
        }
        assert!(pattern.is_modified());
    }

    #[test]
    fn rotate_quarter_turn_moves_north_point_east() {
        let rotated = rotate_about((0.0, 0.0), (0.1, 0.0), 90.0);
        assert!(rotated.0.abs() < 1e-12);
        assert!((rotated.1 - 0.1).abs() < 1e-12);
    }

    #[test]
    fn rotate_shifts_config_bearing() {
        let mut pattern = point_merge_pattern();
        let mp_index = pattern.points.len() - 1;
        rotate(&mut pattern, mp_index, 30.0).unwrap();
        let PatternConfig::PointMerge(cfg) = &pattern.config else {
            panic!("kind changed");
        };
        assert!((cfg.initial_bearing_deg - 30.0).abs() < 1e-12);
        assert_eq!(cfg.merge_point, (45.0, -75.0));
    }

    #[test]
    fn rotate_rejects_bad_center() {
        let mut pattern = small_route();
        let err = rotate(&mut pattern, 3, 10.0).unwrap_err();
        assert_eq!(err, GenError::IndexOutOfRange { index: 3, len: 3 });
        assert_eq!(pattern.state, PatternState::Generated);
    }

    #[test]
    fn from_config_recompute_is_rejected_after_modification() {
        let mut pattern = point_merge_pattern();
        let PatternConfig::PointMerge(cfg) = pattern.config.clone() else {
            panic!("kind changed");
        };
        translate(&mut pattern, 0.1, 0.1);
        let err = recompute(&mut pattern, PatternConfig::PointMerge(cfg), RecomputeMode::FromConfig)
            .unwrap_err();
        assert!(matches!(err, GenError::InvalidConfig(_)));
    }

    #[test]
    fn keep_anchor_recompute_pins_merge_point() {
        let mut pattern = point_merge_pattern();
        let PatternConfig::PointMerge(original) = pattern.config.clone() else {
            panic!("kind changed");
        };
        translate(&mut pattern, 0.2, 0.3);

        let mut updated = original.clone();
        updated.segment_arc_lengths_nm = vec![2.0, 2.0, 2.0, 2.0, 2.0];
        updated.leg_radius_nm = 12.0;
        recompute(
            &mut pattern,
            PatternConfig::PointMerge(updated),
            RecomputeMode::KeepAnchor,
        )
        .unwrap();

        let mp = pattern.points.last().unwrap();
        assert!((mp.lat - 45.2).abs() < 1e-12);
        assert!((mp.lon + 74.7).abs() < 1e-12);
        assert_eq!(pattern.points.len(), 7);
        for p in &pattern.points[..6] {
            assert!((distance_nm(mp.lat, mp.lon, p.lat, p.lon) - 12.0).abs() < 1e-4);
        }
        assert!(pattern.is_modified());
    }

    #[test]
    fn keep_anchor_recompute_lets_point_a_move_with_threshold_distance() {
        let mut pattern = trombone_pattern();
        translate(&mut pattern, 0.1, 0.0);
        let PatternConfig::Trombone(mut cfg) = pattern.config.clone() else {
            panic!("kind changed");
        };
        let threshold = cfg.approach_threshold;
        cfg.approach_threshold = (0.0, 0.0);
        cfg.threshold_distance_nm = 8.0;
        recompute(&mut pattern, PatternConfig::Trombone(cfg), RecomputeMode::KeepAnchor).unwrap();

        let PatternConfig::Trombone(pinned) = &pattern.config else {
            panic!("kind changed");
        };
        assert_eq!(pinned.approach_threshold, threshold);
        let a = &pattern.points[0];
        assert!((distance_nm(threshold.0, threshold.1, a.lat, a.lon) - 8.0).abs() < 1e-4);
    }

    #[test]
    fn recompute_rejects_kind_change() {
        let mut pattern = small_route();
        let cfg = match point_merge_pattern().config {
            PatternConfig::PointMerge(cfg) => cfg,
            _ => unreachable!(),
        };
        let err = recompute(&mut pattern, PatternConfig::PointMerge(cfg), RecomputeMode::FromConfig)
            .unwrap_err();
        assert!(matches!(err, GenError::KindMismatch { .. }));
    }

    #[test]
    fn drag_adopts_and_reverts_gazetteer_names() {
        let mut gazetteer = NamedPoints::default();
        gazetteer.insert("ALPHA", 45.02, -75.01);
        let mut pattern = small_route();

        drag_point(&mut pattern, 1, (45.02, -75.01), Some("ALPHA"), &gazetteer).unwrap();
        assert_eq!(pattern.points[1].name, "ALPHA");
        assert!(pattern.is_modified());

        drag_point(&mut pattern, 1, (45.03, -75.02), None, &gazetteer).unwrap();
        assert_eq!(pattern.points[1].name, "WP2");
        assert_eq!(pattern.points[1].position(), (45.03, -75.02));
    }

    #[test]
    fn keep_anchor_recompute_follows_merge_point_snapped_to_waypoint() {
        let mut gazetteer = NamedPoints::default();
        gazetteer.insert("ALPHA", 45.2, -74.8);
        let mut pattern = point_merge_pattern();
        let mp_index = pattern.points.len() - 1;

        drag_point(&mut pattern, mp_index, (45.2, -74.8), Some("ALPHA"), &gazetteer).unwrap();
        assert_eq!(pattern.points[mp_index].name, "ALPHA");
        let PatternConfig::PointMerge(mut cfg) = pattern.config.clone() else {
            panic!("kind changed");
        };
        assert_eq!(cfg.merge_point, (45.2, -74.8));

        cfg.leg_radius_nm = 12.0;
        recompute(&mut pattern, PatternConfig::PointMerge(cfg), RecomputeMode::KeepAnchor).unwrap();

        let mp = pattern.points.last().unwrap();
        assert_eq!(mp.position(), (45.2, -74.8));
        for p in &pattern.points[..pattern.points.len() - 1] {
            assert!((distance_nm(45.2, -74.8, p.lat, p.lon) - 12.0).abs() < 1e-4);
        }
    }

    #[test]
    fn dragging_a_leg_point_keeps_merge_point_config() {
        let mut pattern = point_merge_pattern();
        drag_point(&mut pattern, 0, (45.3, -75.0), None, &NamedPoints::default()).unwrap();
        let PatternConfig::PointMerge(cfg) = &pattern.config else {
            panic!("kind changed");
        };
        assert_eq!(cfg.merge_point, (45.0, -75.0));
    }

    #[test]
    fn drag_rejects_out_of_range_index() {
        let mut pattern = small_route();
        let err =
            drag_point(&mut pattern, 9, (0.0, 0.0), None, &NamedPoints::default()).unwrap_err();
        assert!(matches!(err, GenError::IndexOutOfRange { index: 9, .. }));
    }
}
