//! Spherical-earth geodesy in nautical miles and degrees.
//!
//! Every position is `(lat, lon)` in decimal degrees, positive north/east.
//! Bearings are degrees clockwise from true north in `[0, 360)`.
//!
//! NaN inputs are not guarded; they propagate to NaN outputs.

use crate::error::{GenError, GenResult};

/// Mean earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.065;

/// Two points closer than this on both axes (degrees, roughly 10-15 m) are
/// treated as coincident and get no rendered segment.
pub const COINCIDENT_THRESHOLD_DEG: f64 = 1.85e-4;

/// Segment distance marking "coincident points, do not render a segment".
pub const COINCIDENT_SEGMENT: f64 = -1.0;

/// Great-circle distance between two points (haversine), in nautical miles.
pub fn distance_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_NM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Normalize any bearing in degrees into `[0, 360)`.
pub fn normalize_bearing(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Initial great-circle bearing from point 1 to point 2, in `[0, 360)`.
pub fn initial_bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    normalize_bearing(x.atan2(y).to_degrees())
}

/// Point reached by travelling `distance_nm` along the great circle that
/// leaves `(lat, lon)` on `bearing_deg`.
///
/// # Returns
/// (new_lat, new_lon) in degrees, longitude wrapped to `[-180, 180)`
pub fn destination_point(lat: f64, lon: f64, distance_nm: f64, bearing_deg: f64) -> (f64, f64) {
    if distance_nm.abs() <= f64::EPSILON {
        return (lat, lon);
    }

    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let bearing_rad = bearing_deg.to_radians();
    let angular_distance = distance_nm / EARTH_RADIUS_NM;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    (lat2.to_degrees(), lon2.to_degrees())
}

/// True when two positions fall within [`COINCIDENT_THRESHOLD_DEG`] on both axes.
pub fn is_coincident(a: (f64, f64), b: (f64, f64)) -> bool {
    (a.0 - b.0).abs() < COINCIDENT_THRESHOLD_DEG && (a.1 - b.1).abs() < COINCIDENT_THRESHOLD_DEG
}

/// Runway heading from the approach threshold towards the far threshold.
///
/// Coincident thresholds leave the heading undefined: the caller's
/// `fallback` is used if given, otherwise [`GenError::DegenerateGeometry`].
pub fn runway_heading_deg(
    threshold: (f64, f64),
    far_end: (f64, f64),
    fallback: Option<f64>,
) -> GenResult<f64> {
    if is_coincident(threshold, far_end) {
        return match fallback {
            Some(heading) if heading.is_finite() => Ok(normalize_bearing(heading)),
            Some(heading) => Err(GenError::InvalidConfig(format!(
                "fallback heading must be finite, got {heading}"
            ))),
            None => Err(GenError::DegenerateGeometry(format!(
                "runway thresholds ({:.6}, {:.6}) and ({:.6}, {:.6}) coincide, no fallback heading",
                threshold.0, threshold.1, far_end.0, far_end.1
            ))),
        };
    }
    Ok(initial_bearing_deg(threshold.0, threshold.1, far_end.0, far_end.1))
}

/// Distance (NM) and bearing (deg) of every consecutive pair of points.
///
/// Coincident pairs get [`COINCIDENT_SEGMENT`] as distance and `0.0` as bearing.
pub fn segment_metrics(points: &[(f64, f64)]) -> (Vec<f64>, Vec<f64>) {
    points
        .windows(2)
        .map(|pair| {
            let (a, b) = (pair[0], pair[1]);
            if is_coincident(a, b) {
                (COINCIDENT_SEGMENT, 0.0)
            } else {
                (
                    distance_nm(a.0, a.1, b.0, b.1),
                    initial_bearing_deg(a.0, a.1, b.0, b.1),
                )
            }
        })
        .unzip()
}

// ==== Local tangent plane ====
// Offsets in degrees of latitude, with longitude scaled by cos(center_lat).

/// Offset of `point` from `center` on the local tangent plane: `(x east, y north)`.
pub fn to_local(center: (f64, f64), point: (f64, f64)) -> (f64, f64) {
    let x = (point.1 - center.1) * center.0.to_radians().cos();
    let y = point.0 - center.0;
    (x, y)
}

/// Inverse of [`to_local`].
pub fn from_local(center: (f64, f64), x: f64, y: f64) -> (f64, f64) {
    let scale = center.0.to_radians().cos().max(1e-9);
    (center.0 + y, center.1 + x / scale)
}

/// Intersection point of two 2D segments (screen space), if they cross.
///
/// Uses the parametric form `a1 + t(a2-a1) = b1 + u(b2-b1)` and accepts
/// `t, u ∈ [0, 1]`. Parallel or collinear segments yield `None`.
pub fn segment_intersection_2d(
    a1: (f64, f64),
    a2: (f64, f64),
    b1: (f64, f64),
    b2: (f64, f64),
) -> Option<(f64, f64)> {
    const EPS: f64 = 1e-12;

    fn cross(p: (f64, f64), q: (f64, f64)) -> f64 {
        p.0 * q.1 - p.1 * q.0
    }

    let r = (a2.0 - a1.0, a2.1 - a1.1);
    let s = (b2.0 - b1.0, b2.1 - b1.1);
    let denom = cross(r, s);
    if denom.abs() <= EPS {
        return None;
    }

    let qp = (b1.0 - a1.0, b1.1 - a1.1);
    let t = cross(qp, s) / denom;
    let u = cross(qp, r) / denom;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }

    Some((a1.0 + t * r.0, a1.1 + t * r.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_degree_latitude_is_sixty_nm() {
        let dist = distance_nm(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 60.04).abs() < 0.05, "got {dist}");
    }

    #[test]
    fn test_distance_same_point() {
        let dist = distance_nm(45.0, -75.0, 45.0, -75.0);
        assert!(dist < 1e-9);
    }

    #[test]
    fn bearing_cardinal_directions() {
        assert!(initial_bearing_deg(0.0, 0.0, 1.0, 0.0).abs() < 1e-9);
        assert!((initial_bearing_deg(0.0, 0.0, 0.0, 1.0) - 90.0).abs() < 1e-9);
        assert!((initial_bearing_deg(0.0, 0.0, -1.0, 0.0) - 180.0).abs() < 1e-9);
        assert!((initial_bearing_deg(0.0, 0.0, 0.0, -1.0) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn normalize_bearing_wraps_both_directions() {
        assert_eq!(normalize_bearing(360.0), 0.0);
        assert!((normalize_bearing(-90.0) - 270.0).abs() < 1e-12);
        assert!((normalize_bearing(725.0) - 5.0).abs() < 1e-9);
        assert_eq!(normalize_bearing(-1e-20), 0.0);
    }

    #[test]
    fn destination_point_is_consistent_with_distance_and_bearing() {
        let (lat, lon) = destination_point(45.0, -75.0, 25.0, 137.0);
        let dist = distance_nm(45.0, -75.0, lat, lon);
        let brg = initial_bearing_deg(45.0, -75.0, lat, lon);
        assert!((dist - 25.0).abs() < 1e-6, "distance {dist}");
        assert!((brg - 137.0).abs() < 1e-6, "bearing {brg}");
    }

    #[test]
    fn destination_point_differs_from_flat_sixtieth_shortcut() {
        // At 60N one NM east is about 1/30 degree of longitude, not 1/60.
        let (_, lon) = destination_point(60.0, 0.0, 1.0, 90.0);
        assert!((lon - 1.0 / 30.0).abs() < 1e-4, "got {lon}");
    }

    #[test]
    fn destination_point_wraps_antimeridian() {
        let (_, lon) = destination_point(0.0, 179.9, 30.0, 90.0);
        assert!(lon < -179.0, "got {lon}");
    }

    #[test]
    fn runway_heading_requires_fallback_for_coincident_thresholds() {
        let err = runway_heading_deg((45.0, -75.0), (45.0, -75.0), None).unwrap_err();
        assert!(matches!(err, GenError::DegenerateGeometry(_)));

        let heading = runway_heading_deg((45.0, -75.0), (45.0, -75.0), Some(370.0)).unwrap();
        assert!((heading - 10.0).abs() < 1e-9);

        let heading = runway_heading_deg((45.0, -75.0), (45.0, -74.9), None).unwrap();
        assert!((heading - 90.0).abs() < 0.1);
    }

    #[test]
    fn segment_metrics_marks_coincident_pairs() {
        let points = [(45.0, -75.0), (45.0, -75.0 + 1e-5), (45.1, -75.0)];
        let (dists, brgs) = segment_metrics(&points);
        assert_eq!(dists.len(), 2);
        assert_eq!(dists[0], COINCIDENT_SEGMENT);
        assert_eq!(brgs[0], 0.0);
        assert!((dists[1] - 6.0).abs() < 0.01);
    }

    #[test]
    fn segment_metrics_of_single_point_is_empty() {
        let (dists, brgs) = segment_metrics(&[(1.0, 2.0)]);
        assert!(dists.is_empty() && brgs.is_empty());
    }

    #[test]
    fn local_plane_round_trip() {
        let center = (45.0, -75.0);
        let point = (45.12, -74.83);
        let (x, y) = to_local(center, point);
        let back = from_local(center, x, y);
        assert!((back.0 - point.0).abs() < 1e-12);
        assert!((back.1 - point.1).abs() < 1e-12);
    }

    #[test]
    fn segment_intersection_detects_x_crossing() {
        let hit = segment_intersection_2d((0.0, 0.0), (10.0, 10.0), (0.0, 10.0), (10.0, 0.0));
        let (x, y) = hit.unwrap();
        assert!((x - 5.0).abs() < 1e-12 && (y - 5.0).abs() < 1e-12);
    }

    #[test]
    fn segment_intersection_rejects_disjoint_and_parallel() {
        assert!(segment_intersection_2d((0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, -1.0)).is_none());
        assert!(segment_intersection_2d((0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)).is_none());
    }
}
