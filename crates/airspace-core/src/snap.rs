//! Pointer snapping against drawn patterns and the gazetteer.
//!
//! The engine stays headless: the caller injects the geo <-> screen
//! projection, so intersection results depend on the current viewport and
//! are recomputed on every query.

use crate::gazetteer::Gazetteer;
use crate::geodesy::{segment_intersection_2d, COINCIDENT_SEGMENT};
use crate::models::Pattern;
use serde::{Deserialize, Serialize};
use std::ops::BitOr;

/// Bitmask of independently toggleable snap sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapMode {
    bits: u8,
}

impl SnapMode {
    pub const NONE: SnapMode = SnapMode { bits: 0 };
    pub const ENDPOINT: SnapMode = SnapMode { bits: 1 << 0 };
    pub const MIDPOINT: SnapMode = SnapMode { bits: 1 << 1 };
    pub const INTERSECTION: SnapMode = SnapMode { bits: 1 << 2 };
    pub const WAYPOINT: SnapMode = SnapMode { bits: 1 << 3 };
    pub const ALL: SnapMode = SnapMode { bits: 0b1111 };

    pub fn from_bits(bits: u8) -> Self {
        Self {
            bits: bits & Self::ALL.bits,
        }
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn contains(&self, other: SnapMode) -> bool {
        other.bits != 0 && self.bits & other.bits == other.bits
    }

    pub fn set(&mut self, other: SnapMode, enabled: bool) {
        if enabled {
            self.bits |= other.bits;
        } else {
            self.bits &= !other.bits;
        }
    }

    pub fn toggle(&mut self, other: SnapMode) {
        self.bits ^= other.bits;
    }
}

impl Default for SnapMode {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for SnapMode {
    type Output = SnapMode;

    fn bitor(self, rhs: SnapMode) -> SnapMode {
        SnapMode {
            bits: self.bits | rhs.bits,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapKind {
    Endpoint,
    Midpoint,
    Intersection,
    Waypoint,
}

impl SnapKind {
    pub fn mode(&self) -> SnapMode {
        match self {
            SnapKind::Endpoint => SnapMode::ENDPOINT,
            SnapKind::Midpoint => SnapMode::MIDPOINT,
            SnapKind::Intersection => SnapMode::INTERSECTION,
            SnapKind::Waypoint => SnapMode::WAYPOINT,
        }
    }
}

/// A geographic feature the cursor can snap to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapCandidate {
    /// `(lat, lon)` to use instead of the raw cursor position
    pub position: (f64, f64),
    pub kind: SnapKind,
    /// For waypoint candidates this is the gazetteer name
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: SnapCandidate,
    /// Screen distance from the cursor in pixels
    pub distance_px: f64,
}

/// Caller-supplied mapping between geographic and screen coordinates.
pub trait Projection {
    fn geo_to_screen(&self, lat: f64, lon: f64) -> (f64, f64);
    fn screen_to_geo(&self, x: f64, y: f64) -> (f64, f64);
}

impl<F, G> Projection for (F, G)
where
    F: Fn(f64, f64) -> (f64, f64),
    G: Fn(f64, f64) -> (f64, f64),
{
    fn geo_to_screen(&self, lat: f64, lon: f64) -> (f64, f64) {
        (self.0)(lat, lon)
    }

    fn screen_to_geo(&self, x: f64, y: f64) -> (f64, f64) {
        (self.1)(x, y)
    }
}

/// Equirectangular viewport centred on a geographic point.
///
/// Screen y grows downwards; longitude is scaled by `cos(center_lat)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportProjection {
    pub center: (f64, f64),
    pub pixels_per_degree: f64,
    pub width_px: f64,
    pub height_px: f64,
}

impl ViewportProjection {
    fn lon_scale(&self) -> f64 {
        self.pixels_per_degree * self.center.0.to_radians().cos().max(1e-9)
    }
}

impl Projection for ViewportProjection {
    fn geo_to_screen(&self, lat: f64, lon: f64) -> (f64, f64) {
        let x = self.width_px / 2.0 + (lon - self.center.1) * self.lon_scale();
        let y = self.height_px / 2.0 - (lat - self.center.0) * self.pixels_per_degree;
        (x, y)
    }

    fn screen_to_geo(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = self.center.1 + (x - self.width_px / 2.0) / self.lon_scale();
        let lat = self.center.0 - (y - self.height_px / 2.0) / self.pixels_per_degree;
        (lat, lon)
    }
}

/// One pointer-move query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapQuery<'a> {
    /// Cursor in screen pixels
    pub cursor: (f64, f64),
    pub mode: SnapMode,
    pub tolerance_px: f64,
    /// Point being dragged, as `(pattern id, point index)`; it and the
    /// segments touching it are ignored.
    pub exclude: Option<(&'a str, usize)>,
}

impl<'a> SnapQuery<'a> {
    pub fn new(cursor: (f64, f64), mode: SnapMode, tolerance_px: f64) -> Self {
        Self {
            cursor,
            mode,
            tolerance_px,
            exclude: None,
        }
    }

    pub fn excluding(mut self, pattern_id: &'a str, index: usize) -> Self {
        self.exclude = Some((pattern_id, index));
        self
    }

    fn is_excluded_point(&self, pattern: &Pattern, index: usize) -> bool {
        matches!(self.exclude, Some((id, i)) if id == pattern.id && i == index)
    }

    fn is_excluded_segment(&self, pattern: &Pattern, start: usize) -> bool {
        self.is_excluded_point(pattern, start) || self.is_excluded_point(pattern, start + 1)
    }
}

/// Resolve the cursor to a snap target.
///
/// Candidates are enumerated endpoint, midpoint, intersection, waypoint
/// (restricted to the enabled sources); the first one within
/// `tolerance_px` wins, not the nearest.
pub fn query<P>(
    query: &SnapQuery<'_>,
    projection: &P,
    patterns: &[Pattern],
    gazetteer: &dyn Gazetteer,
) -> Option<SnapCandidate>
where
    P: Projection + ?Sized,
{
    collect_candidates(query, projection, patterns, gazetteer)
        .into_iter()
        .find(|scored| scored.distance_px <= query.tolerance_px)
        .map(|scored| scored.candidate)
}

/// Every candidate within `2 × tolerance_px`, in enumeration order.
pub fn collect_candidates<P>(
    query: &SnapQuery<'_>,
    projection: &P,
    patterns: &[Pattern],
    gazetteer: &dyn Gazetteer,
) -> Vec<ScoredCandidate>
where
    P: Projection + ?Sized,
{
    let mut collector = Collector {
        cursor: query.cursor,
        radius_px: 2.0 * query.tolerance_px,
        found: Vec::new(),
    };

    let screen: Vec<Vec<(f64, f64)>> = patterns
        .iter()
        .map(|pattern| {
            pattern
                .points
                .iter()
                .map(|p| projection.geo_to_screen(p.lat, p.lon))
                .collect()
        })
        .collect();

    if query.mode.contains(SnapMode::ENDPOINT) {
        for (pattern, pixels) in patterns.iter().zip(&screen) {
            for (i, (point, pixel)) in pattern.points.iter().zip(pixels).enumerate() {
                if query.is_excluded_point(pattern, i) {
                    continue;
                }
                collector.offer(*pixel, || SnapCandidate {
                    position: point.position(),
                    kind: SnapKind::Endpoint,
                    description: format!("{} ({})", point.name, pattern.name),
                });
            }
        }
    }

    if query.mode.contains(SnapMode::MIDPOINT) {
        for pattern in patterns {
            for (i, pair) in pattern.points.windows(2).enumerate() {
                if query.is_excluded_segment(pattern, i) || is_coincident_segment(pattern, i) {
                    continue;
                }
                // Plain lat/lon mean, not the geodesic midpoint.
                let mid = ((pair[0].lat + pair[1].lat) / 2.0, (pair[0].lon + pair[1].lon) / 2.0);
                collector.offer(projection.geo_to_screen(mid.0, mid.1), || SnapCandidate {
                    position: mid,
                    kind: SnapKind::Midpoint,
                    description: format!("Midpoint {}-{}", pair[0].name, pair[1].name),
                });
            }
        }
    }

    if query.mode.contains(SnapMode::INTERSECTION) {
        for (a_idx, a) in patterns.iter().enumerate() {
            for (b_idx, b) in patterns.iter().enumerate().skip(a_idx + 1) {
                for i in 0..a.points.len().saturating_sub(1) {
                    if query.is_excluded_segment(a, i) || is_coincident_segment(a, i) {
                        continue;
                    }
                    for j in 0..b.points.len().saturating_sub(1) {
                        if query.is_excluded_segment(b, j) || is_coincident_segment(b, j) {
                            continue;
                        }
                        let Some(pixel) = segment_intersection_2d(
                            screen[a_idx][i],
                            screen[a_idx][i + 1],
                            screen[b_idx][j],
                            screen[b_idx][j + 1],
                        ) else {
                            continue;
                        };
                        collector.offer(pixel, || SnapCandidate {
                            position: projection.screen_to_geo(pixel.0, pixel.1),
                            kind: SnapKind::Intersection,
                            description: format!("Intersection {} / {}", a.name, b.name),
                        });
                    }
                }
            }
        }
    }

    if query.mode.contains(SnapMode::WAYPOINT) {
        for (name, (lat, lon)) in gazetteer.entries() {
            collector.offer(projection.geo_to_screen(lat, lon), || SnapCandidate {
                position: (lat, lon),
                kind: SnapKind::Waypoint,
                description: name.to_string(),
            });
        }
    }

    collector.found
}

fn is_coincident_segment(pattern: &Pattern, start: usize) -> bool {
    pattern
        .segment_distances
        .get(start)
        .is_some_and(|d| *d == COINCIDENT_SEGMENT)
}

struct Collector {
    cursor: (f64, f64),
    radius_px: f64,
    found: Vec<ScoredCandidate>,
}

impl Collector {
    fn offer(&mut self, pixel: (f64, f64), candidate: impl FnOnce() -> SnapCandidate) {
        let distance_px = (pixel.0 - self.cursor.0).hypot(pixel.1 - self.cursor.1);
        if distance_px <= self.radius_px {
            self.found.push(ScoredCandidate {
                candidate: candidate(),
                distance_px,
            });
        }
    }
}
