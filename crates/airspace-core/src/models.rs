//! Core data models for the pattern engine.

use crate::geodesy::segment_metrics;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A named geographic point. Names are gazetteer-derived or synthesized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

impl Waypoint {
    pub fn new(lat: f64, lon: f64, name: impl Into<String>) -> Self {
        Self {
            lat,
            lon,
            name: name.into(),
        }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Trombone,
    PointMerge,
    UserRoute,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Trombone => "trombone",
            PatternKind::PointMerge => "pointmerge",
            PatternKind::UserRoute => "userroute",
        }
    }
}

/// Lifecycle state. `Generated -> Modified` happens once and never reverts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternState {
    /// Points are exactly what the generator produced from the config
    #[default]
    Generated,
    /// Points were moved by a translate, rotate or drag
    Modified,
}

/// Parameters of a trombone pattern anchored on a runway threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TromboneConfig {
    /// Identifier used in the synthesized waypoint names
    #[serde(default)]
    pub approach_id: String,
    /// Runway threshold `(lat, lon)`
    pub approach_threshold: (f64, f64),
    pub runway_heading_deg: f64,
    pub threshold_distance_nm: f64,
    /// Base-leg turn, measured from the approach centerline
    pub base_angle_deg: f64,
    pub base_distance_nm: f64,
    pub extension_length_nm: f64,
}

/// Additional sequencing leg flown parallel to the main one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondLeg {
    /// Inner legs sit at `radius - offset`, outer legs at `radius + offset`
    pub is_inner: bool,
    pub offset_nm: f64,
    pub segment_arc_lengths_nm: Vec<f64>,
}

/// Parameters of a point-merge pattern.
///
/// Legacy documents name the radius `distance` or `first_point_distance`
/// and the bearing `angle` or `track_angle`; both are accepted on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointMergeConfig {
    pub merge_point: (f64, f64),
    #[serde(alias = "angle", alias = "track_angle")]
    pub initial_bearing_deg: f64,
    #[serde(alias = "distance", alias = "first_point_distance")]
    pub leg_radius_nm: f64,
    pub segment_arc_lengths_nm: Vec<f64>,
    #[serde(default = "default_clockwise")]
    pub clockwise: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_leg: Option<SecondLeg>,
    /// Base segment distance of the double-merge inner arc
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_merge_nm: Option<f64>,
}

fn default_clockwise() -> bool {
    true
}

/// Freehand routes only carry the prefix for positional default names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRouteConfig {
    #[serde(default = "default_prefix")]
    pub name_prefix: String,
}

fn default_prefix() -> String {
    "WP".to_string()
}

impl Default for UserRouteConfig {
    fn default() -> Self {
        Self {
            name_prefix: default_prefix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PatternConfig {
    Trombone(TromboneConfig),
    PointMerge(PointMergeConfig),
    UserRoute(UserRouteConfig),
}

impl PatternConfig {
    pub fn kind(&self) -> PatternKind {
        match self {
            PatternConfig::Trombone(_) => PatternKind::Trombone,
            PatternConfig::PointMerge(_) => PatternKind::PointMerge,
            PatternConfig::UserRoute(_) => PatternKind::UserRoute,
        }
    }
}

/// RGBA display color.
///
/// Serialized as the tagged object `{"_qcolor_": true, "r", "g", "b", "a"}`
/// used by existing export documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

#[derive(Serialize, Deserialize)]
struct TaggedColor {
    #[serde(rename = "_qcolor_", default)]
    tag: bool,
    r: u8,
    g: u8,
    b: u8,
    #[serde(default = "opaque")]
    a: u8,
}

fn opaque() -> u8 {
    255
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TaggedColor {
            tag: true,
            r: self.r,
            g: self.g,
            b: self.b,
            a: self.a,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tagged = TaggedColor::deserialize(deserializer)?;
        if !tagged.tag {
            return Err(de::Error::custom("color object is missing the _qcolor_ tag"));
        }
        Ok(Color {
            r: tagged.r,
            g: tagged.g,
            b: tagged.b,
            a: tagged.a,
        })
    }
}

/// A placed pattern. Owned by the pattern store; the UI holds only its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub id: String,
    pub name: String,
    pub kind: PatternKind,
    pub points: Vec<Waypoint>,
    pub state: PatternState,
    pub config: PatternConfig,
    /// NM per consecutive pair; `-1.0` marks coincident points
    pub segment_distances: Vec<f64>,
    pub segment_bearings: Vec<f64>,
    #[serde(default)]
    pub color: Option<Color>,
}

impl Pattern {
    /// Build a freshly generated pattern and derive its segment metrics.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        config: PatternConfig,
        points: Vec<Waypoint>,
    ) -> Self {
        let mut pattern = Self {
            id: id.into(),
            name: name.into(),
            kind: config.kind(),
            points,
            state: PatternState::Generated,
            config,
            segment_distances: Vec::new(),
            segment_bearings: Vec::new(),
            color: None,
        };
        pattern.refresh_metrics();
        pattern
    }

    pub fn positions(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(Waypoint::position).collect()
    }

    /// Recompute `segment_distances`/`segment_bearings` from the points.
    pub fn refresh_metrics(&mut self) {
        let (distances, bearings) = segment_metrics(&self.positions());
        self.segment_distances = distances;
        self.segment_bearings = bearings;
    }

    pub fn mark_modified(&mut self) {
        self.state = PatternState::Modified;
    }

    pub fn is_modified(&self) -> bool {
        self.state == PatternState::Modified
    }

    /// Positional default name of the point at `index`.
    pub fn default_point_name(&self, index: usize) -> String {
        match &self.config {
            PatternConfig::UserRoute(cfg) => format!("{}{}", cfg.name_prefix, index + 1),
            PatternConfig::Trombone(cfg) => crate::trombone::point_name(cfg, index),
            PatternConfig::PointMerge(cfg) => crate::point_merge::point_names(cfg)
                .into_iter()
                .nth(index)
                .unwrap_or_else(|| format!("WP{}", index + 1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_serializes_with_qcolor_tag() {
        let value = serde_json::to_value(Color::rgb(10, 20, 30)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"_qcolor_": true, "r": 10, "g": 20, "b": 30, "a": 255})
        );
    }

    #[test]
    fn color_without_tag_is_rejected() {
        let untagged = serde_json::json!({"r": 1, "g": 2, "b": 3, "a": 4});
        let result: Result<Color, _> = serde_json::from_value(untagged);
        assert!(result.is_err());
    }

    #[test]
    fn point_merge_config_accepts_legacy_keys() {
        let cfg: PointMergeConfig = serde_json::from_value(serde_json::json!({
            "merge_point": [45.0, -75.0],
            "track_angle": 90.0,
            "first_point_distance": 12.5,
            "segment_arc_lengths_nm": [2.0, 2.0]
        }))
        .unwrap();
        assert_eq!(cfg.initial_bearing_deg, 90.0);
        assert_eq!(cfg.leg_radius_nm, 12.5);
        assert!(cfg.clockwise);
        assert!(cfg.second_leg.is_none());
    }

    #[test]
    fn new_pattern_has_one_metric_per_segment() {
        let points = vec![
            Waypoint::new(45.0, -75.0, "A"),
            Waypoint::new(45.1, -75.0, "B"),
            Waypoint::new(45.1, -74.9, "C"),
        ];
        let pattern = Pattern::new(
            "r-1",
            "Route",
            PatternConfig::UserRoute(UserRouteConfig::default()),
            points,
        );
        assert_eq!(pattern.state, PatternState::Generated);
        assert_eq!(pattern.segment_distances.len(), 2);
        assert_eq!(pattern.segment_bearings.len(), 2);
        assert_eq!(pattern.default_point_name(1), "WP2");
    }
}
