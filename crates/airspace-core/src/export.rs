//! Export document (JSON) and CSV waypoint tables.
//!
//! JSON layout:
//! `{ "routes": [ { id, name, type, points: [[lat, lon], ...], waypoint_names?,
//! config?, color?, state? } ] }`

use crate::error::{GenError, GenResult};
use crate::geodesy::COINCIDENT_SEGMENT;
use crate::models::{
    Color, Pattern, PatternConfig, PatternKind, PatternState, PointMergeConfig, TromboneConfig,
    UserRouteConfig, Waypoint,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CSV_HEADER: &str =
    "Waypoint,Latitude,Longitude,Lat (DMS),Lon (DMS),Segment Distance (NM),Track (°)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    pub routes: Vec<ExportRoute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRoute {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub points: Vec<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waypoint_names: Option<Vec<String>>,
    /// Kind-specific config; legacy synonym keys are normalized on import
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<PatternState>,
}

impl ExportRoute {
    pub fn from_pattern(pattern: &Pattern) -> GenResult<Self> {
        let config = match &pattern.config {
            PatternConfig::Trombone(cfg) => serde_json::to_value(cfg)?,
            PatternConfig::PointMerge(cfg) => serde_json::to_value(cfg)?,
            PatternConfig::UserRoute(cfg) => serde_json::to_value(cfg)?,
        };
        Ok(Self {
            id: pattern.id.clone(),
            name: pattern.name.clone(),
            kind: pattern.kind,
            points: pattern.points.iter().map(|p| [p.lat, p.lon]).collect(),
            waypoint_names: Some(pattern.points.iter().map(|p| p.name.clone()).collect()),
            config: Some(config),
            color: pattern.color,
            state: Some(pattern.state),
        })
    }

    /// Rebuild a pattern. Points are taken as stored, not regenerated.
    ///
    /// Missing `state` imports as `Modified`, since the stored points are
    /// authoritative over the config.
    pub fn into_pattern(self) -> GenResult<Pattern> {
        let config = match (self.kind, self.config) {
            (PatternKind::Trombone, Some(value)) => {
                PatternConfig::Trombone(serde_json::from_value::<TromboneConfig>(value)?)
            }
            (PatternKind::PointMerge, Some(value)) => {
                PatternConfig::PointMerge(serde_json::from_value::<PointMergeConfig>(value)?)
            }
            (PatternKind::UserRoute, Some(value)) => {
                PatternConfig::UserRoute(serde_json::from_value::<UserRouteConfig>(value)?)
            }
            (PatternKind::UserRoute, None) => PatternConfig::UserRoute(UserRouteConfig::default()),
            (kind, None) => {
                return Err(GenError::Export(format!(
                    "{} route {} has no config",
                    kind.as_str(),
                    self.id
                )))
            }
        };

        if let Some(names) = &self.waypoint_names {
            if names.len() != self.points.len() {
                return Err(GenError::Export(format!(
                    "route {} has {} points but {} waypoint names",
                    self.id,
                    self.points.len(),
                    names.len()
                )));
            }
        }

        let points = self
            .points
            .iter()
            .map(|[lat, lon]| Waypoint::new(*lat, *lon, String::new()))
            .collect();
        let mut pattern = Pattern::new(self.id, self.name, config, points);
        let names = match self.waypoint_names {
            Some(names) => names,
            None => (0..pattern.points.len())
                .map(|i| pattern.default_point_name(i))
                .collect(),
        };
        for (point, name) in pattern.points.iter_mut().zip(names) {
            point.name = name;
        }
        pattern.color = self.color;
        pattern.state = self.state.unwrap_or(PatternState::Modified);
        Ok(pattern)
    }
}

impl ExportDocument {
    pub fn from_patterns(patterns: &[Pattern]) -> GenResult<Self> {
        Ok(Self {
            exported_at: Some(Utc::now()),
            routes: patterns
                .iter()
                .map(ExportRoute::from_pattern)
                .collect::<GenResult<_>>()?,
        })
    }

    pub fn from_json_str(json: &str) -> GenResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> GenResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn into_patterns(self) -> GenResult<Vec<Pattern>> {
        self.routes.into_iter().map(ExportRoute::into_pattern).collect()
    }
}

/// Waypoint table of one pattern, header included.
///
/// Segment distance and track describe the leg arriving at each row's
/// point; they are blank on the first row and for coincident points.
pub fn to_csv(pattern: &Pattern) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for (i, point) in pattern.points.iter().enumerate() {
        let segment = i
            .checked_sub(1)
            .and_then(|prev| {
                let distance = pattern.segment_distances.get(prev);
                distance.zip(pattern.segment_bearings.get(prev))
            })
            .filter(|(distance, _)| **distance != COINCIDENT_SEGMENT);
        let (distance, track) = match segment {
            Some((distance, track)) => (format!("{distance:.2}"), format!("{track:.1}")),
            None => (String::new(), String::new()),
        };

        let row = [
            csv_field(&point.name),
            format!("{:.6}", point.lat),
            format!("{:.6}", point.lon),
            format_dms(point.lat, true),
            format_dms(point.lon, false),
            distance,
            track,
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// `DD MM SS.ss H` with H one of N/S (latitude) or E/W (longitude).
pub fn format_dms(value: f64, is_lat: bool) -> String {
    let hemisphere = match (is_lat, value >= 0.0) {
        (true, true) => 'N',
        (true, false) => 'S',
        (false, true) => 'E',
        (false, false) => 'W',
    };

    let abs = value.abs();
    let mut degrees = abs.trunc();
    let minutes_total = (abs - degrees) * 60.0;
    let mut minutes = minutes_total.trunc();
    let mut seconds = ((minutes_total - minutes) * 60.0 * 100.0).round() / 100.0;

    if seconds >= 60.0 {
        seconds -= 60.0;
        minutes += 1.0;
    }
    if minutes >= 60.0 {
        minutes -= 60.0;
        degrees += 1.0;
    }

    format!("{:02} {:02} {:05.2} {}", degrees as u32, minutes as u32, seconds, hemisphere)
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRouteConfig;

    fn route() -> Pattern {
        Pattern::new(
            "userroute-1",
            "Route",
            PatternConfig::UserRoute(UserRouteConfig::default()),
            vec![
                Waypoint::new(45.5, -75.25, "WP1"),
                Waypoint::new(45.5, -75.25, "WP2"),
                Waypoint::new(45.6, -75.25, "A,B"),
            ],
        )
    }

    #[test]
    fn dms_formatting() {
        assert_eq!(format_dms(45.5, true), "45 30 00.00 N");
        assert_eq!(format_dms(-75.25, false), "75 15 00.00 W");
        assert_eq!(format_dms(-0.5, true), "00 30 00.00 S");
        assert_eq!(format_dms(10.999_999_99, true), "11 00 00.00 N");
        assert_eq!(format_dms(120.0 + 1.0 / 3600.0 * 5.5, false), "120 00 05.50 E");
    }

    #[test]
    fn csv_rows_follow_header() {
        let csv = to_csv(&route());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "WP1,45.500000,-75.250000,45 30 00.00 N,75 15 00.00 W,,");
        // coincident segment leaves distance and track blank
        assert_eq!(lines[2], "WP2,45.500000,-75.250000,45 30 00.00 N,75 15 00.00 W,,");
        assert!(lines[3].starts_with("\"A,B\",45.600000,-75.250000,"));
        assert!(lines[3].ends_with(",6.00,0.0"));
    }

    #[test]
    fn route_without_names_gets_positional_defaults() {
        let json = r#"{"routes": [
            {"id": "r", "type": "userroute", "points": [[1.0, 2.0], [3.0, 4.0]]}
        ]}"#;
        let patterns = ExportDocument::from_json_str(json).unwrap().into_patterns().unwrap();
        assert_eq!(patterns[0].points[1].name, "WP2");
        assert_eq!(patterns[0].state, PatternState::Modified);
        assert_eq!(patterns[0].segment_distances.len(), 1);
    }

    #[test]
    fn generated_route_without_config_is_rejected() {
        let json = r#"{"routes": [{"id": "t", "type": "trombone", "points": [[1.0, 2.0]]}]}"#;
        let err = ExportDocument::from_json_str(json).unwrap().into_patterns().unwrap_err();
        assert!(matches!(err, GenError::Export(_)));
    }

    #[test]
    fn mismatched_name_count_is_rejected() {
        let json = r#"{"routes": [{
            "id": "r", "type": "userroute",
            "points": [[1.0, 2.0], [3.0, 4.0]], "waypoint_names": ["A"]
        }]}"#;
        let err = ExportDocument::from_json_str(json).unwrap().into_patterns().unwrap_err();
        assert!(matches!(err, GenError::Export(_)));
    }

    #[test]
    fn legacy_point_merge_config_is_normalized() {
        let json = r#"{"routes": [{
            "id": "pm", "name": "PM", "type": "pointmerge",
            "points": [[45.0, -75.0]],
            "config": {"merge_point": [45.0, -75.0], "angle": 45.0, "distance": 18.0,
                       "segment_arc_lengths_nm": [3.0]},
            "color": {"_qcolor_": true, "r": 255, "g": 0, "b": 0, "a": 128}
        }]}"#;
        let patterns = ExportDocument::from_json_str(json).unwrap().into_patterns().unwrap();
        let PatternConfig::PointMerge(cfg) = &patterns[0].config else {
            panic!("wrong kind");
        };
        assert_eq!(cfg.initial_bearing_deg, 45.0);
        assert_eq!(cfg.leg_radius_nm, 18.0);
        assert_eq!(patterns[0].color, Some(Color { r: 255, g: 0, b: 0, a: 128 }));
    }
}
