//! Designer defaults for new patterns and snapping.

use crate::models::{PointMergeConfig, TromboneConfig};
use crate::snap::SnapMode;
use serde::{Deserialize, Serialize};

/// Configuration for snapping and default pattern parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerRules {
    /// Snap radius in screen pixels
    pub snap_tolerance_px: f64,
    pub snap_mode: SnapMode,
    /// Tolerance (degrees) for reverse gazetteer lookups
    pub gazetteer_epsilon_deg: f64,
    pub trombone: TromboneDefaults,
    pub point_merge: PointMergeDefaults,
}

impl Default for DesignerRules {
    fn default() -> Self {
        Self {
            snap_tolerance_px: 10.0,
            snap_mode: SnapMode::ALL,
            gazetteer_epsilon_deg: 1e-6,
            trombone: TromboneDefaults::default(),
            point_merge: PointMergeDefaults::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TromboneDefaults {
    pub threshold_distance_nm: f64,
    pub base_angle_deg: f64,
    pub base_distance_nm: f64,
    pub extension_length_nm: f64,
}

impl Default for TromboneDefaults {
    fn default() -> Self {
        Self {
            threshold_distance_nm: 5.0,
            base_angle_deg: 90.0,
            base_distance_nm: 5.0,
            extension_length_nm: 10.0,
        }
    }
}

impl TromboneDefaults {
    /// Default trombone for a runway threshold and heading.
    pub fn config(
        &self,
        approach_id: impl Into<String>,
        approach_threshold: (f64, f64),
        runway_heading_deg: f64,
    ) -> TromboneConfig {
        TromboneConfig {
            approach_id: approach_id.into(),
            approach_threshold,
            runway_heading_deg,
            threshold_distance_nm: self.threshold_distance_nm,
            base_angle_deg: self.base_angle_deg,
            base_distance_nm: self.base_distance_nm,
            extension_length_nm: self.extension_length_nm,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointMergeDefaults {
    pub leg_radius_nm: f64,
    pub segment_count: usize,
    pub segment_arc_length_nm: f64,
    pub clockwise: bool,
}

impl Default for PointMergeDefaults {
    fn default() -> Self {
        Self {
            leg_radius_nm: 20.0,
            segment_count: 4,
            segment_arc_length_nm: 3.0,
            clockwise: true,
        }
    }
}

impl PointMergeDefaults {
    /// Default single-leg point merge around `merge_point`.
    pub fn config(&self, merge_point: (f64, f64), initial_bearing_deg: f64) -> PointMergeConfig {
        PointMergeConfig {
            merge_point,
            initial_bearing_deg,
            leg_radius_nm: self.leg_radius_nm,
            segment_arc_lengths_nm: vec![self.segment_arc_length_nm; self.segment_count],
            clockwise: self.clockwise,
            second_leg: None,
            double_merge_nm: None,
        }
    }
}
