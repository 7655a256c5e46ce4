//! Trombone pattern generator.
//!
//! Three points anchored on a runway threshold:
//! - A: on the extended centerline, `threshold_distance_nm` out on the approach side
//! - B: base-leg turn point, `base_distance_nm` from A
//! - C: end of the extension leg, flown parallel to the runway heading

use crate::error::{require_finite, require_positive, GenError, GenResult};
use crate::geodesy::{destination_point, normalize_bearing, runway_heading_deg};
use crate::models::{TromboneConfig, Waypoint};

/// Generate points A, B and C of a trombone pattern.
pub fn generate(config: &TromboneConfig) -> GenResult<[Waypoint; 3]> {
    validate(config)?;

    let approach_heading = normalize_bearing(config.runway_heading_deg + 180.0);
    let (t_lat, t_lon) = config.approach_threshold;

    let a = destination_point(t_lat, t_lon, config.threshold_distance_nm, approach_heading);
    // Base angle is subtracted: clockwise-positive relative to the approach centerline.
    let b = destination_point(
        a.0,
        a.1,
        config.base_distance_nm,
        normalize_bearing(approach_heading - config.base_angle_deg),
    );
    let c = destination_point(
        b.0,
        b.1,
        config.extension_length_nm,
        normalize_bearing(config.runway_heading_deg),
    );

    Ok([
        Waypoint::new(a.0, a.1, point_name(config, 0)),
        Waypoint::new(b.0, b.1, point_name(config, 1)),
        Waypoint::new(c.0, c.1, point_name(config, 2)),
    ])
}

/// `T{approachId}A{baseAngle}B{baseDistance}E{extLength}`
pub fn name_stem(config: &TromboneConfig) -> String {
    format!(
        "T{}A{}B{}E{}",
        config.approach_id,
        config.base_angle_deg,
        config.base_distance_nm,
        config.extension_length_nm
    )
}

pub fn point_name(config: &TromboneConfig, index: usize) -> String {
    format!("{}_{}", name_stem(config), index + 1)
}

pub(crate) fn validate(config: &TromboneConfig) -> GenResult<()> {
    require_finite("approach_threshold.lat", config.approach_threshold.0)?;
    require_finite("approach_threshold.lon", config.approach_threshold.1)?;
    require_finite("runway_heading_deg", config.runway_heading_deg)?;
    require_finite("threshold_distance_nm", config.threshold_distance_nm)?;
    if config.threshold_distance_nm < 0.0 {
        return Err(GenError::InvalidConfig(format!(
            "threshold_distance_nm must be >= 0, got {}",
            config.threshold_distance_nm
        )));
    }
    require_finite("base_angle_deg", config.base_angle_deg)?;
    require_positive("base_distance_nm", config.base_distance_nm)?;
    require_positive("extension_length_nm", config.extension_length_nm)?;
    Ok(())
}

impl TromboneConfig {
    /// Derive `runway_heading_deg` from the far runway threshold.
    ///
    /// Coincident thresholds are [`GenError::DegenerateGeometry`] unless an
    /// explicit `fallback_heading` is supplied.
    pub fn aligned_to_runway(
        mut self,
        far_threshold: (f64, f64),
        fallback_heading: Option<f64>,
    ) -> GenResult<Self> {
        self.runway_heading_deg =
            runway_heading_deg(self.approach_threshold, far_threshold, fallback_heading)?;
        Ok(self)
    }
}
