//! Airspace designer core - geodesic synthesis of trombone and point-merge
//! procedures, rigid transforms of placed patterns and pointer snapping.
//!
//! Everything here is synchronous and runs to completion on the calling
//! thread.

pub mod error;
pub mod export;
pub mod gazetteer;
pub mod geodesy;
pub mod models;
pub mod point_merge;
pub mod rules;
pub mod snap;
pub mod store;
pub mod transform;
pub mod trombone;

pub use error::{GenError, GenResult};
pub use export::{format_dms, to_csv, ExportDocument, ExportRoute};
pub use gazetteer::{Gazetteer, NamedPoints};
pub use geodesy::{destination_point, distance_nm, initial_bearing_deg};
pub use models::{
    Color, Pattern, PatternConfig, PatternKind, PatternState, PointMergeConfig, SecondLeg,
    TromboneConfig, UserRouteConfig, Waypoint,
};
pub use rules::DesignerRules;
pub use snap::{
    collect_candidates, Projection, ScoredCandidate, SnapCandidate, SnapKind, SnapMode, SnapQuery,
    ViewportProjection,
};
pub use store::{PatternStore, RouteDraft};
pub use transform::RecomputeMode;
