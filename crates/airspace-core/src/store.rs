//! Authoritative collection of placed patterns.
//!
//! `PatternStore` is plain owned data without locks: a single writer and
//! reader, the thread driving the UI event loop. Callers address patterns
//! by id and get read-only views back.

use crate::error::{GenError, GenResult};
use crate::gazetteer::Gazetteer;
use crate::geodesy::is_coincident;
use crate::models::{
    Color, Pattern, PatternConfig, PatternKind, PointMergeConfig, TromboneConfig, UserRouteConfig,
    Waypoint,
};
use crate::transform::{self, RecomputeMode};
use crate::{point_merge, trombone};

#[derive(Debug, Default)]
pub struct PatternStore {
    /// Insertion order is the snap enumeration order
    patterns: Vec<Pattern>,
    id_counter: u32,
}

impl PatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_trombone(&mut self, name: &str, config: TromboneConfig) -> GenResult<String> {
        let points = trombone::generate(&config)
            .inspect_err(|e| tracing::warn!("Rejected trombone {}: {}", name, e))?
            .to_vec();
        Ok(self.insert_new(name, PatternConfig::Trombone(config), points))
    }

    pub fn create_point_merge(
        &mut self,
        name: &str,
        config: PointMergeConfig,
    ) -> GenResult<String> {
        let points = point_merge::generate(&config)
            .inspect_err(|e| tracing::warn!("Rejected point merge {}: {}", name, e))?;
        Ok(self.insert_new(name, PatternConfig::PointMerge(config), points))
    }

    /// Create a freehand route. Points with an empty name get the
    /// positional default `"{prefix}{index+1}"`.
    pub fn create_user_route(
        &mut self,
        name: &str,
        points: Vec<Waypoint>,
        config: UserRouteConfig,
    ) -> GenResult<String> {
        if points.len() < 2 {
            return Err(GenError::InvalidConfig(format!(
                "a route needs at least 2 points, got {}",
                points.len()
            )));
        }
        if let Some(bad) = points.iter().find(|p| !p.lat.is_finite() || !p.lon.is_finite()) {
            return Err(GenError::InvalidConfig(format!(
                "route point {} has non-finite coordinates",
                bad.name
            )));
        }

        let points = points
            .into_iter()
            .enumerate()
            .map(|(i, mut p)| {
                if p.name.is_empty() {
                    p.name = format!("{}{}", config.name_prefix, i + 1);
                }
                p
            })
            .collect();
        Ok(self.insert_new(name, PatternConfig::UserRoute(config), points))
    }

    pub fn get(&self, id: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.id == id)
    }

    /// All patterns in insertion order.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn ids(&self) -> Vec<String> {
        self.patterns.iter().map(|p| p.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Apply a new config; see [`RecomputeMode`] for how the anchor is treated.
    pub fn update_config(
        &mut self,
        id: &str,
        config: PatternConfig,
        mode: RecomputeMode,
    ) -> GenResult<()> {
        let pattern = self.find_mut(id)?;
        transform::recompute(pattern, config, mode)
            .inspect_err(|e| tracing::warn!("Rejected update of {}: {}", id, e))?;
        tracing::debug!("Recomputed {} ({:?}), {} points", id, mode, pattern.points.len());
        Ok(())
    }

    pub fn translate(&mut self, id: &str, delta_lat: f64, delta_lon: f64) -> GenResult<()> {
        let pattern = self.find_mut(id)?;
        transform::translate(pattern, delta_lat, delta_lon);
        tracing::debug!("Translated {} by ({:.6}, {:.6})", id, delta_lat, delta_lon);
        Ok(())
    }

    pub fn rotate(
        &mut self,
        id: &str,
        center_index: usize,
        delta_bearing_deg: f64,
    ) -> GenResult<()> {
        let pattern = self.find_mut(id)?;
        transform::rotate(pattern, center_index, delta_bearing_deg)?;
        tracing::debug!(
            "Rotated {} by {:.2} deg around point {}",
            id,
            delta_bearing_deg,
            center_index
        );
        Ok(())
    }

    /// Drop a dragged point at `position`, adopting `snapped_name` when it
    /// landed on a gazetteer waypoint.
    pub fn move_point(
        &mut self,
        id: &str,
        index: usize,
        position: (f64, f64),
        snapped_name: Option<&str>,
        gazetteer: &dyn Gazetteer,
    ) -> GenResult<()> {
        let pattern = self.find_mut(id)?;
        transform::drag_point(pattern, index, position, snapped_name, gazetteer)
    }

    pub fn rename(&mut self, id: &str, name: &str) -> GenResult<()> {
        self.find_mut(id)?.name = name.to_string();
        Ok(())
    }

    pub fn set_color(&mut self, id: &str, color: Option<Color>) -> GenResult<()> {
        self.find_mut(id)?.color = color;
        Ok(())
    }

    /// Insert a point into a user route before `index` (`index == len` appends).
    pub fn insert_point(&mut self, id: &str, index: usize, point: Waypoint) -> GenResult<()> {
        let pattern = self.find_route_mut(id)?;
        let len = pattern.points.len();
        if index > len {
            return Err(GenError::IndexOutOfRange { index, len });
        }
        let mut defaults = default_name_flags(pattern);
        defaults.insert(index, point.name.is_empty());
        pattern.points.insert(index, point);
        apply_default_names(pattern, &defaults);
        pattern.refresh_metrics();
        Ok(())
    }

    /// Delete a point from a user route. Routes keep at least 2 points.
    pub fn delete_point(&mut self, id: &str, index: usize) -> GenResult<Waypoint> {
        let pattern = self.find_route_mut(id)?;
        let len = pattern.points.len();
        if index >= len {
            return Err(GenError::IndexOutOfRange { index, len });
        }
        if len <= 2 {
            return Err(GenError::InvalidConfig(format!(
                "route {id} cannot drop below 2 points"
            )));
        }
        let mut defaults = default_name_flags(pattern);
        defaults.remove(index);
        let removed = pattern.points.remove(index);
        apply_default_names(pattern, &defaults);
        pattern.refresh_metrics();
        Ok(removed)
    }

    /// Join two user routes into a new one that replaces both.
    ///
    /// The join point is kept once when `first` ends where `second` starts.
    pub fn merge_routes(&mut self, first: &str, second: &str) -> GenResult<String> {
        if first == second {
            return Err(GenError::InvalidConfig(format!("cannot merge route {first} with itself")));
        }
        let a = self.find_route(first)?;
        let b = self.find_route(second)?;

        let mut points = a.points.clone();
        let skip_join = match (a.points.last(), b.points.first()) {
            (Some(end), Some(start)) => is_coincident(end.position(), start.position()),
            _ => false,
        };
        points.extend(b.points.iter().skip(usize::from(skip_join)).cloned());
        let mut defaults = default_name_flags(a);
        defaults.extend(default_name_flags(b).into_iter().skip(usize::from(skip_join)));

        let name = format!("{} + {}", a.name, b.name);
        let color = a.color;
        let config = a.config.clone();
        let position = self
            .patterns
            .iter()
            .position(|p| p.id == first)
            .unwrap_or(self.patterns.len());

        let id = self.next_id(PatternKind::UserRoute);
        let mut merged = Pattern::new(id.clone(), name, config, points);
        merged.color = color;
        apply_default_names(&mut merged, &defaults);
        merged.refresh_metrics();

        self.patterns.retain(|p| p.id != first && p.id != second);
        let position = position.min(self.patterns.len());
        self.patterns.insert(position, merged);
        tracing::debug!("Merged routes {} and {} into {}", first, second, id);
        Ok(id)
    }

    pub fn remove(&mut self, id: &str) -> GenResult<Pattern> {
        let index = self
            .patterns
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| GenError::PatternNotFound(id.to_string()))?;
        tracing::debug!("Removed pattern {}", id);
        Ok(self.patterns.remove(index))
    }

    /// Add already-built patterns (e.g. from an export document).
    ///
    /// Ids already taken are replaced by fresh ones. Returns the stored ids.
    pub fn import(&mut self, patterns: Vec<Pattern>) -> Vec<String> {
        let mut ids = Vec::with_capacity(patterns.len());
        for mut pattern in patterns {
            if pattern.id.is_empty() || self.get(&pattern.id).is_some() {
                pattern.id = self.next_id(pattern.kind);
            }
            ids.push(pattern.id.clone());
            self.patterns.push(pattern);
        }
        tracing::debug!("Imported {} patterns", ids.len());
        ids
    }

    fn insert_new(&mut self, name: &str, config: PatternConfig, points: Vec<Waypoint>) -> String {
        let id = self.next_id(config.kind());
        let pattern = Pattern::new(id.clone(), name, config, points);
        tracing::debug!(
            "Created {} {} ({}) with {} points",
            pattern.kind.as_str(),
            id,
            name,
            pattern.points.len()
        );
        self.patterns.push(pattern);
        id
    }

    fn next_id(&mut self, kind: PatternKind) -> String {
        loop {
            self.id_counter += 1;
            let id = format!("{}-{}", kind.as_str(), self.id_counter);
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn find_mut(&mut self, id: &str) -> GenResult<&mut Pattern> {
        self.patterns
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| GenError::PatternNotFound(id.to_string()))
    }

    fn find_route(&self, id: &str) -> GenResult<&Pattern> {
        let pattern = self
            .get(id)
            .ok_or_else(|| GenError::PatternNotFound(id.to_string()))?;
        require_route(pattern)?;
        Ok(pattern)
    }

    fn find_route_mut(&mut self, id: &str) -> GenResult<&mut Pattern> {
        let pattern = self.find_mut(id)?;
        require_route(pattern)?;
        Ok(pattern)
    }
}

fn require_route(pattern: &Pattern) -> GenResult<()> {
    if pattern.kind == PatternKind::UserRoute {
        Ok(())
    } else {
        Err(GenError::KindMismatch {
            id: pattern.id.clone(),
            expected: PatternKind::UserRoute.as_str(),
            actual: pattern.kind.as_str(),
        })
    }
}

/// Which points carry the positional default name of their current index.
fn default_name_flags(pattern: &Pattern) -> Vec<bool> {
    pattern
        .points
        .iter()
        .enumerate()
        .map(|(i, point)| point.name.is_empty() || point.name == pattern.default_point_name(i))
        .collect()
}

/// Give every flagged point the default name of its new index.
fn apply_default_names(pattern: &mut Pattern, defaults: &[bool]) {
    let names: Vec<Option<String>> = defaults
        .iter()
        .enumerate()
        .map(|(i, is_default)| is_default.then(|| pattern.default_point_name(i)))
        .collect();
    for (point, name) in pattern.points.iter_mut().zip(names) {
        if let Some(name) = name {
            point.name = name;
        }
    }
}

/// Freehand route being drawn; nothing reaches the store until `commit`.
///
/// Cancelling a draw is dropping the draft.
#[derive(Debug, Clone, Default)]
pub struct RouteDraft {
    config: UserRouteConfig,
    points: Vec<Waypoint>,
}

impl RouteDraft {
    pub fn new(config: UserRouteConfig) -> Self {
        Self {
            config,
            points: Vec::new(),
        }
    }

    /// Append a clicked point; `snapped_name` is the gazetteer name when the
    /// click snapped onto a waypoint.
    pub fn push(&mut self, position: (f64, f64), snapped_name: Option<&str>) {
        let name = snapped_name
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}{}", self.config.name_prefix, self.points.len() + 1));
        self.points.push(Waypoint::new(position.0, position.1, name));
    }

    pub fn pop(&mut self) -> Option<Waypoint> {
        self.points.pop()
    }

    pub fn points(&self) -> &[Waypoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn commit(self, store: &mut PatternStore, name: &str) -> GenResult<String> {
        store.create_user_route(name, self.points, self.config)
    }

    pub fn cancel(self) {}
}
