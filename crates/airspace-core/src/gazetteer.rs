//! Named navigation points the engine can snap to.
//!
//! The table itself is populated by external parsers; the engine only
//! reads it through [`Gazetteer`].

use crate::error::GenResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read-only name -> `(lat, lon)` table.
pub trait Gazetteer {
    fn lookup(&self, name: &str) -> Option<(f64, f64)>;

    /// Name of an entry within `epsilon` degrees of `(lat, lon)` on both axes.
    fn find_by_position(&self, lat: f64, lon: f64, epsilon: f64) -> Option<String> {
        self.entries()
            .find(|(_, (p_lat, p_lon))| {
                (p_lat - lat).abs() <= epsilon && (p_lon - lon).abs() <= epsilon
            })
            .map(|(name, _)| name.to_string())
    }

    /// All entries in a stable order.
    fn entries(&self) -> Box<dyn Iterator<Item = (&str, (f64, f64))> + '_>;
}

impl Gazetteer for BTreeMap<String, (f64, f64)> {
    fn lookup(&self, name: &str) -> Option<(f64, f64)> {
        self.get(name).copied()
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&str, (f64, f64))> + '_> {
        Box::new(self.iter().map(|(name, pos)| (name.as_str(), *pos)))
    }
}

/// In-memory gazetteer ordered by name.
///
/// JSON form: `{ "NAME": [lat, lon], ... }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamedPoints {
    points: BTreeMap<String, (f64, f64)>,
}

impl NamedPoints {
    pub fn from_json_str(json: &str) -> GenResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn insert(&mut self, name: impl Into<String>, lat: f64, lon: f64) {
        self.points.insert(name.into(), (lat, lon));
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromIterator<(String, (f64, f64))> for NamedPoints {
    fn from_iter<I: IntoIterator<Item = (String, (f64, f64))>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl Gazetteer for NamedPoints {
    fn lookup(&self, name: &str) -> Option<(f64, f64)> {
        self.points.lookup(name)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&str, (f64, f64))> + '_> {
        self.points.entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_json_table() {
        let json = r#"{"BRAVO": [45.1, -75.2], "ALPHA": [45.0, -75.0]}"#;
        let table = NamedPoints::from_json_str(json).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("BRAVO"), Some((45.1, -75.2)));
        let names: Vec<&str> = table.entries().map(|(name, _)| name).collect();
        assert_eq!(names, ["ALPHA", "BRAVO"]);
    }

    #[test]
    fn reverse_lookup_respects_epsilon() {
        let mut table = NamedPoints::default();
        table.insert("ALPHA", 45.0, -75.0);
        assert_eq!(table.find_by_position(45.0000005, -75.0, 1e-6), Some("ALPHA".to_string()));
        assert_eq!(table.find_by_position(45.001, -75.0, 1e-6), None);
    }

    #[test]
    fn malformed_json_is_an_export_error() {
        assert!(NamedPoints::from_json_str("[1, 2]").is_err());
    }
}
