//! CLI configuration from environment.

use airspace_core::DesignerRules;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Overrides the snap tolerance of the loaded rules
    pub snap_tolerance_px: Option<f64>,
    /// JSON gazetteer `{ "NAME": [lat, lon] }`
    pub gazetteer_path: Option<PathBuf>,
    /// JSON file with `DesignerRules`; defaults apply when unset
    pub rules_path: Option<PathBuf>,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            snap_tolerance_px: var("AIRSPACE_SNAP_TOLERANCE_PX")
                .and_then(|s| s.parse().ok())
                .filter(|v: &f64| v.is_finite() && *v > 0.0),
            gazetteer_path: var("AIRSPACE_GAZETTEER").map(PathBuf::from),
            rules_path: var("AIRSPACE_RULES").map(PathBuf::from),
            output_dir: var("AIRSPACE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    /// Designer rules from `rules_path` (or defaults) with env overrides applied.
    pub fn load_rules(&self) -> Result<DesignerRules> {
        let mut rules = match &self.rules_path {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading rules file {}", path.display()))?;
                serde_json::from_str(&json)
                    .with_context(|| format!("parsing rules file {}", path.display()))?
            }
            None => DesignerRules::default(),
        };
        if let Some(tolerance) = self.snap_tolerance_px {
            rules.snap_tolerance_px = tolerance;
        }
        Ok(rules)
    }
}
