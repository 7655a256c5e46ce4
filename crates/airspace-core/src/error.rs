//! Error types for pattern generation, transforms and the pattern store.

use thiserror::Error;

/// Errors returned by the generators, transforms, store and export layer.
///
/// A snap query that finds nothing is not an error; it returns `None`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenError {
    /// Missing or out-of-range scalar, empty segment list, non-positive
    /// radius/distance, inner offset not smaller than the leg radius.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Coincident reference points leave a bearing undefined.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("index {index} out of range for pattern with {len} points")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("pattern not found: {0}")]
    PatternNotFound(String),

    #[error("pattern {id} is a {actual} pattern, expected {expected}")]
    KindMismatch {
        id: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("export document: {0}")]
    Export(String),
}

impl From<serde_json::Error> for GenError {
    fn from(err: serde_json::Error) -> Self {
        GenError::Export(err.to_string())
    }
}

pub type GenResult<T> = Result<T, GenError>;

/// Reject non-finite scalars with a named [`GenError::InvalidConfig`].
pub(crate) fn require_finite(name: &str, value: f64) -> GenResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GenError::InvalidConfig(format!("{name} must be finite, got {value}")))
    }
}

/// Reject non-finite or non-positive scalars.
pub(crate) fn require_positive(name: &str, value: f64) -> GenResult<()> {
    require_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(GenError::InvalidConfig(format!("{name} must be > 0, got {value}")))
    }
}
