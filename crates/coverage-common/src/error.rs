//! Error types for coverage loading and tile rendering.
//!
//! A missing cell or an interpolation with no usable neighbors is not an
//! error. Those are `None` values and render as transparent pixels.

use thiserror::Error;

/// Result type alias using CoverageError.
pub type CoverageResult<T> = Result<T, CoverageError>;

#[derive(Debug, Error)]
pub enum CoverageError {
    // === Domain Errors ===
    #[error("Unsupported coordinate system: {0}")]
    UnsupportedCoordinateSystem(String),

    #[error("Unsupported longitude discontinuity: bbox west {lon_min} lies east of east {lon_max}")]
    UnsupportedDiscontinuity { lon_min: f64, lon_max: f64 },

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    // === Range Errors ===
    #[error("Range shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Index out of range: {axis} index {index} >= {len}")]
    IndexOutOfRange {
        axis: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Range not loaded for parameter: {0}")]
    RangeNotLoaded(String),

    #[error("Parameter not found: {0}")]
    ParameterNotFound(String),

    // === Selection Errors ===
    #[error("Palette not found: {0}")]
    PaletteNotFound(String),

    #[error("Unknown interpolation method: {0}")]
    UnknownInterpolation(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Output Errors ===
    #[error("Encoding failed: {0}")]
    EncodeError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoverageError {
    pub fn invalid_domain(msg: impl Into<String>) -> Self {
        Self::InvalidDomain(msg.into())
    }

    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// True for errors that abort a whole layer rather than a single request.
    pub fn is_fatal_for_layer(&self) -> bool {
        matches!(
            self,
            CoverageError::UnsupportedCoordinateSystem(_)
                | CoverageError::UnsupportedDiscontinuity { .. }
                | CoverageError::InvalidDomain(_)
                | CoverageError::ShapeMismatch { .. }
        )
    }
}
