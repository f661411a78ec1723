//! Configuration for grid sampling.

use crate::extent::ValueMask;
use crate::interpolation::InterpolationMethod;
use serde::{Deserialize, Serialize};

/// Configuration for the grid processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridProcessorConfig {
    /// Interpolation method used when none is chosen explicitly.
    pub interpolation: InterpolationMethod,

    /// Sentinel values excluded from palette extents.
    pub value_mask: ValueMask,
}

impl Default for GridProcessorConfig {
    fn default() -> Self {
        Self {
            interpolation: InterpolationMethod::NearestNeighbor,
            value_mask: ValueMask::none(),
        }
    }
}

impl GridProcessorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("GRID_INTERPOLATION") {
            if let Ok(method) = InterpolationMethod::from_key(&val) {
                config.interpolation = method;
            }
        }

        if let Ok(val) = std::env::var("VALUE_MASK_FILL_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                config.value_mask.fill_at_or_above = Some(threshold);
            }
        }

        if let Ok(val) = std::env::var("VALUE_MASK_EXCLUDE_ZERO") {
            config.value_mask.exclude_zero = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("VALUE_MASK") {
            if val.eq_ignore_ascii_case("legacy") {
                config.value_mask = ValueMask::legacy_fill();
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(t) = self.value_mask.fill_at_or_above {
            if !t.is_finite() {
                return Err("value_mask.fill_at_or_above must be finite".to_string());
            }
        }

        Ok(())
    }
}
