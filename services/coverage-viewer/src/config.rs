//! Viewer configuration.
//!
//! Sources, lowest precedence first: built-in defaults, a YAML file,
//! environment variables (`.env` is loaded by the binary), command-line flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use coverage_common::DEFAULT_TILE_SIZE;
use grid_processor::{GridProcessorConfig, PaletteExtentMode};
use projection::ProjectionKind;
use renderer::DEFAULT_PALETTE;

/// Largest accepted tile edge length.
const MAX_TILE_SIZE: u32 = 4096;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Tile edge length in pixels.
    pub tile_size: u32,

    /// Active palette name.
    pub palette: String,

    /// How the palette extent is chosen.
    pub palette_range: PaletteExtentMode,

    /// Map projection tiles are rendered in.
    pub projection: ProjectionKind,

    /// Rendered tiles kept per layer.
    pub tile_cache_entries: usize,

    /// Interpolation and value masking.
    pub grid: GridProcessorConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            palette: DEFAULT_PALETTE.to_string(),
            palette_range: PaletteExtentMode::Global,
            projection: ProjectionKind::Mercator,
            tile_cache_entries: 256,
            grid: GridProcessorConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Read a YAML file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Defaults overridden by environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Apply environment variable overrides. Unparseable values are ignored.
    pub fn with_env(mut self) -> Self {
        if let Some(size) = env_parse("TILE_SIZE") {
            self.tile_size = size;
        }
        if let Ok(palette) = env::var("VIEWER_PALETTE") {
            self.palette = palette;
        }
        if let Some(mode) = env_parse("VIEWER_PALETTE_RANGE") {
            self.palette_range = mode;
        }
        if let Some(kind) = env_parse("VIEWER_PROJECTION") {
            self.projection = kind;
        }
        if let Some(entries) = env_parse("TILE_CACHE_ENTRIES") {
            self.tile_cache_entries = entries;
        }

        let grid = GridProcessorConfig::from_env();
        let grid_defaults = GridProcessorConfig::default();
        if grid.interpolation != grid_defaults.interpolation {
            self.grid.interpolation = grid.interpolation;
        }
        if grid.value_mask != grid_defaults.value_mask {
            self.grid.value_mask = grid.value_mask;
        }
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tile_size == 0 || self.tile_size > MAX_TILE_SIZE {
            return Err(format!("tile_size must be in 1..={}, got {}", MAX_TILE_SIZE, self.tile_size));
        }
        if self.palette.trim().is_empty() {
            return Err("palette must not be empty".to_string());
        }
        if self.tile_cache_entries == 0 {
            return Err("tile_cache_entries must be > 0".to_string());
        }
        self.grid.validate()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_processor::{InterpolationMethod, ValueMask};

    #[test]
    fn test_defaults_are_valid() {
        let config = ViewerConfig::default();
        assert_eq!(config.tile_size, 256);
        assert_eq!(config.palette, "blues");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = ViewerConfig::default();
        config.tile_size = 0;
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.tile_cache_entries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_partial_override() {
        let yaml = r#"
palette: rainbow
palette_range: fov
projection: geographic
grid:
  interpolation: idw
  value_mask:
    fill_at_or_above: 99999
    exclude_zero: true
"#;
        let config: ViewerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.palette, "rainbow");
        assert_eq!(config.palette_range, PaletteExtentMode::Fov);
        assert_eq!(config.projection, ProjectionKind::Geographic);
        assert_eq!(config.grid.interpolation, InterpolationMethod::InverseDistanceWeighted);
        assert_eq!(config.grid.value_mask, ValueMask::legacy_fill());
        assert_eq!(config.tile_size, 256);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.yaml");
        std::fs::write(&path, "tile_size: 512\n").unwrap();
        let config = ViewerConfig::from_file(&path).unwrap();
        assert_eq!(config.tile_size, 512);
        assert!(ViewerConfig::from_file(dir.path().join("missing.yaml")).is_err());
    }
}
