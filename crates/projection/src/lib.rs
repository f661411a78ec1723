//! Map projections between world pixel space and geographic coordinates.
//!
//! Pixel space follows the slippy-map convention: the world at zoom `z`
//! spans `256 * 2^z` pixels per projected unit square, origin at the
//! top-left, y growing southwards.
//!
//! Implements map projections from scratch without external dependencies.

pub mod geographic;
pub mod lambert;
pub mod mercator;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use geographic::Geographic;
pub use lambert::LambertConformal;
pub use mercator::WebMercator;

/// Tile edge length the pixel-space scale is based on.
pub const BASE_TILE_SIZE: f64 = 256.0;

/// World size in pixels at `zoom`.
#[inline]
pub fn world_scale(zoom: u32) -> f64 {
    BASE_TILE_SIZE * f64::from(1u32 << zoom.min(30))
}

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Conversion between world pixel coordinates and geographic coordinates.
pub trait MapProjection: Send + Sync {
    /// Short identifier, e.g. "mercator".
    fn name(&self) -> &'static str;

    /// Pixel -> geographic.
    fn unproject(&self, px: f64, py: f64, zoom: u32) -> LatLon;

    /// Geographic -> pixel.
    fn project(&self, lat: f64, lon: f64, zoom: u32) -> (f64, f64);

    /// True when latitude depends only on the pixel row and longitude only
    /// on the pixel column. Separable projections can be rasterized with
    /// per-row and per-column lookups.
    fn is_separable(&self) -> bool;

    /// Number of tile columns and rows at `zoom`.
    fn tile_matrix(&self, zoom: u32) -> (u32, u32) {
        let n = 1u32 << zoom.min(30);
        (n, n)
    }
}

/// Selectable projection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionKind {
    #[default]
    Mercator,
    Geographic,
    Lambert,
}

impl ProjectionKind {
    pub fn build(&self) -> Box<dyn MapProjection> {
        match self {
            ProjectionKind::Mercator => Box::new(WebMercator),
            ProjectionKind::Geographic => Box::new(Geographic),
            ProjectionKind::Lambert => Box::new(LambertConformal::north_america()),
        }
    }
}

impl FromStr for ProjectionKind {
    type Err = ProjectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mercator" | "epsg:3857" => Ok(ProjectionKind::Mercator),
            "geographic" | "epsg:4326" => Ok(ProjectionKind::Geographic),
            "lambert" => Ok(ProjectionKind::Lambert),
            _ => Err(ProjectionParseError::Unknown(s.to_string())),
        }
    }
}

impl fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProjectionKind::Mercator => "mercator",
            ProjectionKind::Geographic => "geographic",
            ProjectionKind::Lambert => "lambert",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProjectionParseError {
    #[error("Unknown projection: {0}. Expected 'mercator', 'geographic' or 'lambert'")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_scale() {
        assert_eq!(world_scale(0), 256.0);
        assert_eq!(world_scale(3), 2048.0);
    }

    #[test]
    fn test_kind_parse_and_build() {
        let kind: ProjectionKind = "EPSG:3857".parse().unwrap();
        assert_eq!(kind, ProjectionKind::Mercator);
        assert!(kind.build().is_separable());
        assert!(!ProjectionKind::Lambert.build().is_separable());
        assert!("stereo".parse::<ProjectionKind>().is_err());
    }
}
