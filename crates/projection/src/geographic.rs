//! Equirectangular (plate carrée, EPSG:4326) in pixel space.
//!
//! The world is two tiles wide and one tile tall at zoom 0.

use crate::{world_scale, LatLon, MapProjection};

#[derive(Debug, Clone, Copy, Default)]
pub struct Geographic;

impl MapProjection for Geographic {
    fn name(&self) -> &'static str {
        "geographic"
    }

    fn unproject(&self, px: f64, py: f64, zoom: u32) -> LatLon {
        let scale = world_scale(zoom);
        LatLon::new(90.0 - py * 180.0 / scale, px * 180.0 / scale - 180.0)
    }

    fn project(&self, lat: f64, lon: f64, zoom: u32) -> (f64, f64) {
        let scale = world_scale(zoom);
        ((lon + 180.0) * scale / 180.0, (90.0 - lat) * scale / 180.0)
    }

    fn is_separable(&self) -> bool {
        true
    }

    fn tile_matrix(&self, zoom: u32) -> (u32, u32) {
        let n = 1u32 << zoom.min(30);
        (n * 2, n)
    }
}
