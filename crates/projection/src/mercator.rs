//! Spherical Web Mercator (EPSG:3857) in pixel space.

use std::f64::consts::PI;

use crate::{world_scale, LatLon, MapProjection};

/// Latitude limit where the square Mercator world ends.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl MapProjection for WebMercator {
    fn name(&self) -> &'static str {
        "mercator"
    }

    fn unproject(&self, px: f64, py: f64, zoom: u32) -> LatLon {
        let scale = world_scale(zoom);
        let lon = px / scale * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * py / scale)).sinh().atan().to_degrees();
        LatLon::new(lat, lon)
    }

    fn project(&self, lat: f64, lon: f64, zoom: u32) -> (f64, f64) {
        let scale = world_scale(zoom);
        let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = (lon + 180.0) / 360.0 * scale;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * scale;
        (x, y)
    }

    fn is_separable(&self) -> bool {
        true
    }
}
