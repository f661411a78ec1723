//! Lambert Conformal Conic projection as a display projection.
//!
//! Maps a cone tangent or secant to the sphere onto the pixel plane. The
//! projection origin (lat0, lon0) sits at the center of the pixel world,
//! and one pixel covers the same ground distance as a Web Mercator pixel at
//! the equator for the same zoom.
//!
//! The projection parameters include:
//! - Origin latitude (lat0) and central meridian (lon0)
//! - Standard parallel(s): latin1 and latin2 (can be equal for tangent cone)
//!
//! Latitude depends on both pixel axes, so tiles in this projection always go
//! through the per-pixel rasterizer path.

use std::f64::consts::PI;

use crate::{world_scale, LatLon, MapProjection};

/// Mean earth radius (meters)
const EARTH_RADIUS: f64 = 6_371_229.0;

#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Central meridian in radians
    pub lon0: f64,
    /// Origin latitude in radians
    pub lat0: f64,
    /// First standard parallel in radians
    pub latin1: f64,
    /// Second standard parallel in radians
    pub latin2: f64,
    /// Cone constant (n)
    n: f64,
    /// F constant
    f: f64,
    /// Rho at the origin latitude
    rho0: f64,
}

impl LambertConformal {
    /// Build from degrees.
    pub fn new(lat0_deg: f64, lon0_deg: f64, latin1_deg: f64, latin2_deg: f64) -> Self {
        let lat0 = lat0_deg.to_radians();
        let lon0 = lon0_deg.to_radians();
        let latin1 = latin1_deg.to_radians();
        let latin2 = latin2_deg.to_radians();

        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone
            latin1.sin()
        } else {
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;
        let rho0 = EARTH_RADIUS * f / (PI / 4.0 + lat0 / 2.0).tan().powf(n);

        Self {
            lon0,
            lat0,
            latin1,
            latin2,
            n,
            f,
            rho0,
        }
    }

    /// Tangent cone at 38.5N centred on 97.5W.
    pub fn north_america() -> Self {
        Self::new(38.5, -97.5, 38.5, 38.5)
    }

    /// Meters per pixel at `zoom`.
    fn resolution(zoom: u32) -> f64 {
        2.0 * PI * EARTH_RADIUS / world_scale(zoom)
    }

    /// Geographic (degrees) -> projected meters relative to the origin.
    pub fn forward(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let lat = lat_deg.to_radians();

        let mut dlon = lon_deg.to_radians() - self.lon0;
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }

        let rho = EARTH_RADIUS * self.f / (PI / 4.0 + lat / 2.0).tan().powf(self.n);
        let theta = self.n * dlon;
        (rho * theta.sin(), self.rho0 - rho * theta.cos())
    }

    /// Projected meters relative to the origin -> geographic (degrees).
    pub fn inverse(&self, x: f64, y: f64) -> LatLon {
        let sign = self.n.signum();
        let dy = self.rho0 - y;
        let rho = sign * (x * x + dy * dy).sqrt();
        let theta = (sign * x).atan2(sign * dy);

        let lat = if rho == 0.0 {
            sign * PI / 2.0
        } else {
            2.0 * (EARTH_RADIUS * self.f / rho).powf(1.0 / self.n).atan() - PI / 2.0
        };
        let lon = self.lon0 + theta / self.n;

        LatLon::new(lat.to_degrees(), lon.to_degrees())
    }
}

impl MapProjection for LambertConformal {
    fn name(&self) -> &'static str {
        "lambert"
    }

    fn unproject(&self, px: f64, py: f64, zoom: u32) -> LatLon {
        let half = world_scale(zoom) / 2.0;
        let res = Self::resolution(zoom);
        self.inverse((px - half) * res, (half - py) * res)
    }

    fn project(&self, lat: f64, lon: f64, zoom: u32) -> (f64, f64) {
        let half = world_scale(zoom) / 2.0;
        let res = Self::resolution(zoom);
        let (x, y) = self.forward(lat, lon);
        (x / res + half, half - y / res)
    }

    fn is_separable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_at_world_center() {
        let proj = LambertConformal::north_america();
        let (x, y) = proj.project(38.5, -97.5, 3);
        assert!((x - 1024.0).abs() < 1e-6, "x should be centered, got {}", x);
        assert!((y - 1024.0).abs() < 1e-6, "y should be centered, got {}", y);
    }

    #[test]
    fn test_roundtrip() {
        let proj = LambertConformal::north_america();

        // Kansas City, MO
        let (px, py) = proj.project(39.0, -94.5, 5);
        let back = proj.unproject(px, py, 5);

        assert!((back.lat - 39.0).abs() < 1e-6, "lat roundtrip failed: {}", back.lat);
        assert!((back.lon + 94.5).abs() < 1e-6, "lon roundtrip failed: {}", back.lon);
    }

    #[test]
    fn test_secant_cone_roundtrip() {
        let proj = LambertConformal::new(40.0, 10.0, 35.0, 65.0);
        let (x, y) = proj.forward(55.0, 25.0);
        let back = proj.inverse(x, y);
        assert!((back.lat - 55.0).abs() < 1e-6);
        assert!((back.lon - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_not_separable() {
        let proj = LambertConformal::north_america();
        let a = proj.unproject(300.0, 400.0, 2);
        let b = proj.unproject(512.0, 400.0, 2);
        assert!((a.lat - b.lat).abs() > 1e-3);
    }
}
