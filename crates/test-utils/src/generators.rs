//! Synthetic axes, domains and ranges.
//!
//! These generators create predictable, verifiable coverages that can be
//! used across the test suite.

use coverage_common::crs::CRS84_URI;
use coverage_common::BoundingBox;
use grid_processor::{GridDomain, ParameterRange};

/// An ascending axis `start, start + step, ...` with `n` values.
///
/// # Example
///
/// ```
/// use test_utils::axis;
///
/// assert_eq!(axis(-10.0, 10.0, 4), vec![-10.0, 0.0, 10.0, 20.0]);
/// ```
pub fn axis(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// Row-major `ny x nx` values where each cell is `col * 1000 + row`.
///
/// This makes it easy to verify that a sampled value came from the
/// expected cell.
///
/// # Example
///
/// ```
/// use test_utils::create_index_values;
///
/// let v = create_index_values(10, 5);
/// assert_eq!(v.len(), 50);
/// assert_eq!(v[1], Some(1000.0)); // col=1, row=0
/// assert_eq!(v[10], Some(1.0));   // col=0, row=1
/// ```
pub fn create_index_values(nx: usize, ny: usize) -> Vec<Option<f64>> {
    let mut data = Vec::with_capacity(nx * ny);
    for row in 0..ny {
        for col in 0..nx {
            data.push(Some((col * 1000 + row) as f64));
        }
    }
    data
}

/// Sea-surface-temperature-like values in degrees Celsius.
///
/// Warm (about 30C) at the equator, cooling towards the poles, with a small
/// zonal ripple so neighboring columns differ.
pub fn create_sst_values(lon: &[f64], lat: &[f64]) -> Vec<Option<f64>> {
    let mut data = Vec::with_capacity(lon.len() * lat.len());
    for &y in lat {
        for &x in lon {
            let base = 30.0 * y.to_radians().cos().powi(2) - 2.0;
            data.push(Some(base + 0.5 * (x.to_radians() * 3.0).sin()));
        }
    }
    data
}

/// Replace every `every`-th value with a missing value, starting at index 0.
pub fn punch_holes(values: &mut [Option<f64>], every: usize) {
    for v in values.iter_mut().step_by(every.max(1)) {
        *v = None;
    }
}

/// A global CRS84 domain with cell centres every `step` degrees.
///
/// The longitude axis starts at `-180 + step / 2` and the bbox covers the
/// full cells, so the discontinuity sits at -180.
pub fn create_global_domain(step: f64) -> GridDomain {
    let nx = (360.0 / step).round() as usize;
    let ny = (180.0 / step).round() as usize;
    let lon = axis(-180.0 + step / 2.0, step, nx);
    let lat = axis(-90.0 + step / 2.0, step, ny);
    GridDomain::new(
        CRS84_URI,
        lon,
        lat,
        Some(BoundingBox::new(-180.0, -90.0, 180.0, 90.0)),
    )
    .expect("global domain is valid")
}

/// A regional domain over `bbox` with `nx x ny` points spanning it edge to edge.
pub fn create_regional_domain(bbox: BoundingBox, nx: usize, ny: usize) -> GridDomain {
    let dx = bbox.width() / (nx.max(2) - 1) as f64;
    let dy = bbox.height() / (ny.max(2) - 1) as f64;
    let lon = axis(bbox.min_lon, dx, nx);
    let lat = axis(bbox.min_lat, dy, ny);
    GridDomain::new(CRS84_URI, lon, lat, Some(bbox)).expect("regional domain is valid")
}

/// An SST-like range over `domain` (single time and vertical step).
pub fn create_sst_range(domain: &GridDomain) -> ParameterRange {
    let values = create_sst_values(domain.lon(), domain.lat());
    ParameterRange::new(domain, values).expect("range matches domain")
}
