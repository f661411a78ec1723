//! Rectilinear longitude/latitude grid domains.

use chrono::{DateTime, Utc};
use coverage_common::{BoundingBox, CoverageError, Crs};
use tracing::debug;

use crate::error::Result;
use crate::locate::{indices_of_nearest, Neighbors};
use crate::wrap::wrap_longitude;

/// The geographic grid a parameter is defined over.
///
/// Immutable once built. Parameter ranges of the same coverage share one
/// domain behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDomain {
    crs: Crs,
    lon: Vec<f64>,
    lat: Vec<f64>,
    bbox: BoundingBox,
    lon_discontinuity: f64,
    time: Vec<DateTime<Utc>>,
    vertical: Vec<f64>,
}

impl GridDomain {
    /// Build a domain from its horizontal axes.
    ///
    /// `crs` must identify CRS84. When `bbox` is `None` it is derived from the
    /// first and last axis values. The longitude discontinuity is the west
    /// edge of the bbox.
    pub fn new(crs: &str, lon: Vec<f64>, lat: Vec<f64>, bbox: Option<BoundingBox>) -> Result<Self> {
        let crs = Crs::parse(crs)?;
        check_axis("x", &lon)?;
        check_axis("y", &lat)?;

        let bbox = bbox.unwrap_or_else(|| {
            BoundingBox::new(lon[0], lat[0], lon[lon.len() - 1], lat[lat.len() - 1])
        });
        if bbox.straddles_antimeridian() {
            return Err(CoverageError::UnsupportedDiscontinuity {
                lon_min: bbox.min_lon,
                lon_max: bbox.max_lon,
            });
        }
        if bbox.min_lat > bbox.max_lat {
            return Err(CoverageError::invalid_domain(format!(
                "bbox south {} lies north of north {}",
                bbox.min_lat, bbox.max_lat
            )));
        }

        debug!(
            nx = lon.len(),
            ny = lat.len(),
            lon_discontinuity = bbox.min_lon,
            "Built grid domain"
        );

        Ok(Self {
            crs,
            lon_discontinuity: bbox.min_lon,
            lon,
            lat,
            bbox,
            time: Vec::new(),
            vertical: Vec::new(),
        })
    }

    /// Attach a time axis.
    pub fn with_time(mut self, time: Vec<DateTime<Utc>>) -> Self {
        self.time = time;
        self
    }

    /// Attach a vertical axis.
    pub fn with_vertical(mut self, vertical: Vec<f64>) -> Self {
        self.vertical = vertical;
        self
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// West edge of the `[d, d + 360)` interval query longitudes are wrapped into.
    pub fn lon_discontinuity(&self) -> f64 {
        self.lon_discontinuity
    }

    pub fn time(&self) -> &[DateTime<Utc>] {
        &self.time
    }

    pub fn vertical(&self) -> &[f64] {
        &self.vertical
    }

    pub fn nx(&self) -> usize {
        self.lon.len()
    }

    pub fn ny(&self) -> usize {
        self.lat.len()
    }

    /// Length of the time dimension, 1 when the domain has no time axis.
    pub fn nt(&self) -> usize {
        self.time.len().max(1)
    }

    /// Length of the vertical dimension, 1 when the domain has no vertical axis.
    pub fn nz(&self) -> usize {
        self.vertical.len().max(1)
    }

    /// Logical range shape `(time, vertical, y, x)`.
    pub fn shape(&self) -> [usize; 4] {
        [self.nt(), self.nz(), self.ny(), self.nx()]
    }

    pub fn value_count(&self) -> usize {
        self.shape().iter().product()
    }

    /// Wrap a query longitude into this domain's longitude interval.
    #[inline]
    pub fn wrap_lon(&self, lon: f64) -> f64 {
        wrap_longitude(lon, self.lon_discontinuity)
    }

    /// Latitude neighbors, or `None` when `lat` lies outside the bbox.
    #[inline]
    pub fn locate_lat(&self, lat: f64) -> Option<Neighbors> {
        if !self.bbox.contains_lat(lat) {
            return None;
        }
        Some(indices_of_nearest(&self.lat, lat))
    }

    /// Wrapped longitude and its neighbors, or `None` when the wrapped
    /// longitude lies outside the bbox.
    #[inline]
    pub fn locate_lon(&self, lon: f64) -> Option<(f64, Neighbors)> {
        let lon = self.wrap_lon(lon);
        if !self.bbox.contains_lon(lon) {
            return None;
        }
        Some((lon, indices_of_nearest(&self.lon, lon)))
    }
}

fn check_axis(name: &str, axis: &[f64]) -> Result<()> {
    if axis.is_empty() {
        return Err(CoverageError::invalid_domain(format!("{} axis is empty", name)));
    }
    if let Some(pos) = axis.iter().position(|v| !v.is_finite()) {
        return Err(CoverageError::invalid_domain(format!(
            "{} axis value at {} is not finite",
            name, pos
        )));
    }
    if let Some(pos) = axis.windows(2).position(|w| w[1] <= w[0]) {
        return Err(CoverageError::invalid_domain(format!(
            "{} axis is not strictly ascending at index {}",
            name,
            pos + 1
        )));
    }
    Ok(())
}
