//! Interpolation strategies for sampling a grid slice at a geographic point.
//!
//! Both strategies work from the bracketing neighbor indices produced by
//! [`indices_of_nearest`](crate::locate::indices_of_nearest) and return
//! `None` when no value can be produced.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use coverage_common::CoverageError;

use crate::locate::{closer_index, Neighbors};
use crate::range::GridSlice;

/// IDW weight exponent.
const IDW_EXPONENT: i32 = 2;

/// Selectable interpolation strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterpolationMethod {
    /// Value of the nearest cell, chosen per axis.
    #[default]
    #[serde(rename = "nearestNeighbor")]
    NearestNeighbor,
    /// Inverse-distance-weighted mean of the up to four bracketing cells.
    #[serde(rename = "idw")]
    InverseDistanceWeighted,
}

impl InterpolationMethod {
    pub const ALL: [InterpolationMethod; 2] = [
        InterpolationMethod::NearestNeighbor,
        InterpolationMethod::InverseDistanceWeighted,
    ];

    /// Registry key.
    pub fn key(&self) -> &'static str {
        match self {
            Self::NearestNeighbor => "nearestNeighbor",
            Self::InverseDistanceWeighted => "idw",
        }
    }

    /// Display title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::NearestNeighbor => "None (nearest neighbor)",
            Self::InverseDistanceWeighted => "Inverse Distance Weighting",
        }
    }

    /// Look up a method by registry key.
    pub fn from_key(key: &str) -> Result<Self, CoverageError> {
        Self::ALL
            .into_iter()
            .find(|m| m.key().eq_ignore_ascii_case(key))
            .ok_or_else(|| CoverageError::UnknownInterpolation(key.to_string()))
    }

    /// Sample `slice` at (`lon`, `lat`).
    #[inline]
    #[allow(clippy::too_many_arguments)]
    pub fn interpolate(
        &self,
        slice: &GridSlice<'_>,
        lon: f64,
        lat: f64,
        lon_axis: &[f64],
        lat_axis: &[f64],
        lon_neighbors: Neighbors,
        lat_neighbors: Neighbors,
    ) -> Option<f64> {
        match self {
            Self::NearestNeighbor => {
                nearest_neighbor(slice, lon, lat, lon_axis, lat_axis, lon_neighbors, lat_neighbors)
            }
            Self::InverseDistanceWeighted => inverse_distance_weighted(
                slice,
                lon,
                lat,
                lon_axis,
                lat_axis,
                lon_neighbors,
                lat_neighbors,
            ),
        }
    }
}

impl FromStr for InterpolationMethod {
    type Err = CoverageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s)
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Nearest-neighbor sampling.
///
/// Each axis independently picks the closer of its two bracketing indices by
/// absolute coordinate difference. Equal distances pick the upper index.
#[inline]
pub fn nearest_neighbor(
    slice: &GridSlice<'_>,
    lon: f64,
    lat: f64,
    lon_axis: &[f64],
    lat_axis: &[f64],
    lon_neighbors: Neighbors,
    lat_neighbors: Neighbors,
) -> Option<f64> {
    let ix = closer_index(lon_axis, lon, lon_neighbors)?;
    let iy = closer_index(lat_axis, lat, lat_neighbors)?;
    slice.get(iy, ix)
}

/// Inverse-distance-weighted sampling with exponent 2.
///
/// Candidates are the cross product of the valid neighbor indices. Missing
/// cells are skipped. A present cell at zero great-circle distance is
/// returned as is; a missing one at zero distance is ignored.
pub fn inverse_distance_weighted(
    slice: &GridSlice<'_>,
    lon: f64,
    lat: f64,
    lon_axis: &[f64],
    lat_axis: &[f64],
    lon_neighbors: Neighbors,
    lat_neighbors: Neighbors,
) -> Option<f64> {
    let mut num = 0.0;
    let mut denom = 0.0;

    for ix in lon_neighbors.valid(lon_axis.len()) {
        for iy in lat_neighbors.valid(lat_axis.len()) {
            let Some(value) = slice.get(iy, ix) else {
                continue;
            };
            let d = central_angle(lat, lon, lat_axis[iy], lon_axis[ix]);
            if d == 0.0 {
                return Some(value);
            }
            let w = 1.0 / d.powi(IDW_EXPONENT);
            num += value * w;
            denom += w;
        }
    }

    (denom > 0.0).then(|| num / denom)
}

/// Haversine central angle in radians between two points given in degrees.
#[inline]
pub fn central_angle(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}
