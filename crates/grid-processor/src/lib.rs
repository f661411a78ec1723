//! Grid sampling engine for rectilinear longitude/latitude coverages.
//!
//! This crate holds the data side of tile rendering:
//!
//! - **Domain**: ascending lon/lat axes, bbox and the longitude discontinuity
//! - **Range**: flattened `(time, vertical, y, x)` values with cached extents
//! - **Locate**: binary search for the bracketing axis indices of a coordinate
//! - **Interpolation**: nearest-neighbor and inverse-distance-weighted sampling
//! - **Extent**: global and field-of-view palette extents with sentinel masking
//!
//! # Architecture
//!
//! ```text
//! pixel (lon, lat)
//!      │
//!      ▼
//! GridDomain::locate_lat / locate_lon
//!      │
//!      ├─► outside bbox: no value
//!      │
//!      └─► wrap lon, indices_of_nearest on each axis
//!               │
//!               ▼
//!          InterpolationMethod::interpolate(GridSlice, neighbors)
//!               │
//!               ▼
//!          Option<f64> to the renderer
//! ```
//!
//! # Example
//!
//! ```
//! use grid_processor::{GridDomain, InterpolationMethod, ParameterRange};
//! use coverage_common::crs::CRS84_URI;
//!
//! let domain = GridDomain::new(CRS84_URI, vec![0.0, 10.0], vec![0.0, 10.0], None).unwrap();
//! let range = ParameterRange::new(&domain, vec![Some(1.0), Some(2.0), Some(3.0), None]).unwrap();
//! let slice = range.slice(0, 0).unwrap();
//!
//! let lat = domain.locate_lat(2.0).unwrap();
//! let (lon, lon_n) = domain.locate_lon(9.0).unwrap();
//! let v = InterpolationMethod::NearestNeighbor
//!     .interpolate(&slice, lon, 2.0, domain.lon(), domain.lat(), lon_n, lat);
//! assert_eq!(v, Some(2.0));
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod extent;
pub mod interpolation;
pub mod locate;
pub mod range;
pub mod wrap;

// Re-export commonly used types at crate root
pub use config::GridProcessorConfig;
pub use domain::GridDomain;
pub use error::{CoverageError, Result};
pub use extent::{
    global_extent, horizontal_subset, viewport_extent, HorizontalSubset, PaletteExtentMode,
    ValueMask,
};
pub use interpolation::InterpolationMethod;
pub use locate::{index_of_nearest, indices_of_nearest, Neighbors};
pub use range::{GridSlice, ParameterRange, ValueExtent};
pub use wrap::{wrap_longitude, wrap_num};
