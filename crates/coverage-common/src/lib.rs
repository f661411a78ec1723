//! Common types shared across the coverage tile crates.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod tile;

pub use bbox::BoundingBox;
pub use crs::Crs;
pub use error::{CoverageError, CoverageResult};
pub use tile::{TileCoord, TileRequest, DEFAULT_TILE_SIZE};
