//! Tile addressing in pixel space.

use serde::{Deserialize, Serialize};

/// Edge length in pixels of a standard slippy-map tile.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// A tile coordinate (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    pub fn cache_key(&self) -> String {
        format!("{}/{}/{}", self.z, self.x, self.y)
    }

    /// Pixel-space request for this tile at the given tile size.
    pub fn request(&self, tile_size: u32) -> TileRequest {
        TileRequest {
            origin_x: self.x as f64 * tile_size as f64,
            origin_y: self.y as f64 * tile_size as f64,
            size: tile_size,
            zoom: self.z,
        }
    }

    /// All tiles of a `columns x rows` matrix at zoom `z`, row-major.
    pub fn matrix(z: u32, columns: u32, rows: u32) -> Vec<TileCoord> {
        (0..rows)
            .flat_map(|y| (0..columns).map(move |x| TileCoord::new(z, x, y)))
            .collect()
    }
}

/// One tile render request: the pixel origin of the tile's top-left corner
/// in world pixel space, the tile edge length and the zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileRequest {
    pub origin_x: f64,
    pub origin_y: f64,
    pub size: u32,
    pub zoom: u32,
}

impl TileRequest {
    pub fn pixel_count(&self) -> usize {
        self.size as usize * self.size as usize
    }
}
