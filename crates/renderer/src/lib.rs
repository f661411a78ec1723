//! Tile rendering for gridded coverages and point profiles.
//!
//! - [`raster`]: per-pixel resampling of a grid slice into an RGBA tile,
//!   with a generic path and a separable fast path
//! - [`palette`]: 256-entry color palettes, legends
//! - [`profile`]: colored point markers
//! - [`tile_cache`]: LRU cache of rendered tiles
//! - [`png`]: PNG encoding

pub mod palette;
pub mod png;
pub mod profile;
pub mod raster;
pub mod tile_cache;

pub use palette::{palette_index, Legend, Palette, PaletteRegistry, Rgb, DEFAULT_PALETTE};
pub use profile::{build_markers, draw_markers, profiles_extent, Profile, ProfileMarker};
pub use raster::{render_tile, render_tile_with, GridSource, RasterPath, RenderStyle, TileImage};
pub use tile_cache::{TileCache, TileCacheStats};
