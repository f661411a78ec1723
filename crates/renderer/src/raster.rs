//! Tile rasterization: sample a grid slice at every pixel of a tile.
//!
//! Two paths produce identical bytes:
//! - **generic**: unproject every pixel and locate its neighbors.
//! - **separable**: for projections where latitude depends only on the pixel
//!   row and longitude only on the pixel column, unproject and locate once
//!   per row and once per column, then combine.
//!
//! A pixel is transparent when its position lies outside the domain bbox,
//! when interpolation yields no value, or when the value is not finite.

use rayon::prelude::*;
use std::time::Instant;
use tracing::debug;

use coverage_common::{CoverageError, TileRequest};
use grid_processor::{GridDomain, GridSlice, InterpolationMethod, Neighbors, ValueExtent};
use projection::MapProjection;

use crate::palette::Palette;
use crate::png::encode_png;

const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// A rendered RGBA tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl TileImage {
    /// Fully transparent image.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, CoverageError> {
        if pixels.len() != width as usize * height as usize * 4 {
            return Err(CoverageError::EncodeError(format!(
                "{} bytes do not make a {}x{} RGBA image",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// RGBA of pixel (`x`, `y`), `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.pixels[i..i + 4]);
        Some(rgba)
    }

    pub fn is_fully_transparent(&self) -> bool {
        self.pixels.chunks_exact(4).all(|p| p[3] == 0)
    }

    pub fn to_png(&self) -> Result<Vec<u8>, CoverageError> {
        encode_png(&self.pixels, self.width as usize, self.height as usize)
    }
}

/// One horizontal slice of a parameter together with its domain and the
/// extent mapped onto the palette.
#[derive(Debug, Clone, Copy)]
pub struct GridSource<'a> {
    pub domain: &'a GridDomain,
    pub slice: GridSlice<'a>,
    /// `None` when the range holds no usable value; such tiles are transparent.
    pub extent: Option<ValueExtent>,
}

/// Strategies selected for a render.
#[derive(Clone, Copy)]
pub struct RenderStyle<'a> {
    pub projection: &'a dyn MapProjection,
    pub palette: &'a Palette,
    pub interpolation: InterpolationMethod,
}

/// Which rasterization path to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterPath {
    /// Separable when the projection allows it, generic otherwise.
    Auto,
    Generic,
    Separable,
}

impl RasterPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            RasterPath::Auto => "auto",
            RasterPath::Generic => "generic",
            RasterPath::Separable => "separable",
        }
    }
}

/// Render one tile, picking the fastest path the projection supports.
pub fn render_tile(source: &GridSource<'_>, style: &RenderStyle<'_>, req: &TileRequest) -> TileImage {
    render_tile_with(source, style, req, RasterPath::Auto)
}

/// Render one tile along an explicit path. Requesting the separable path
/// for a non-separable projection falls back to the generic path.
pub fn render_tile_with(
    source: &GridSource<'_>,
    style: &RenderStyle<'_>,
    req: &TileRequest,
    path: RasterPath,
) -> TileImage {
    let start = Instant::now();
    let path = match path {
        RasterPath::Auto | RasterPath::Separable if style.projection.is_separable() => RasterPath::Separable,
        _ => RasterPath::Generic,
    };

    let image = match source.extent {
        // an empty tile has no rows to split across workers
        _ if req.size == 0 => TileImage::transparent(0, 0),
        None => TileImage::transparent(req.size, req.size),
        Some(extent) => match path {
            RasterPath::Separable => render_separable(source, style, req, &extent),
            _ => render_generic(source, style, req, &extent),
        },
    };

    let elapsed = start.elapsed();
    metrics::counter!("tiles_rendered_total", "path" => path.as_str()).increment(1);
    metrics::histogram!("tile_render_duration_ms").record(elapsed.as_secs_f64() * 1000.0);
    debug!(
        zoom = req.zoom,
        origin_x = req.origin_x,
        origin_y = req.origin_y,
        projection = style.projection.name(),
        interpolation = %style.interpolation,
        path = path.as_str(),
        elapsed_us = elapsed.as_micros() as u64,
        "Rendered tile"
    );
    image
}

#[inline]
fn paint(out: &mut [u8], value: Option<f64>, palette: &Palette, extent: &ValueExtent) {
    let rgba = value
        .and_then(|v| palette.color_for(v, extent))
        .map(|c| c.to_rgba())
        .unwrap_or(TRANSPARENT);
    out.copy_from_slice(&rgba);
}

fn render_generic(
    source: &GridSource<'_>,
    style: &RenderStyle<'_>,
    req: &TileRequest,
    extent: &ValueExtent,
) -> TileImage {
    let size = req.size as usize;
    let domain = source.domain;
    let mut image = TileImage::transparent(req.size, req.size);

    image
        .pixels
        .par_chunks_mut(size * 4)
        .enumerate()
        .for_each(|(row, line)| {
            let py = req.origin_y + row as f64;
            for (col, out) in line.chunks_exact_mut(4).enumerate() {
                let px = req.origin_x + col as f64;
                let ll = style.projection.unproject(px, py, req.zoom);
                let Some(lat_n) = domain.locate_lat(ll.lat) else {
                    continue;
                };
                let Some((lon, lon_n)) = domain.locate_lon(ll.lon) else {
                    continue;
                };
                let value = style.interpolation.interpolate(
                    &source.slice,
                    lon,
                    ll.lat,
                    domain.lon(),
                    domain.lat(),
                    lon_n,
                    lat_n,
                );
                paint(out, value, style.palette, extent);
            }
        });

    image
}

fn render_separable(
    source: &GridSource<'_>,
    style: &RenderStyle<'_>,
    req: &TileRequest,
    extent: &ValueExtent,
) -> TileImage {
    let size = req.size as usize;
    let domain = source.domain;

    // Per-row latitude and neighbors, per-column wrapped longitude and neighbors.
    let rows: Vec<(f64, Option<Neighbors>)> = (0..size)
        .map(|row| {
            let lat = style
                .projection
                .unproject(req.origin_x, req.origin_y + row as f64, req.zoom)
                .lat;
            (lat, domain.locate_lat(lat))
        })
        .collect();
    let cols: Vec<Option<(f64, Neighbors)>> = (0..size)
        .map(|col| {
            let lon = style
                .projection
                .unproject(req.origin_x + col as f64, req.origin_y, req.zoom)
                .lon;
            domain.locate_lon(lon)
        })
        .collect();

    let mut image = TileImage::transparent(req.size, req.size);
    image
        .pixels
        .par_chunks_mut(size * 4)
        .zip(rows.par_iter())
        .for_each(|(line, &(lat, lat_n))| {
            let Some(lat_n) = lat_n else {
                return;
            };
            for (out, col) in line.chunks_exact_mut(4).zip(&cols) {
                let Some((lon, lon_n)) = *col else {
                    continue;
                };
                let value = style.interpolation.interpolate(
                    &source.slice,
                    lon,
                    lat,
                    domain.lon(),
                    domain.lat(),
                    lon_n,
                    lat_n,
                );
                paint(out, value, style.palette, extent);
            }
        });

    image
}
