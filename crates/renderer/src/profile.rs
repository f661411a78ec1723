//! Point profile markers.
//!
//! A profile is a vertical column of values at one position. Each profile
//! becomes a small filled circle colored by its value at a chosen vertical
//! index, outlined with a darker stroke.

use image::{ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut};
use tracing::debug;

use coverage_common::{CoverageError, TileRequest};
use grid_processor::{ValueExtent, ValueMask};
use projection::MapProjection;

use crate::palette::{Palette, Rgb};
use crate::raster::TileImage;

/// Marker radius in pixels.
pub const MARKER_RADIUS: i32 = 2;

/// Values of one parameter along a single profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub lon: f64,
    pub lat: f64,
    /// Observation time as given by the source document.
    pub time: Option<String>,
    pub vertical: Vec<f64>,
    pub values: Vec<Option<f64>>,
    /// Extent given by the source, if any.
    pub extent: Option<ValueExtent>,
}

impl Profile {
    /// Given extent, or the extent of the values.
    pub fn value_extent(&self) -> Option<ValueExtent> {
        self.extent
            .or_else(|| ValueExtent::of(&self.values, &ValueMask::none()))
    }

    pub fn value_at(&self, vertical_index: usize) -> Option<f64> {
        self.values
            .get(vertical_index)
            .copied()
            .flatten()
            .filter(|v| v.is_finite())
    }
}

/// Extent across all profiles: min of minimums, max of maximums.
pub fn profiles_extent(profiles: &[Profile]) -> Option<ValueExtent> {
    profiles
        .iter()
        .fold(None, |acc, p| ValueExtent::union(acc, p.value_extent()))
}

/// A colored marker ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileMarker {
    pub lon: f64,
    pub lat: f64,
    pub value: f64,
    pub fill: Rgb,
    pub stroke: Rgb,
    pub popup: String,
}

/// Markers for every profile with a value at `vertical_index`.
pub fn build_markers(
    profiles: &[Profile],
    vertical_index: usize,
    palette: &Palette,
    extent: &ValueExtent,
) -> Vec<ProfileMarker> {
    let markers: Vec<ProfileMarker> = profiles
        .iter()
        .filter_map(|p| {
            let value = p.value_at(vertical_index)?;
            let fill = palette.color_for(value, extent)?;
            Some(ProfileMarker {
                lon: p.lon,
                lat: p.lat,
                value,
                fill,
                stroke: fill.stroke(),
                popup: popup_text(p.time.as_deref(), p.vertical.get(vertical_index).copied(), value),
            })
        })
        .collect();
    debug!(
        profiles = profiles.len(),
        markers = markers.len(),
        vertical_index,
        "Built profile markers"
    );
    markers
}

/// `time: .., vertical: .., value: ..`
pub fn popup_text(time: Option<&str>, vertical: Option<f64>, value: f64) -> String {
    let vertical = vertical.map(|z| z.to_string());
    format!(
        "time: {}, vertical: {}, value: {}",
        time.unwrap_or("-"),
        vertical.as_deref().unwrap_or("-"),
        value
    )
}

/// Draw the markers that touch the tile onto a transparent image.
///
/// Markers near the tile edge of a wrapping projection are also drawn at
/// their position one world width to either side.
pub fn draw_markers(
    markers: &[ProfileMarker],
    projection: &dyn MapProjection,
    req: &TileRequest,
) -> Result<TileImage, CoverageError> {
    let size = req.size;
    let mut canvas: RgbaImage = ImageBuffer::new(size, size);
    let reach = f64::from(MARKER_RADIUS) + 1.0;
    let lo_x = req.origin_x - reach;
    let hi_x = req.origin_x + f64::from(size) + reach;
    let lo_y = req.origin_y - reach;
    let hi_y = req.origin_y + f64::from(size) + reach;

    let mut drawn = 0usize;
    for m in markers {
        let (px, py) = projection.project(m.lat, m.lon, req.zoom);
        if py < lo_y || py > hi_y {
            continue;
        }
        let world = (projection.project(m.lat, m.lon + 360.0, req.zoom).0 - px).abs();
        let copies: &[f64] = if world > 1.0 { &[-1.0, 0.0, 1.0] } else { &[0.0] };
        for k in copies {
            let x = px + k * world;
            if x < lo_x || x > hi_x {
                continue;
            }
            let center = (
                (x - req.origin_x).round() as i32,
                (py - req.origin_y).round() as i32,
            );
            let [fr, fg, fb, fa] = m.fill.to_rgba();
            let [sr, sg, sb, sa] = m.stroke.to_rgba();
            draw_filled_circle_mut(&mut canvas, center, MARKER_RADIUS, Rgba([fr, fg, fb, fa]));
            draw_hollow_circle_mut(&mut canvas, center, MARKER_RADIUS, Rgba([sr, sg, sb, sa]));
            drawn += 1;
        }
    }

    debug!(zoom = req.zoom, drawn, "Drew profile markers");
    TileImage::from_rgba(size, size, canvas.into_raw())
}
