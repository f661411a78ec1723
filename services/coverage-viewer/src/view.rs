//! The map view: active strategies and the layer stack.

use tracing::{debug, info};

use coverage_common::{BoundingBox, CoverageResult, TileCoord};
use grid_processor::{InterpolationMethod, PaletteExtentMode};
use projection::{MapProjection, ProjectionKind};
use renderer::{Legend, PaletteRegistry, RenderStyle, TileImage};

use crate::config::ViewerConfig;
use crate::layer::{RenderableLayer, ViewState};

pub struct MapView {
    palettes: PaletteRegistry,
    palette: String,
    interpolation: InterpolationMethod,
    projection_kind: ProjectionKind,
    projection: Box<dyn MapProjection>,
    state: ViewState,
    tile_size: u32,
    layers: Vec<Box<dyn RenderableLayer>>,
}

impl MapView {
    /// View showing the whole world with the configured strategies.
    pub fn new(config: &ViewerConfig, palettes: PaletteRegistry) -> CoverageResult<Self> {
        palettes.get(&config.palette)?;
        Ok(Self {
            palettes,
            palette: config.palette.clone(),
            interpolation: config.grid.interpolation,
            projection_kind: config.projection,
            projection: config.projection.build(),
            state: ViewState {
                palette_range: config.palette_range,
                bounds: BoundingBox::new(-180.0, -90.0, 180.0, 90.0),
            },
            tile_size: config.tile_size,
            layers: Vec::new(),
        })
    }

    pub fn add_layer(&mut self, mut layer: Box<dyn RenderableLayer>) -> CoverageResult<()> {
        layer.on_add(&self.state)?;
        info!(layer = layer.name(), "Layer added");
        self.layers.push(layer);
        Ok(())
    }

    /// Remove the first layer named `name`.
    pub fn remove_layer(&mut self, name: &str) -> Option<Box<dyn RenderableLayer>> {
        let pos = self.layers.iter().position(|l| l.name() == name)?;
        let mut layer = self.layers.remove(pos);
        layer.on_remove();
        info!(layer = name, "Layer removed");
        Some(layer)
    }

    pub fn layers(&self) -> impl Iterator<Item = &dyn RenderableLayer> {
        self.layers.iter().map(|l| l.as_ref())
    }

    pub fn palette_name(&self) -> &str {
        &self.palette
    }

    /// Select a palette by name. Every layer is redrawn.
    pub fn set_palette(&mut self, name: &str) -> CoverageResult<()> {
        self.palettes.get(name)?;
        self.palette = name.to_string();
        self.redraw();
        Ok(())
    }

    pub fn interpolation(&self) -> InterpolationMethod {
        self.interpolation
    }

    /// Select an interpolation method by registry key. Every layer is redrawn.
    pub fn set_interpolation(&mut self, key: &str) -> CoverageResult<()> {
        self.interpolation = InterpolationMethod::from_key(key)?;
        self.redraw();
        Ok(())
    }

    pub fn projection(&self) -> ProjectionKind {
        self.projection_kind
    }

    pub fn set_projection(&mut self, kind: ProjectionKind) {
        self.projection_kind = kind;
        self.projection = kind.build();
        self.redraw();
    }

    pub fn palette_range(&self) -> PaletteExtentMode {
        self.state.palette_range
    }

    /// Switch between whole-range and visible-area palette extents.
    pub fn set_palette_range(&mut self, mode: PaletteExtentMode) -> CoverageResult<()> {
        self.state.palette_range = mode;
        self.notify_layers()
    }

    pub fn bounds(&self) -> BoundingBox {
        self.state.bounds
    }

    /// Move the visible area.
    pub fn set_bounds(&mut self, bounds: BoundingBox) -> CoverageResult<()> {
        self.state.bounds = bounds;
        self.notify_layers()
    }

    /// Visible area of a tile in the current projection.
    pub fn tile_bounds(&self, coord: TileCoord) -> BoundingBox {
        let req = coord.request(self.tile_size);
        let size = f64::from(req.size);
        let corners = [
            (req.origin_x, req.origin_y),
            (req.origin_x + size, req.origin_y),
            (req.origin_x, req.origin_y + size),
            (req.origin_x + size, req.origin_y + size),
        ];
        let mut bounds = BoundingBox::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for (px, py) in corners {
            let ll = self.projection.unproject(px, py, req.zoom);
            bounds.min_lon = bounds.min_lon.min(ll.lon);
            bounds.max_lon = bounds.max_lon.max(ll.lon);
            bounds.min_lat = bounds.min_lat.min(ll.lat);
            bounds.max_lat = bounds.max_lat.max(ll.lat);
        }
        bounds
    }

    /// Tiles of the whole world at `zoom`.
    pub fn world_tiles(&self, zoom: u32) -> Vec<TileCoord> {
        let (columns, rows) = self.projection.tile_matrix(zoom);
        TileCoord::matrix(zoom, columns, rows)
    }

    /// Composite of every layer's tile, in layer order. A layer with nothing
    /// to draw contributes nothing.
    pub fn render_tile(&self, coord: TileCoord) -> CoverageResult<TileImage> {
        let palette = self.palettes.get(&self.palette)?;
        let style = RenderStyle {
            projection: self.projection.as_ref(),
            palette,
            interpolation: self.interpolation,
        };

        let mut out = TileImage::transparent(self.tile_size, self.tile_size);
        for layer in &self.layers {
            let Some(tile) = layer.render_tile(coord, &style, self.tile_size)? else {
                continue;
            };
            composite(&mut out, &tile);
        }
        debug!(z = coord.z, x = coord.x, y = coord.y, layers = self.layers.len(), "Composited tile");
        Ok(out)
    }

    /// Legends of layers that have a palette extent.
    pub fn legends(&self) -> CoverageResult<Vec<Legend>> {
        let palette = self.palettes.get(&self.palette)?;
        Ok(self.layers.iter().filter_map(|l| l.legend(palette)).collect())
    }

    /// Drop every layer's cached tiles.
    pub fn redraw(&self) {
        for layer in &self.layers {
            layer.invalidate();
        }
    }

    fn notify_layers(&mut self) -> CoverageResult<()> {
        for layer in &mut self.layers {
            layer.on_view_change(&self.state)?;
        }
        Ok(())
    }
}

/// Draw the opaque pixels of `top` over `base`.
fn composite(base: &mut TileImage, top: &TileImage) {
    for (dst, src) in base.pixels_mut().chunks_exact_mut(4).zip(top.pixels().chunks_exact(4)) {
        if src[3] != 0 {
            dst.copy_from_slice(src);
        }
    }
}
