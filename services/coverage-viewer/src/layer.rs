//! Map layers.
//!
//! A [`RenderableLayer`] owns its data and a tile cache. The view calls the
//! lifecycle hooks; layers never reach back into the view.

use std::sync::Arc;
use tracing::{debug, info, warn};

use coverage_common::{BoundingBox, CoverageError, CoverageResult, TileCoord};
use grid_processor::{
    global_extent, viewport_extent, GridDomain, PaletteExtentMode, ParameterRange, ValueExtent, ValueMask,
};
use renderer::{
    build_markers, draw_markers, profiles_extent, render_tile, GridSource, Legend, Palette, Profile, RenderStyle,
    TileCache, TileImage,
};

use crate::document::{CoverageDocument, ParameterInfo, RangeDocument, RangeLoader, RangeValues};
use crate::fetch::{FetchToken, FetchTracker};

/// What a layer needs to know about the map to choose its palette extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub palette_range: PaletteExtentMode,
    /// Visible area in degrees.
    pub bounds: BoundingBox,
}

pub trait RenderableLayer: Send + Sync {
    fn name(&self) -> &str;

    /// Called once when the layer joins a view.
    fn on_add(&mut self, view: &ViewState) -> CoverageResult<()>;

    /// Called when the layer leaves the view. Drops cached tiles.
    fn on_remove(&mut self);

    /// Called after the visible area or the palette range mode changed.
    fn on_view_change(&mut self, view: &ViewState) -> CoverageResult<()>;

    /// Render one tile. `Ok(None)` when the layer has nothing to draw yet.
    fn render_tile(
        &self,
        coord: TileCoord,
        style: &RenderStyle<'_>,
        tile_size: u32,
    ) -> CoverageResult<Option<Arc<TileImage>>>;

    /// Drop cached tiles after anything affecting pixels changed.
    fn invalidate(&self);

    fn palette_extent(&self) -> Option<ValueExtent>;

    fn legend(&self, palette: &Palette) -> Option<Legend>;
}

/// Pending reference to a range stored in a separate document.
#[derive(Debug, Clone)]
pub struct RangeRequest {
    pub token: FetchToken,
    pub loader: RangeLoader,
    pub id: String,
}

impl RangeRequest {
    pub async fn fetch(self) -> (FetchToken, CoverageResult<RangeValues>) {
        let result = self.loader.load(&self.id).await;
        (self.token, result)
    }
}

/// A gridded parameter rendered as color-mapped tiles.
pub struct GridLayer {
    param: String,
    info: ParameterInfo,
    domain: Arc<GridDomain>,
    range: Option<ParameterRange>,
    remote: Option<(RangeLoader, String)>,
    fetches: FetchTracker,
    mask: ValueMask,
    time_index: usize,
    vertical_index: usize,
    view: Option<ViewState>,
    cache: TileCache,
}

impl GridLayer {
    /// Layer for `param` of a grid document. A referenced range is not read
    /// here; see [`GridLayer::range_request`].
    pub fn from_document(
        doc: &CoverageDocument,
        param: &str,
        loader: RangeLoader,
        mask: ValueMask,
        cache_entries: usize,
    ) -> CoverageResult<Self> {
        let domain = Arc::new(doc.grid_domain()?);
        let range_doc = doc
            .range
            .get(param)
            .ok_or_else(|| CoverageError::ParameterNotFound(param.to_string()))?;

        let (range, remote) = match range_doc {
            RangeDocument::Inline(values) => (Some(values.clone().into_range(&domain, mask)?), None),
            RangeDocument::Remote { id } => (None, Some((loader, id.clone()))),
        };

        Ok(Self {
            param: param.to_string(),
            info: doc.parameter_info(param),
            domain,
            range,
            remote,
            fetches: FetchTracker::new(),
            mask,
            time_index: 0,
            vertical_index: 0,
            view: None,
            cache: TileCache::new(cache_entries),
        })
    }

    pub fn domain(&self) -> &GridDomain {
        &self.domain
    }

    pub fn range(&self) -> CoverageResult<&ParameterRange> {
        self.range
            .as_ref()
            .ok_or_else(|| CoverageError::RangeNotLoaded(self.param.clone()))
    }

    pub fn is_loaded(&self) -> bool {
        self.range.is_some()
    }

    pub fn time_index(&self) -> usize {
        self.time_index
    }

    pub fn vertical_index(&self) -> usize {
        self.vertical_index
    }

    /// Start a fetch of the referenced range, superseding any fetch in flight.
    /// `None` when the range is inline.
    pub fn range_request(&self) -> Option<RangeRequest> {
        let (loader, id) = self.remote.as_ref()?;
        Some(RangeRequest {
            token: self.fetches.begin(),
            loader: loader.clone(),
            id: id.clone(),
        })
    }

    /// Install a fetched range. Returns `Ok(false)` when the fetch was
    /// superseded and its values were discarded.
    pub fn apply_range(&mut self, token: FetchToken, values: RangeValues) -> CoverageResult<bool> {
        let Some(values) = self.fetches.complete(token, values) else {
            return Ok(false);
        };
        self.range = Some(values.into_range(&self.domain, self.mask)?);
        info!(param = %self.param, generation = token.generation(), "Range loaded");
        if let Some(view) = self.view {
            self.recompute_extent(&view)?;
        }
        self.cache.invalidate();
        Ok(true)
    }

    /// Fetch and install the referenced range, if any.
    pub async fn ensure_loaded(&mut self) -> CoverageResult<()> {
        let Some(request) = self.range_request() else {
            return Ok(());
        };
        let (token, result) = request.fetch().await;
        self.apply_range(token, result?)?;
        Ok(())
    }

    /// Select the time step. Out-of-range indices are rejected.
    pub fn set_time_index(&mut self, t: usize) -> CoverageResult<()> {
        check_index("time", t, self.domain.nt())?;
        if t != self.time_index {
            self.time_index = t;
            self.refresh()?;
        }
        Ok(())
    }

    /// Select the vertical level. Out-of-range indices are rejected.
    pub fn set_vertical_index(&mut self, z: usize) -> CoverageResult<()> {
        check_index("vertical", z, self.domain.nz())?;
        if z != self.vertical_index {
            self.vertical_index = z;
            self.refresh()?;
        }
        Ok(())
    }

    fn refresh(&mut self) -> CoverageResult<()> {
        if let Some(view) = self.view {
            self.recompute_extent(&view)?;
        }
        self.cache.invalidate();
        Ok(())
    }

    fn recompute_extent(&mut self, view: &ViewState) -> CoverageResult<()> {
        let (t, z) = (self.time_index, self.vertical_index);
        let Some(range) = self.range.as_mut() else {
            return Ok(());
        };
        let extent = match view.palette_range {
            PaletteExtentMode::Global => global_extent(range),
            PaletteExtentMode::Fov => viewport_extent(&self.domain, range, t, z, &view.bounds)?,
        };
        if extent.is_none() {
            if view.palette_range == PaletteExtentMode::Fov {
                warn!(param = %self.param, bounds = ?view.bounds, "No cells in view, keeping palette extent");
                return Ok(());
            }
            warn!(param = %self.param, mode = %view.palette_range, "No values for palette extent");
        }
        range.set_palette_extent(extent);
        metrics::counter!("palette_extent_recomputes_total", "mode" => view.palette_range.as_str()).increment(1);
        debug!(param = %self.param, mode = %view.palette_range, ?extent, "Palette extent updated");
        Ok(())
    }
}

fn check_index(axis: &'static str, index: usize, len: usize) -> CoverageResult<()> {
    if index >= len {
        return Err(CoverageError::IndexOutOfRange { axis, index, len });
    }
    Ok(())
}

impl RenderableLayer for GridLayer {
    fn name(&self) -> &str {
        &self.param
    }

    fn on_add(&mut self, view: &ViewState) -> CoverageResult<()> {
        self.view = Some(*view);
        self.recompute_extent(view)
    }

    fn on_remove(&mut self) {
        self.view = None;
        self.fetches.cancel_all();
        self.cache.invalidate();
    }

    fn on_view_change(&mut self, view: &ViewState) -> CoverageResult<()> {
        let previous = self.view.replace(*view);
        // a pan only matters when the extent follows the view
        let mode_changed = previous.map(|p| p.palette_range) != Some(view.palette_range);
        if mode_changed || view.palette_range == PaletteExtentMode::Fov {
            self.recompute_extent(view)?;
            self.cache.invalidate();
        }
        Ok(())
    }

    fn render_tile(
        &self,
        coord: TileCoord,
        style: &RenderStyle<'_>,
        tile_size: u32,
    ) -> CoverageResult<Option<Arc<TileImage>>> {
        let Some(range) = self.range.as_ref() else {
            debug!(param = %self.param, "Range still loading, skipping tile");
            return Ok(None);
        };
        let tile = self.cache.get_or_render(coord, || {
            let source = GridSource {
                domain: &self.domain,
                slice: range.slice(self.time_index, self.vertical_index)?,
                extent: range.palette_extent(),
            };
            Ok::<_, CoverageError>(render_tile(&source, style, &coord.request(tile_size)))
        })?;
        Ok(Some(tile))
    }

    fn invalidate(&self) {
        self.cache.invalidate();
    }

    fn palette_extent(&self) -> Option<ValueExtent> {
        self.range.as_ref().and_then(ParameterRange::palette_extent)
    }

    fn legend(&self, palette: &Palette) -> Option<Legend> {
        let extent = self.palette_extent()?;
        Some(Legend::new(
            self.info.title_or(&self.param),
            self.info.uom.clone(),
            palette,
            &extent,
        ))
    }
}

/// Point profiles of one parameter drawn as markers.
pub struct ProfileLayer {
    param: String,
    info: ParameterInfo,
    profiles: Vec<Profile>,
    extent: Option<ValueExtent>,
    vertical_index: usize,
    cache: TileCache,
}

impl ProfileLayer {
    /// Collect the profile documents carrying `param`.
    pub fn from_documents(docs: &[CoverageDocument], param: &str, cache_entries: usize) -> Self {
        let profiles: Vec<Profile> = docs.iter().filter_map(|d| d.profile(param)).collect();
        let info = docs
            .iter()
            .find(|d| d.has_parameter(param))
            .map(|d| d.parameter_info(param))
            .unwrap_or_default();
        debug!(param, documents = docs.len(), profiles = profiles.len(), "Collected profiles");
        Self {
            param: param.to_string(),
            info,
            profiles,
            extent: None,
            vertical_index: 0,
            cache: TileCache::new(cache_entries),
        }
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn set_vertical_index(&mut self, z: usize) {
        if z != self.vertical_index {
            self.vertical_index = z;
            self.cache.invalidate();
        }
    }
}

impl RenderableLayer for ProfileLayer {
    fn name(&self) -> &str {
        &self.param
    }

    fn on_add(&mut self, _view: &ViewState) -> CoverageResult<()> {
        self.extent = profiles_extent(&self.profiles);
        Ok(())
    }

    fn on_remove(&mut self) {
        self.cache.invalidate();
    }

    fn on_view_change(&mut self, _view: &ViewState) -> CoverageResult<()> {
        Ok(())
    }

    fn render_tile(
        &self,
        coord: TileCoord,
        style: &RenderStyle<'_>,
        tile_size: u32,
    ) -> CoverageResult<Option<Arc<TileImage>>> {
        let Some(extent) = self.extent else {
            return Ok(None);
        };
        let tile = self.cache.get_or_render(coord, || {
            let markers = build_markers(&self.profiles, self.vertical_index, style.palette, &extent);
            draw_markers(&markers, style.projection, &coord.request(tile_size))
        })?;
        Ok(Some(tile))
    }

    fn invalidate(&self) {
        self.cache.invalidate();
    }

    fn palette_extent(&self) -> Option<ValueExtent> {
        self.extent
    }

    fn legend(&self, palette: &Palette) -> Option<Legend> {
        let extent = self.extent?;
        Some(Legend::new(
            self.info.title_or(&self.param),
            self.info.uom.clone(),
            palette,
            &extent,
        ))
    }
}
