//! Coverage tile viewer.
//!
//! Loads coverage documents, builds grid and profile layers, and renders
//! map tiles through a [`MapView`](view::MapView).

pub mod config;
pub mod document;
pub mod fetch;
pub mod layer;
pub mod view;

use std::path::Path;

use coverage_common::{CoverageError, CoverageResult};
use grid_processor::ValueMask;

use document::{load_documents, DomainDocument, RangeLoader};
use layer::{GridLayer, ProfileLayer, RenderableLayer};

/// How layers are built from documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayerOptions {
    pub mask: ValueMask,
    pub cache_entries: usize,
    pub time_index: usize,
    pub vertical_index: usize,
}

/// Build the layers for `param` from the documents in `path`: one grid layer
/// per grid document carrying the parameter, plus one profile layer when any
/// profile carries it. Referenced ranges are fetched before returning.
pub async fn load_layers(
    path: &Path,
    param: &str,
    options: LayerOptions,
) -> CoverageResult<Vec<Box<dyn RenderableLayer>>> {
    let docs = load_documents(path).await?;
    let loader = RangeLoader::for_document(path);
    let mut layers: Vec<Box<dyn RenderableLayer>> = Vec::new();

    let grids = docs
        .iter()
        .filter(|d| d.has_parameter(param) && matches!(d.domain, DomainDocument::Grid(_)));
    for doc in grids {
        let mut layer = GridLayer::from_document(doc, param, loader.clone(), options.mask, options.cache_entries)?;
        layer.set_time_index(options.time_index)?;
        layer.set_vertical_index(options.vertical_index)?;
        layer.ensure_loaded().await?;
        layers.push(Box::new(layer));
    }

    let mut profiles = ProfileLayer::from_documents(&docs, param, options.cache_entries);
    profiles.set_vertical_index(options.vertical_index);
    if !profiles.profiles().is_empty() {
        layers.push(Box::new(profiles));
    }

    if layers.is_empty() {
        return Err(CoverageError::ParameterNotFound(param.to_string()));
    }
    Ok(layers)
}
