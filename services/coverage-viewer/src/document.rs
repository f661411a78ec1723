//! Coverage documents: JSON loading and conversion into grid and profile data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use coverage_common::crs::CRS84_URI;
use coverage_common::{BoundingBox, CoverageError, CoverageResult};
use grid_processor::{GridDomain, ParameterRange, ValueExtent, ValueMask};
use renderer::Profile;

/// One coverage: a domain plus parameter metadata and values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageDocument {
    pub domain: DomainDocument,
    #[serde(rename = "rangeType", default)]
    pub range_type: BTreeMap<String, ParameterInfo>,
    #[serde(default)]
    pub range: BTreeMap<String, RangeDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainDocument {
    Grid(GridDomainDocument),
    Profile(ProfileDomainDocument),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridDomainDocument {
    #[serde(default = "default_crs")]
    pub crs: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
    #[serde(default)]
    pub time: Vec<DateTime<Utc>>,
    #[serde(default)]
    pub vertical: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDomainDocument {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: Vec<f64>,
    #[serde(default)]
    pub t: Option<String>,
}

fn default_crs() -> String {
    CRS84_URI.to_string()
}

/// Display metadata of a parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub uom: Option<String>,
}

impl ParameterInfo {
    /// The title, or `fallback` when the document gives none.
    pub fn title_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.title.is_empty() {
            fallback
        } else {
            &self.title
        }
    }
}

/// Values given inline, or a reference to a separate range document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeDocument {
    Inline(RangeValues),
    Remote { id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeValues {
    pub values: Vec<Option<f64>>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl RangeValues {
    /// Extent declared by the document, when both ends are present.
    pub fn declared_extent(&self) -> Option<ValueExtent> {
        Some(ValueExtent::new(self.min?, self.max?))
    }

    /// Wrap the values as a range over `domain`.
    pub fn into_range(self, domain: &GridDomain, mask: ValueMask) -> CoverageResult<ParameterRange> {
        let declared = self.declared_extent();
        let range = ParameterRange::new(domain, self.values)?.with_mask(mask);
        Ok(match declared {
            Some(extent) => range.with_observed_extent(extent),
            None => range,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<CoverageDocument>),
    One(Box<CoverageDocument>),
}

impl CoverageDocument {
    pub fn parameter_info(&self, param: &str) -> ParameterInfo {
        self.range_type.get(param).cloned().unwrap_or_default()
    }

    pub fn has_parameter(&self, param: &str) -> bool {
        self.range_type.contains_key(param)
    }

    /// Build the grid domain. Fails for profile documents.
    pub fn grid_domain(&self) -> CoverageResult<GridDomain> {
        let DomainDocument::Grid(doc) = &self.domain else {
            return Err(CoverageError::invalid_domain("expected a Grid domain, found Profile"));
        };
        Ok(GridDomain::new(&doc.crs, doc.x.clone(), doc.y.clone(), doc.bbox)?
            .with_time(doc.time.clone())
            .with_vertical(doc.vertical.clone()))
    }

    /// Profile values of `param`, `None` for grid documents, documents without
    /// the parameter and profiles whose range is not inline.
    pub fn profile(&self, param: &str) -> Option<Profile> {
        let DomainDocument::Profile(doc) = &self.domain else {
            return None;
        };
        if !self.has_parameter(param) {
            return None;
        }
        let RangeDocument::Inline(values) = self.range.get(param)? else {
            return None;
        };
        Some(Profile {
            lon: doc.x,
            lat: doc.y,
            time: doc.t.clone(),
            vertical: doc.z.clone(),
            values: values.values.clone(),
            extent: values.declared_extent(),
        })
    }
}

/// Parse a document or a JSON array of documents.
pub fn parse_documents(bytes: &[u8]) -> CoverageResult<Vec<CoverageDocument>> {
    Ok(match serde_json::from_slice::<OneOrMany>(bytes)? {
        OneOrMany::Many(docs) => docs,
        OneOrMany::One(doc) => vec![*doc],
    })
}

/// Read documents from a file.
pub async fn load_documents(path: &Path) -> CoverageResult<Vec<CoverageDocument>> {
    let bytes = tokio::fs::read(path).await?;
    let docs = parse_documents(&bytes)?;
    info!(path = %path.display(), count = docs.len(), "Loaded coverage documents");
    Ok(docs)
}

/// Resolves range references relative to the directory of the document that
/// holds them.
#[derive(Debug, Clone)]
pub struct RangeLoader {
    base: PathBuf,
}

impl RangeLoader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Loader for references in the document at `path`.
    pub fn for_document(path: &Path) -> Self {
        Self::new(path.parent().map(Path::to_path_buf).unwrap_or_default())
    }

    pub async fn load(&self, id: &str) -> CoverageResult<RangeValues> {
        let path = self.base.join(id);
        debug!(path = %path.display(), "Fetching range");
        let bytes = tokio::fs::read(&path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
