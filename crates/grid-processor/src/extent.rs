//! Palette extent computation: whole-range or visible-area min/max.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use tracing::debug;

use coverage_common::{BoundingBox, CoverageError};

use crate::domain::GridDomain;
use crate::locate::indices_of_nearest;
use crate::range::{GridSlice, ParameterRange, ValueExtent};

/// Fill value threshold of the legacy ocean profile datasets.
pub const LEGACY_FILL_THRESHOLD: f64 = 99999.0;

/// Predicate selecting sentinel values that must not count towards a
/// palette extent. Rendering is unaffected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueMask {
    /// Values at or above this threshold are fill values.
    #[serde(default)]
    pub fill_at_or_above: Option<f64>,
    /// Exactly zero is a fill value.
    #[serde(default)]
    pub exclude_zero: bool,
}

impl ValueMask {
    /// Masks nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// `>= 99999` or `== 0`.
    pub fn legacy_fill() -> Self {
        Self {
            fill_at_or_above: Some(LEGACY_FILL_THRESHOLD),
            exclude_zero: true,
        }
    }

    #[inline]
    pub fn excludes(&self, v: f64) -> bool {
        if !v.is_finite() {
            return true;
        }
        if self.exclude_zero && v == 0.0 {
            return true;
        }
        matches!(self.fill_at_or_above, Some(t) if v >= t)
    }
}

/// How the palette extent is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteExtentMode {
    /// Observed min/max of the whole parameter range.
    #[default]
    Global,
    /// Min/max of the cells inside the current field of view.
    Fov,
}

impl PaletteExtentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Fov => "fov",
        }
    }
}

impl FromStr for PaletteExtentMode {
    type Err = CoverageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "fov" => Ok(Self::Fov),
            _ => Err(CoverageError::invalid_parameter(
                "palette_range",
                format!("expected 'global' or 'fov', got '{}'", s),
            )),
        }
    }
}

impl fmt::Display for PaletteExtentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Extent over every value of the range.
pub fn global_extent(range: &ParameterRange) -> Option<ValueExtent> {
    range.observed_extent()
}

/// Column and row index runs of a domain covered by a visible area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HorizontalSubset {
    /// One run, or two when the view wraps across the domain's discontinuity.
    pub columns: Vec<RangeInclusive<usize>>,
    pub rows: RangeInclusive<usize>,
}

/// Index runs of `domain` covered by `view`.
///
/// The view's longitudes are wrapped into the domain's longitude interval.
/// A view spanning 360 degrees or more selects every column. A run starts at
/// the first axis value at or above the view's lower edge and ends at the last
/// one at or below its upper edge. Returns `None` when no cell lies inside.
pub fn horizontal_subset(domain: &GridDomain, view: &BoundingBox) -> Option<HorizontalSubset> {
    let lon = domain.lon();
    let lat = domain.lat();
    let last_col = lon.len().checked_sub(1)?;

    let columns: Vec<_> = if view.width() >= 360.0 {
        vec![0..=last_col]
    } else {
        let west = domain.wrap_lon(view.min_lon);
        let east = domain.wrap_lon(view.max_lon);
        if east < west {
            [
                axis_run(lon, west, f64::INFINITY),
                axis_run(lon, f64::NEG_INFINITY, east),
            ]
            .into_iter()
            .flatten()
            .collect()
        } else {
            axis_run(lon, west, east).into_iter().collect()
        }
    };
    if columns.is_empty() {
        return None;
    }

    let rows = axis_run(lat, view.min_lat, view.max_lat)?;
    Some(HorizontalSubset { columns, rows })
}

/// Indices of the axis values inside `[from, to]`, if any.
fn axis_run(axis: &[f64], from: f64, to: f64) -> Option<RangeInclusive<usize>> {
    let lower = indices_of_nearest(axis, from);
    let start = if lower.is_exact() {
        lower.lower()?
    } else {
        lower.upper(axis.len())?
    };
    let end = indices_of_nearest(axis, to).lower()?;
    (start <= end).then_some(start..=end)
}

/// Extent over the cells of slice `(t, z)` inside `view`.
pub fn viewport_extent(
    domain: &GridDomain,
    range: &ParameterRange,
    t: usize,
    z: usize,
    view: &BoundingBox,
) -> crate::Result<Option<ValueExtent>> {
    let slice = range.slice(t, z)?;
    let Some(subset) = horizontal_subset(domain, view) else {
        return Ok(None);
    };
    let extent = subset_extent(&slice, &subset, range.mask());
    debug!(
        t,
        z,
        columns = ?subset.columns,
        rows = ?subset.rows,
        ?extent,
        "Computed viewport extent"
    );
    Ok(extent)
}

fn subset_extent(slice: &GridSlice<'_>, subset: &HorizontalSubset, mask: &ValueMask) -> Option<ValueExtent> {
    let mut extent = None;
    for iy in subset.rows.clone() {
        for cols in &subset.columns {
            let row = slice.row_span(iy, cols.clone());
            extent = ValueExtent::union(extent, ValueExtent::of(row, mask));
        }
    }
    extent
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverage_common::crs::CRS84_URI;

    /// 0..350 step 10 lon, -20..20 step 10 lat, value = lon index + 100 * lat index.
    fn fixture() -> (GridDomain, ParameterRange) {
        let lon: Vec<f64> = (0..36).map(|i| i as f64 * 10.0).collect();
        let lat: Vec<f64> = (0..5).map(|i| -20.0 + i as f64 * 10.0).collect();
        let domain = GridDomain::new(CRS84_URI, lon, lat, Some(BoundingBox::new(0.0, -20.0, 360.0, 20.0)))
            .unwrap();
        let values = (0..5)
            .flat_map(|y| (0..36).map(move |x| Some((x + 100 * y) as f64)))
            .collect();
        let range = ParameterRange::new(&domain, values).unwrap();
        (domain, range)
    }

    #[test]
    fn test_mask_predicates() {
        let legacy = ValueMask::legacy_fill();
        assert!(legacy.excludes(99999.0));
        assert!(legacy.excludes(1e20));
        assert!(legacy.excludes(0.0));
        assert!(!legacy.excludes(99998.9));
        assert!(!legacy.excludes(-0.5));
        assert!(!ValueMask::none().excludes(0.0));
        assert!(ValueMask::none().excludes(f64::NAN));
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("global".parse::<PaletteExtentMode>().unwrap(), PaletteExtentMode::Global);
        assert_eq!("FOV".parse::<PaletteExtentMode>().unwrap(), PaletteExtentMode::Fov);
        assert!("viewport".parse::<PaletteExtentMode>().is_err());
    }

    #[test]
    fn test_global_extent() {
        let (_, range) = fixture();
        assert_eq!(global_extent(&range), Some(ValueExtent::new(0.0, 435.0)));
    }

    #[test]
    fn test_viewport_extent_simple() {
        let (domain, range) = fixture();
        let view = BoundingBox::new(20.0, -10.0, 50.0, 10.0);
        let extent = viewport_extent(&domain, &range, 0, 0, &view).unwrap();
        // cols 2..=5, rows 1..=3
        assert_eq!(extent, Some(ValueExtent::new(102.0, 305.0)));
    }

    #[test]
    fn test_viewport_wraps_negative_longitudes() {
        let (domain, range) = fixture();
        // -30..-10 wraps to 330..350
        let view = BoundingBox::new(-30.0, 0.0, -10.0, 0.0);
        let extent = viewport_extent(&domain, &range, 0, 0, &view).unwrap();
        assert_eq!(extent, Some(ValueExtent::new(233.0, 235.0)));
    }

    #[test]
    fn test_viewport_across_discontinuity() {
        let (domain, range) = fixture();
        // -20..20 wraps to 340 and 20: columns 34..=35 and 0..=2
        let view = BoundingBox::new(-20.0, -20.0, 20.0, -20.0);
        let subset = horizontal_subset(&domain, &view).unwrap();
        assert_eq!(subset.columns, vec![34..=35, 0..=2]);
        let extent = viewport_extent(&domain, &range, 0, 0, &view).unwrap();
        assert_eq!(extent, Some(ValueExtent::new(0.0, 35.0)));
    }

    #[test]
    fn test_viewport_between_grid_points() {
        let (domain, range) = fixture();
        // no column lies inside 21..29
        let view = BoundingBox::new(21.0, -20.0, 29.0, 20.0);
        assert_eq!(horizontal_subset(&domain, &view), None);
        assert_eq!(viewport_extent(&domain, &range, 0, 0, &view).unwrap(), None);

        // edges off the grid keep only the columns and rows inside
        let view = BoundingBox::new(15.0, -15.0, 44.0, 5.0);
        let subset = horizontal_subset(&domain, &view).unwrap();
        assert_eq!(subset.columns, vec![2..=4]);
        assert_eq!(subset.rows, 1..=2);
    }

    #[test]
    fn test_viewport_exactly_one_world_wide() {
        let (domain, _) = fixture();
        let view = BoundingBox::new(-180.0, -20.0, 180.0, 20.0);
        let subset = horizontal_subset(&domain, &view).unwrap();
        assert_eq!(subset.columns, vec![0..=35]);
        assert_eq!(subset.rows, 0..=4);
    }

    #[test]
    fn test_viewport_wider_than_world() {
        let (domain, range) = fixture();
        let view = BoundingBox::new(-400.0, 20.0, 400.0, 20.0);
        let subset = horizontal_subset(&domain, &view).unwrap();
        assert_eq!(subset.columns, vec![0..=35]);
        let extent = viewport_extent(&domain, &range, 0, 0, &view).unwrap();
        assert_eq!(extent, Some(ValueExtent::new(400.0, 435.0)));
    }
}
