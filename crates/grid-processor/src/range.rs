//! Parameter range values over a grid domain.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use coverage_common::CoverageError;

use crate::domain::GridDomain;
use crate::error::Result;
use crate::extent::ValueMask;

/// A `[min, max]` value interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueExtent {
    pub min: f64,
    pub max: f64,
}

impl ValueExtent {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Min/max over the present values accepted by `mask`.
    ///
    /// Returns `None` when no value qualifies.
    pub fn of<'a, I>(values: I, mask: &ValueMask) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Option<f64>>,
    {
        let mut extent: Option<Self> = None;
        for v in values.into_iter().flatten().copied() {
            if mask.excludes(v) {
                continue;
            }
            extent = Some(match extent {
                None => Self::new(v, v),
                Some(e) => Self::new(e.min.min(v), e.max.max(v)),
            });
        }
        extent
    }

    /// Combine two optional extents.
    pub fn union(a: Option<Self>, b: Option<Self>) -> Option<Self> {
        match (a, b) {
            (Some(a), Some(b)) => Some(Self::new(a.min.min(b.min), a.max.max(b.max))),
            (a, None) => a,
            (None, b) => b,
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Scalar values of one parameter, flattened in `(time, vertical, y, x)`
/// order. `None` marks a missing value.
#[derive(Debug)]
pub struct ParameterRange {
    shape: [usize; 4],
    values: Vec<Option<f64>>,
    mask: ValueMask,
    observed: OnceCell<Option<ValueExtent>>,
    palette_extent: Option<ValueExtent>,
}

impl ParameterRange {
    /// Wrap `values` for `domain`. The value count must match the domain shape.
    pub fn new(domain: &GridDomain, values: Vec<Option<f64>>) -> Result<Self> {
        let expected = domain.value_count();
        if values.len() != expected {
            return Err(CoverageError::ShapeMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            shape: domain.shape(),
            values,
            mask: ValueMask::default(),
            observed: OnceCell::new(),
            palette_extent: None,
        })
    }

    /// Use an extent precomputed upstream instead of scanning the values.
    pub fn with_observed_extent(self, extent: ValueExtent) -> Self {
        let observed = OnceCell::new();
        let _ = observed.set(Some(extent));
        Self { observed, ..self }
    }

    /// Values matched by `mask` are left out of every extent computation.
    pub fn with_mask(mut self, mask: ValueMask) -> Self {
        self.mask = mask;
        self
    }

    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn mask(&self) -> &ValueMask {
        &self.mask
    }

    /// Observed min/max, computed on first use and cached.
    pub fn observed_extent(&self) -> Option<ValueExtent> {
        *self
            .observed
            .get_or_init(|| ValueExtent::of(&self.values, &self.mask))
    }

    /// Extent currently mapped onto the palette. Starts out as the observed
    /// extent.
    pub fn palette_extent(&self) -> Option<ValueExtent> {
        self.palette_extent.or_else(|| self.observed_extent())
    }

    pub fn set_palette_extent(&mut self, extent: Option<ValueExtent>) {
        self.palette_extent = extent;
    }

    /// Borrow the horizontal slice at time index `t` and vertical index `z`.
    pub fn slice(&self, t: usize, z: usize) -> Result<GridSlice<'_>> {
        let [nt, nz, ny, nx] = self.shape;
        if t >= nt {
            return Err(CoverageError::IndexOutOfRange {
                axis: "time",
                index: t,
                len: nt,
            });
        }
        if z >= nz {
            return Err(CoverageError::IndexOutOfRange {
                axis: "vertical",
                index: z,
                len: nz,
            });
        }
        let plane = ny * nx;
        let start = (t * nz + z) * plane;
        Ok(GridSlice {
            values: &self.values[start..start + plane],
            nx,
            ny,
        })
    }
}

/// A borrowed 2-D `(y, x)` view into a parameter range.
#[derive(Debug, Clone, Copy)]
pub struct GridSlice<'a> {
    values: &'a [Option<f64>],
    nx: usize,
    ny: usize,
}

impl<'a> GridSlice<'a> {
    /// Build a slice over a row-major `ny x nx` buffer.
    pub fn from_rows(values: &'a [Option<f64>], nx: usize, ny: usize) -> Result<Self> {
        if values.len() != nx * ny {
            return Err(CoverageError::ShapeMismatch {
                expected: nx * ny,
                actual: values.len(),
            });
        }
        Ok(Self { values, nx, ny })
    }

    #[inline]
    pub fn get(&self, iy: usize, ix: usize) -> Option<f64> {
        if iy >= self.ny || ix >= self.nx {
            return None;
        }
        self.values[iy * self.nx + ix]
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Row `iy` restricted to columns `cols`.
    pub fn row_span(&self, iy: usize, cols: std::ops::RangeInclusive<usize>) -> &'a [Option<f64>] {
        let start = iy * self.nx;
        &self.values[start + cols.start()..=start + cols.end()]
    }
}
