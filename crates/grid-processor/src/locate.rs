//! Neighbor lookup on ascending coordinate axes.

/// Bracketing indices of a query coordinate on an ascending axis.
///
/// `lo == -1` means the query lies before the first axis value and
/// `hi == len` means it lies after the last one. An exact hit collapses both
/// to the same index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbors {
    pub lo: isize,
    pub hi: isize,
}

impl Neighbors {
    /// The lower index, or `None` for the "before first" sentinel.
    #[inline]
    pub fn lower(&self) -> Option<usize> {
        (self.lo >= 0).then_some(self.lo as usize)
    }

    /// The upper index, or `None` for the "after last" sentinel.
    #[inline]
    pub fn upper(&self, len: usize) -> Option<usize> {
        (self.hi >= 0 && (self.hi as usize) < len).then_some(self.hi as usize)
    }

    #[inline]
    pub fn is_exact(&self) -> bool {
        self.lo == self.hi
    }

    /// Both valid indices, deduplicated on an exact hit. Sentinels are
    /// skipped.
    #[inline]
    pub fn valid(&self, len: usize) -> impl Iterator<Item = usize> {
        let lower = self.lower().filter(|&i| i < len);
        let upper = self.upper(len).filter(|&i| Some(i) != lower);
        lower.into_iter().chain(upper)
    }
}

/// Binary search for the axis indices bracketing `x`.
///
/// O(log n), allocation free.
pub fn indices_of_nearest(axis: &[f64], x: f64) -> Neighbors {
    let mut lo: isize = -1;
    let mut hi: isize = axis.len() as isize;

    while hi - lo > 1 {
        let mid = (lo + hi + 1) / 2;
        if axis[mid as usize] <= x {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    if lo >= 0 && axis[lo as usize] == x {
        hi = lo;
    }

    Neighbors { lo, hi }
}

/// Index of the axis value closest to `x`.
///
/// Ties go to the upper index. Returns `None` only for an empty axis.
pub fn index_of_nearest(axis: &[f64], x: f64) -> Option<usize> {
    let n = indices_of_nearest(axis, x);
    closer_index(axis, x, n)
}

/// Closer of the two bracketing indices, ties to the upper one.
#[inline]
pub fn closer_index(axis: &[f64], x: f64, n: Neighbors) -> Option<usize> {
    match (n.lower(), n.upper(axis.len())) {
        (Some(lo), Some(hi)) => {
            if (x - axis[lo]).abs() < (x - axis[hi]).abs() {
                Some(lo)
            } else {
                Some(hi)
            }
        }
        (Some(lo), None) => Some(lo),
        (None, Some(hi)) => Some(hi),
        (None, None) => None,
    }
}
