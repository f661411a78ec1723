//! Shared test utilities for the coverage-tiles workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic axis, domain and range generators
//! - Coverage document fixtures written to temporary directories
//! - Approximate float assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{create_global_domain, fixtures};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f64, 1.0_f64, 0.001_f64);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Asserts two RGBA buffers are identical and reports the first differing pixel.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_pixels_eq;
///
/// assert_pixels_eq!(generic.pixels(), separable.pixels(), 256);
/// ```
#[macro_export]
macro_rules! assert_pixels_eq {
    ($left:expr, $right:expr, $width:expr) => {{
        let left: &[u8] = $left;
        let right: &[u8] = $right;
        assert_eq!(left.len(), right.len(), "buffer lengths differ");
        if let Some(i) = left.iter().zip(right.iter()).position(|(a, b)| a != b) {
            let px = i / 4;
            panic!(
                "pixel ({}, {}) differs: {:?} vs {:?}",
                px % $width,
                px / $width,
                &left[px * 4..px * 4 + 4],
                &right[px * 4..px * 4 + 4]
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_pixels_eq_passes() {
        let a = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
        assert_pixels_eq!(&a, &a.clone(), 2);
    }

    #[test]
    #[should_panic(expected = "pixel (1, 0) differs")]
    fn test_assert_pixels_eq_reports_pixel() {
        let a = vec![0u8; 8];
        let mut b = a.clone();
        b[5] = 9;
        assert_pixels_eq!(&a, &b, 2);
    }
}
