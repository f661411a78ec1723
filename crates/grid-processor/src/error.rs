//! Error types for grid processing.
//!
//! Grid operations share the workspace-wide [`CoverageError`] taxonomy so
//! domain and range failures surface unchanged through the renderer and the
//! viewer.

pub use coverage_common::CoverageError;

/// Result type for grid processor operations.
pub type Result<T> = std::result::Result<T, CoverageError>;
