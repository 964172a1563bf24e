//! Geometry engine: computes row/column positions, sticky panes and the
//! scrollable sub-range from a grid definition.
//!
//! This module handles:
//! - Staged, validated construction of the immutable [`CellMatrix`]
//! - Location lookup, validation and clamping against a matrix
//! - Viewport state and the visible (scrolled-into-view) range

mod builder;
mod cell_matrix;
mod viewport;

pub use builder::{CellMatrixBuilder, Configured, WithGeometry, WithScrollable, WithSticky};
pub use cell_matrix::{CellMatrix, StickyRanges, DEFAULT_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT};
pub use viewport::Viewport;
