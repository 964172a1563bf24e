//! Data model for the grid core.

mod cell;
mod geometry;
mod props;

pub use cell::*;
pub use geometry::*;
pub use props::*;
