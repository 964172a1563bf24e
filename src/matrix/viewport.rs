//! Viewport state for computing the scrolled-into-view range.

use serde::{Deserialize, Serialize};

use super::CellMatrix;
use crate::model::{GridColumn, GridRow, Range};

/// Viewport state - the visible area of the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Horizontal scroll position within the scrollable pane
    pub scroll_left: f32,
    /// Vertical scroll position within the scrollable pane
    pub scroll_top: f32,
    /// Viewport width in pixels, sticky columns included
    pub width: f32,
    /// Viewport height in pixels, sticky rows included
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            scroll_left: 0.0,
            scroll_top: 0.0,
            width,
            height,
        }
    }

    #[must_use]
    pub fn scrolled_to(mut self, scroll_left: f32, scroll_top: f32) -> Self {
        self.scroll_left = scroll_left.max(0.0);
        self.scroll_top = scroll_top.max(0.0);
        self
    }

    /// Scrollable rows intersecting the viewport.
    ///
    /// Scrollable rows are positioned in their own coordinate space starting
    /// at 0, so the frozen pane height only shrinks the visible window.
    pub fn visible_rows<'m>(&self, matrix: &'m CellMatrix) -> &'m [GridRow] {
        let rows = &matrix.scrollable_range.rows;
        let visible_height = (self.height - matrix.sticky_top_height()).max(0.0);
        let start = rows.partition_point(|r| r.bottom <= self.scroll_top);
        let end = rows.partition_point(|r| r.top < self.scroll_top + visible_height);
        rows.get(start..end.max(start)).unwrap_or_default()
    }

    /// Scrollable columns intersecting the viewport.
    pub fn visible_columns<'m>(&self, matrix: &'m CellMatrix) -> &'m [GridColumn] {
        let columns = &matrix.scrollable_range.columns;
        let visible_width = (self.width - matrix.sticky_left_width()).max(0.0);
        let start = columns.partition_point(|c| c.right <= self.scroll_left);
        let end = columns.partition_point(|c| c.left < self.scroll_left + visible_width);
        columns.get(start..end.max(start)).unwrap_or_default()
    }

    /// The scrolled-into-view part of the scrollable range
    pub fn visible_range(&self, matrix: &CellMatrix) -> Range {
        Range::new(
            self.visible_rows(matrix).to_vec(),
            self.visible_columns(matrix).to_vec(),
        )
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::model::{ColumnDef, GridProps, PropsHandle, RowDef};

    fn matrix(rows: usize, columns: usize, sticky_top: usize, sticky_left: usize) -> CellMatrix {
        let props = GridProps::new(
            (0..rows)
                .map(|i| RowDef::new(format!("r{i}")).with_height(20.0))
                .collect(),
            (0..columns)
                .map(|i| ColumnDef::new(format!("c{i}")).with_width(100.0))
                .collect(),
        )
        .with_sticky(sticky_top, sticky_left);
        CellMatrix::build(&PropsHandle::new(props)).unwrap()
    }

    #[test]
    fn test_visible_rows_at_origin() {
        let m = matrix(100, 10, 0, 0);
        let viewport = Viewport::new(250.0, 100.0);
        let rows = viewport.visible_rows(&m);
        assert_eq!(rows.first().unwrap().idx, 0);
        assert_eq!(rows.last().unwrap().idx, 4);

        let cols = viewport.visible_columns(&m);
        assert_eq!(cols.len(), 3);
    }

    #[test]
    fn test_visible_rows_scrolled_partial() {
        let m = matrix(100, 10, 0, 0);
        let viewport = Viewport::new(250.0, 100.0).scrolled_to(0.0, 30.0);
        let rows = viewport.visible_rows(&m);
        // row 1 spans 20..40, partially visible at scroll 30
        assert_eq!(rows.first().unwrap().idx, 1);
        assert_eq!(rows.last().unwrap().idx, 6);
    }

    #[test]
    fn test_sticky_panes_shrink_window() {
        let m = matrix(100, 10, 2, 1);
        let viewport = Viewport::new(250.0, 100.0);
        let rows = viewport.visible_rows(&m);
        // 100 - 40 of frozen rows leaves 60px: three scrollable rows
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.first().unwrap().idx, 2);

        let cols = viewport.visible_columns(&m);
        assert_eq!(cols.first().unwrap().idx, 1);
        assert_eq!(cols.len(), 2);
    }

    #[test]
    fn test_scrolled_past_end() {
        let m = matrix(5, 2, 0, 0);
        let viewport = Viewport::new(250.0, 100.0).scrolled_to(0.0, 10_000.0);
        assert!(viewport.visible_range(&m).is_empty());
    }
}
