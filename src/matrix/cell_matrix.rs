//! Immutable geometry snapshot of a grid.
//!
//! A matrix is computed once per grid definition (see
//! [`CellMatrixBuilder`](super::CellMatrixBuilder)) and never mutated; a new
//! definition produces a new matrix.

use std::collections::HashMap;

use serde::Serialize;

use super::CellMatrixBuilder;
use crate::error::{GridError, Result};
use crate::model::{GridColumn, GridRow, Id, Location, PropsHandle, Range};

/// Default row height in pixels
pub const DEFAULT_ROW_HEIGHT: f32 = 25.0;

/// Default column width in pixels
pub const DEFAULT_COLUMN_WIDTH: f32 = 150.0;

/// Frozen panes of a matrix
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StickyRanges {
    /// All rows x the frozen leading columns
    pub sticky_left_range: Range,
    /// The frozen leading rows x all columns
    pub sticky_top_range: Range,
}

/// Pre-computed geometry for one grid definition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellMatrix {
    /// Definition this matrix was built from
    #[serde(skip)]
    pub props: PropsHandle,
    pub rows: Vec<GridRow>,
    pub columns: Vec<GridColumn>,
    /// Sum of all column widths
    pub width: f32,
    /// Sum of all row heights
    pub height: f32,
    pub ranges: StickyRanges,
    /// `rows[sticky_top_rows..] x columns[sticky_left_columns..]`
    pub scrollable_range: Range,
    pub row_index_lookup: HashMap<Id, usize>,
    pub column_index_lookup: HashMap<Id, usize>,
    /// Top-left location; `None` when the matrix is empty
    pub first: Option<Location>,
    /// Bottom-right location; `None` when the matrix is empty
    pub last: Option<Location>,
}

impl CellMatrix {
    /// Run every builder stage for `props`.
    pub fn build(props: &PropsHandle) -> Result<Self> {
        Ok(CellMatrixBuilder::new(props.clone())?
            .fill_rows_and_columns()
            .fill_sticky()
            .fill_scrollable_range()
            .set_edge_locations())
    }

    /// True when there are no rows or no columns; nothing is addressable.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn sticky_top_rows(&self) -> usize {
        self.ranges.sticky_top_range.rows.len()
    }

    pub fn sticky_left_columns(&self) -> usize {
        self.ranges.sticky_left_range.columns.len()
    }

    /// Total height of the frozen rows (0 when none)
    pub fn sticky_top_height(&self) -> f32 {
        self.ranges.sticky_top_range.height()
    }

    /// Total width of the frozen columns (0 when none)
    pub fn sticky_left_width(&self) -> f32 {
        self.ranges.sticky_left_range.width()
    }

    pub fn get_location(&self, row_idx: usize, column_idx: usize) -> Option<Location> {
        Some(Location::new(
            self.rows.get(row_idx)?.clone(),
            self.columns.get(column_idx)?.clone(),
        ))
    }

    /// Resolve stable identifiers to a location in this matrix.
    pub fn get_location_by_id(&self, row_id: &str, column_id: &str) -> Result<Location> {
        let row_idx = *self
            .row_index_lookup
            .get(row_id)
            .ok_or_else(|| GridError::UnknownRow(row_id.to_string()))?;
        let column_idx = *self
            .column_index_lookup
            .get(column_id)
            .ok_or_else(|| GridError::UnknownColumn(column_id.to_string()))?;
        self.get_location(row_idx, column_idx)
            .ok_or_else(|| GridError::Other(format!("location ({row_idx}, {column_idx}) out of range")))
    }

    /// Both indices are within the current bounds.
    pub fn is_valid(&self, location: &Location) -> bool {
        location.row.idx < self.rows.len() && location.column.idx < self.columns.len()
    }

    /// Re-resolve a location taken from an earlier matrix.
    ///
    /// Rows and columns that still exist are found by id (so they follow
    /// reordering); removed ones clamp their index to the last row/column.
    /// Returns `None` only when the matrix is empty.
    pub fn validate_location(&self, location: &Location) -> Option<Location> {
        let last_row = self.rows.len().checked_sub(1)?;
        let last_column = self.columns.len().checked_sub(1)?;
        let row_idx = self
            .row_index_lookup
            .get(location.row_id())
            .copied()
            .unwrap_or_else(|| location.row.idx.min(last_row));
        let column_idx = self
            .column_index_lookup
            .get(location.column_id())
            .copied()
            .unwrap_or_else(|| location.column.idx.min(last_column));
        self.get_location(row_idx, column_idx)
    }

    /// Re-resolve a range taken from an earlier matrix.
    ///
    /// Rows and columns are found by id and come back in this matrix's
    /// order; removed ones are dropped, so the result may be empty.
    pub fn resolve_range(&self, range: &Range) -> Range {
        let mut rows: Vec<_> = range
            .rows
            .iter()
            .filter_map(|row| self.row_index_lookup.get(&row.row_id))
            .filter_map(|&idx| self.rows.get(idx))
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.idx);
        let mut columns: Vec<_> = range
            .columns
            .iter()
            .filter_map(|column| self.column_index_lookup.get(&column.column_id))
            .filter_map(|&idx| self.columns.get(idx))
            .cloned()
            .collect();
        columns.sort_by_key(|column| column.idx);
        Range::new(rows, columns)
    }

    /// Rectangle spanned by two corners, in either order.
    pub fn get_range(&self, start: &Location, end: &Location) -> Range {
        let (top, bottom) = ordered(start.row.idx, end.row.idx);
        let (left, right) = ordered(start.column.idx, end.column.idx);
        Range::new(
            self.rows.get(top..=bottom).map(<[_]>::to_vec).unwrap_or_default(),
            self.columns
                .get(left..=right)
                .map(<[_]>::to_vec)
                .unwrap_or_default(),
        )
    }
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
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
    use crate::model::{ColumnDef, GridProps, RowDef};

    fn matrix(rows: usize, columns: usize) -> CellMatrix {
        let props = GridProps::new(
            (0..rows).map(|i| RowDef::new(format!("r{i}"))).collect(),
            (0..columns).map(|i| ColumnDef::new(format!("c{i}"))).collect(),
        );
        CellMatrix::build(&PropsHandle::new(props)).unwrap()
    }

    #[test]
    fn test_get_location_by_id() {
        let m = matrix(3, 3);
        let loc = m.get_location_by_id("r2", "c1").unwrap();
        assert_eq!(loc.indices(), (2, 1));

        assert!(matches!(
            m.get_location_by_id("nope", "c1"),
            Err(GridError::UnknownRow(_))
        ));
        assert!(matches!(
            m.get_location_by_id("r0", "nope"),
            Err(GridError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_validate_location_clamps_removed_items() {
        let big = matrix(5, 4);
        let small = matrix(2, 2);
        let focused = big.get_location(4, 3).unwrap();

        assert!(!small.is_valid(&focused));
        let clamped = small.validate_location(&focused).unwrap();
        assert_eq!(clamped.indices(), (1, 1));
        assert!(small.is_valid(&clamped));
    }

    #[test]
    fn test_validate_location_follows_ids() {
        let m = matrix(3, 3);
        let reordered = {
            let mut props = (*m.props).clone();
            props.rows.reverse();
            CellMatrix::build(&PropsHandle::new(props)).unwrap()
        };
        let loc = m.get_location(0, 0).unwrap();
        let moved = reordered.validate_location(&loc).unwrap();
        assert_eq!(moved.row_id(), "r0");
        assert_eq!(moved.row.idx, 2);
    }

    #[test]
    fn test_validate_location_on_empty_matrix() {
        let m = matrix(3, 3);
        let empty = matrix(0, 0);
        let loc = m.get_location(1, 1).unwrap();
        assert!(empty.validate_location(&loc).is_none());
    }

    #[test]
    fn test_resolve_range_by_id() {
        let m = matrix(4, 2);
        let range = m.get_range(&m.get_location(1, 0).unwrap(), &m.get_location(2, 1).unwrap());

        let mut props = (*m.props).clone();
        props.rows.reverse();
        props.rows.retain(|row| row.row_id != "r2");
        let changed = CellMatrix::build(&PropsHandle::new(props)).unwrap();

        let resolved = changed.resolve_range(&range);
        assert_eq!(resolved.row_ids(), vec!["r1".to_string()]);
        assert_eq!(resolved.rows[0].idx, 1);
        assert_eq!(resolved.columns.len(), 2);

        assert!(matrix(0, 0).resolve_range(&range).is_empty());
    }

    #[test]
    fn test_get_range_any_corner_order() {
        let m = matrix(4, 4);
        let a = m.get_location(3, 1).unwrap();
        let b = m.get_location(1, 2).unwrap();
        let range = m.get_range(&a, &b);
        assert_eq!(range.rows.len(), 3);
        assert_eq!(range.columns.len(), 2);
        assert_eq!(range.first().unwrap().indices(), (1, 1));
        assert_eq!(range.last().unwrap().indices(), (3, 2));
    }
}
