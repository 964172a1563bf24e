//! Staged construction of a [`CellMatrix`].
//!
//! Each stage consumes the previous one and returns the next, so a matrix
//! can only be produced by running every stage in order and no staging state
//! outlives a build:
//!
//! ```text
//! CellMatrixBuilder::new(props)?     // adopt + validate configuration
//!     .fill_rows_and_columns()       // offsets, sizes, id lookups
//!     .fill_sticky()                 // frozen panes
//!     .fill_scrollable_range()       // remainder
//!     .set_edge_locations()          // first / last -> CellMatrix
//! ```

use std::collections::HashMap;

use super::{CellMatrix, StickyRanges, DEFAULT_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT};
use crate::error::{GridError, Result};
use crate::model::{GridColumn, GridRow, Id, PropsHandle, Range};

/// Entry point of the staged build.
pub struct CellMatrixBuilder;

impl CellMatrixBuilder {
    /// Adopt a configuration, rejecting geometry the matrix cannot represent.
    pub fn new(props: PropsHandle) -> Result<Configured> {
        validate(&props)?;
        Ok(Configured { props })
    }
}

/// Configuration adopted and validated.
pub struct Configured {
    props: PropsHandle,
}

/// Rows and columns laid out.
pub struct WithGeometry {
    props: PropsHandle,
    geometry: Geometry,
}

/// Sticky panes computed.
pub struct WithSticky {
    props: PropsHandle,
    geometry: Geometry,
    ranges: StickyRanges,
}

/// Scrollable range computed.
pub struct WithScrollable {
    props: PropsHandle,
    geometry: Geometry,
    ranges: StickyRanges,
    scrollable_range: Range,
}

struct Geometry {
    rows: Vec<GridRow>,
    columns: Vec<GridColumn>,
    width: f32,
    height: f32,
    row_index_lookup: HashMap<Id, usize>,
    column_index_lookup: HashMap<Id, usize>,
}

impl Configured {
    pub fn fill_rows_and_columns(self) -> WithGeometry {
        let sticky_top = self.props.sticky_top_rows;
        let sticky_left = self.props.sticky_left_columns;

        let mut rows: Vec<GridRow> = Vec::with_capacity(self.props.rows.len());
        let mut row_index_lookup = HashMap::with_capacity(self.props.rows.len());
        let mut height: f32 = 0.0;
        for (idx, row) in self.props.rows.iter().enumerate() {
            let top = pane_offset(idx, sticky_top, rows.last().map(|r| r.bottom));
            let h = resolve_size(row.height, DEFAULT_ROW_HEIGHT);
            rows.push(GridRow {
                row_id: row.row_id.clone(),
                idx,
                top,
                height: h,
                bottom: top + h,
            });
            height += h;
            row_index_lookup.insert(row.row_id.clone(), idx);
        }

        let mut columns: Vec<GridColumn> = Vec::with_capacity(self.props.columns.len());
        let mut column_index_lookup = HashMap::with_capacity(self.props.columns.len());
        let mut width: f32 = 0.0;
        for (idx, column) in self.props.columns.iter().enumerate() {
            let left = pane_offset(idx, sticky_left, columns.last().map(|c| c.right));
            let w = resolve_size(column.width, DEFAULT_COLUMN_WIDTH);
            columns.push(GridColumn {
                column_id: column.column_id.clone(),
                idx,
                left,
                width: w,
                right: left + w,
            });
            width += w;
            column_index_lookup.insert(column.column_id.clone(), idx);
        }

        WithGeometry {
            props: self.props,
            geometry: Geometry {
                rows,
                columns,
                width,
                height,
                row_index_lookup,
                column_index_lookup,
            },
        }
    }
}

impl WithGeometry {
    pub fn fill_sticky(self) -> WithSticky {
        let g = &self.geometry;
        let sticky_top = self.props.sticky_top_rows.min(g.rows.len());
        let sticky_left = self.props.sticky_left_columns.min(g.columns.len());

        let ranges = StickyRanges {
            sticky_left_range: Range::new(
                g.rows.clone(),
                g.columns.iter().take(sticky_left).cloned().collect(),
            ),
            sticky_top_range: Range::new(
                g.rows.iter().take(sticky_top).cloned().collect(),
                g.columns.clone(),
            ),
        };

        WithSticky {
            props: self.props,
            geometry: self.geometry,
            ranges,
        }
    }
}

impl WithSticky {
    pub fn fill_scrollable_range(self) -> WithScrollable {
        let g = &self.geometry;
        let scrollable_range = Range::new(
            g.rows
                .iter()
                .skip(self.props.sticky_top_rows)
                .cloned()
                .collect(),
            g.columns
                .iter()
                .skip(self.props.sticky_left_columns)
                .cloned()
                .collect(),
        );

        WithScrollable {
            props: self.props,
            geometry: self.geometry,
            ranges: self.ranges,
            scrollable_range,
        }
    }
}

impl WithScrollable {
    /// Final stage: resolve the corner locations and yield the matrix.
    pub fn set_edge_locations(self) -> CellMatrix {
        let Geometry {
            rows,
            columns,
            width,
            height,
            row_index_lookup,
            column_index_lookup,
        } = self.geometry;

        let mut matrix = CellMatrix {
            props: self.props,
            rows,
            columns,
            width,
            height,
            ranges: self.ranges,
            scrollable_range: self.scrollable_range,
            row_index_lookup,
            column_index_lookup,
            first: None,
            last: None,
        };
        matrix.first = matrix.get_location(0, 0);
        matrix.last = match (matrix.rows.len(), matrix.columns.len()) {
            (0, _) | (_, 0) => None,
            (r, c) => matrix.get_location(r - 1, c - 1),
        };

        tracing::debug!(
            target: "cellgrid.matrix",
            rows = matrix.rows.len(),
            columns = matrix.columns.len(),
            width = matrix.width,
            height = matrix.height,
            "matrix_built"
        );
        matrix
    }
}

/// Offset of item `idx`: 0 for the first item overall and for the first item
/// past the sticky boundary, otherwise the previous item's far edge.
fn pane_offset(idx: usize, sticky: usize, previous_far_edge: Option<f32>) -> f32 {
    if idx == 0 || idx == sticky {
        return 0.0;
    }
    previous_far_edge.unwrap_or(0.0)
}

/// `None` and 0 both mean "use the default".
fn resolve_size(size: Option<f32>, default: f32) -> f32 {
    match size {
        Some(s) if s > 0.0 => s,
        _ => default,
    }
}

fn check_size(item: &str, size: Option<f32>) -> Result<()> {
    match size {
        Some(s) if !s.is_finite() || s < 0.0 => Err(GridError::InvalidSize {
            item: item.to_string(),
            size: s,
        }),
        _ => Ok(()),
    }
}

fn validate(props: &PropsHandle) -> Result<()> {
    if props.sticky_top_rows > props.rows.len() {
        return Err(GridError::StickyRowsOutOfBounds {
            sticky: props.sticky_top_rows,
            count: props.rows.len(),
        });
    }
    if props.sticky_left_columns > props.columns.len() {
        return Err(GridError::StickyColumnsOutOfBounds {
            sticky: props.sticky_left_columns,
            count: props.columns.len(),
        });
    }

    let mut seen = std::collections::HashSet::with_capacity(props.rows.len());
    for row in &props.rows {
        check_size(&format!("row \"{}\"", row.row_id), row.height)?;
        if !seen.insert(row.row_id.as_str()) {
            return Err(GridError::DuplicateRowId(row.row_id.clone()));
        }
    }

    let mut seen = std::collections::HashSet::with_capacity(props.columns.len());
    for column in &props.columns {
        check_size(&format!("column \"{}\"", column.column_id), column.width)?;
        if !seen.insert(column.column_id.as_str()) {
            return Err(GridError::DuplicateColumnId(column.column_id.clone()));
        }
    }
    Ok(())
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

    fn props(rows: usize, columns: usize) -> GridProps {
        GridProps::new(
            (0..rows).map(|i| RowDef::new(format!("r{i}"))).collect(),
            (0..columns).map(|i| ColumnDef::new(format!("c{i}"))).collect(),
        )
    }

    fn build(props: GridProps) -> CellMatrix {
        CellMatrixBuilder::new(PropsHandle::new(props))
            .unwrap()
            .fill_rows_and_columns()
            .fill_sticky()
            .fill_scrollable_range()
            .set_edge_locations()
    }

    #[test]
    fn test_pane_offset() {
        assert_eq!(pane_offset(0, 0, None), 0.0);
        assert_eq!(pane_offset(1, 0, Some(25.0)), 25.0);
        assert_eq!(pane_offset(2, 2, Some(50.0)), 0.0);
        assert_eq!(pane_offset(3, 2, Some(25.0)), 25.0);
    }

    #[test]
    fn test_default_sizes() {
        let mut p = props(2, 2);
        p.rows[1].height = Some(0.0);
        let matrix = build(p);

        assert_eq!(matrix.rows[0].height, DEFAULT_ROW_HEIGHT);
        assert_eq!(matrix.rows[1].height, DEFAULT_ROW_HEIGHT);
        assert_eq!(matrix.columns[1].left, DEFAULT_COLUMN_WIDTH);
        assert_eq!(matrix.width, DEFAULT_COLUMN_WIDTH * 2.0);
        assert_eq!(matrix.height, DEFAULT_ROW_HEIGHT * 2.0);
    }

    #[test]
    fn test_sticky_seam_resets_offset() {
        let matrix = build(props(4, 3).with_sticky(2, 1));

        assert_eq!(matrix.rows[1].bottom, DEFAULT_ROW_HEIGHT * 2.0);
        assert_eq!(matrix.rows[2].top, 0.0);
        assert_eq!(matrix.rows[3].top, DEFAULT_ROW_HEIGHT);
        assert_eq!(matrix.columns[0].right, DEFAULT_COLUMN_WIDTH);
        assert_eq!(matrix.columns[1].left, 0.0);
        assert_eq!(matrix.columns[2].left, DEFAULT_COLUMN_WIDTH);

        assert_eq!(matrix.ranges.sticky_top_range.rows.len(), 2);
        assert_eq!(matrix.ranges.sticky_top_range.columns.len(), 3);
        assert_eq!(matrix.ranges.sticky_left_range.rows.len(), 4);
        assert_eq!(matrix.ranges.sticky_left_range.columns.len(), 1);
        assert_eq!(matrix.scrollable_range.rows.len(), 2);
        assert_eq!(matrix.scrollable_range.columns.len(), 2);
    }

    #[test]
    fn test_sticky_equal_to_count() {
        let matrix = build(props(2, 2).with_sticky(2, 2));
        assert!(matrix.scrollable_range.is_empty());
        assert_eq!(matrix.rows[1].top, DEFAULT_ROW_HEIGHT);
    }

    #[test]
    fn test_empty_matrix_has_no_edges() {
        let matrix = build(props(0, 3));
        assert!(matrix.first.is_none());
        assert!(matrix.last.is_none());
        assert!(matrix.scrollable_range.is_empty());
        assert!(matrix.is_empty());
    }

    #[test]
    fn test_rejects_sticky_overflow() {
        let result = CellMatrixBuilder::new(PropsHandle::new(props(2, 2).with_sticky(3, 0)));
        assert!(matches!(
            result,
            Err(GridError::StickyRowsOutOfBounds { sticky: 3, count: 2 })
        ));

        let result = CellMatrixBuilder::new(PropsHandle::new(props(2, 2).with_sticky(0, 5)));
        assert!(matches!(
            result,
            Err(GridError::StickyColumnsOutOfBounds { sticky: 5, count: 2 })
        ));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let mut p = props(2, 1);
        p.rows[1].row_id = "r0".into();
        let result = CellMatrixBuilder::new(PropsHandle::new(p));
        assert!(matches!(result, Err(GridError::DuplicateRowId(id)) if id == "r0"));
    }

    #[test]
    fn test_rejects_invalid_size() {
        let mut p = props(1, 1);
        p.columns[0].width = Some(-4.0);
        assert!(matches!(
            CellMatrixBuilder::new(PropsHandle::new(p)),
            Err(GridError::InvalidSize { .. })
        ));

        let mut p = props(1, 1);
        p.rows[0].height = Some(f32::NAN);
        assert!(CellMatrixBuilder::new(PropsHandle::new(p)).is_err());
    }
}
