//! Geometry properties of built cell matrices: edges, sticky seams,
//! lookups and the scrollable range.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use cellgrid::{CellMatrix, ColumnDef, GridError, GridProps, PropsHandle, RowDef};
use test_case::test_case;

fn build(props: GridProps) -> CellMatrix {
    CellMatrix::build(&PropsHandle::new(props)).unwrap()
}

fn sized(row_heights: &[f32], column_widths: &[f32]) -> GridProps {
    GridProps::new(
        row_heights
            .iter()
            .enumerate()
            .map(|(i, &h)| RowDef::new(format!("r{i}")).with_height(h))
            .collect(),
        column_widths
            .iter()
            .enumerate()
            .map(|(i, &w)| ColumnDef::new(format!("c{i}")).with_width(w))
            .collect(),
    )
}

#[test]
fn test_two_row_scenario() {
    let m = build(sized(&[20.0, 30.0], &[50.0]));
    assert_eq!((m.rows[0].top, m.rows[0].bottom), (0.0, 20.0));
    assert_eq!((m.rows[1].top, m.rows[1].bottom), (20.0, 50.0));
    assert_eq!(m.height, 50.0);
    assert_eq!(m.width, 50.0);
}

#[test]
fn test_far_edges_follow_sizes() {
    let m = build(sized(&[10.0, 0.0, 33.5, 12.0], &[70.0, 0.0, 5.0]).with_sticky(1, 2));
    for row in &m.rows {
        assert_eq!(row.bottom, row.top + row.height);
    }
    for column in &m.columns {
        assert_eq!(column.right, column.left + column.width);
    }
}

#[test]
fn test_default_sizes() {
    let m = build(common::text_grid(2, 2));
    assert_eq!(m.rows[0].height, cellgrid::matrix::DEFAULT_ROW_HEIGHT);
    assert_eq!(m.columns[1].width, cellgrid::matrix::DEFAULT_COLUMN_WIDTH);
}

#[test_case(1 ; "one frozen row")]
#[test_case(2 ; "two frozen rows")]
#[test_case(3 ; "three frozen rows")]
fn test_sticky_row_seam(k: usize) {
    let heights = [10.0, 20.0, 30.0, 40.0, 50.0];
    let m = build(sized(&heights, &[100.0]).with_sticky(k, 0));
    let frozen: f32 = heights[..k].iter().sum();
    assert_eq!(m.rows[k].top, 0.0);
    assert_eq!(m.rows[k - 1].bottom, frozen);
    assert_eq!(m.sticky_top_height(), frozen);
}

#[test_case(1 ; "one frozen column")]
#[test_case(2 ; "two frozen columns")]
fn test_sticky_column_seam(k: usize) {
    let widths = [60.0, 70.0, 80.0, 90.0];
    let m = build(sized(&[25.0], &widths).with_sticky(0, k));
    let frozen: f32 = widths[..k].iter().sum();
    assert_eq!(m.columns[k].left, 0.0);
    assert_eq!(m.columns[k - 1].right, frozen);
    assert_eq!(m.sticky_left_width(), frozen);
}

#[test]
fn test_index_lookups_match_positions() {
    let m = build(common::text_grid(6, 4));
    for row in &m.rows {
        assert_eq!(m.row_index_lookup[&row.row_id], row.idx);
    }
    for column in &m.columns {
        assert_eq!(m.column_index_lookup[&column.column_id], column.idx);
    }
}

#[test_case(0, 0 ; "no sticky panes")]
#[test_case(1, 0 ; "sticky rows only")]
#[test_case(0, 2 ; "sticky columns only")]
#[test_case(2, 1 ; "both")]
#[test_case(4, 3 ; "everything frozen")]
fn test_scrollable_range(top: usize, left: usize) {
    let m = build(common::text_grid(4, 3).with_sticky(top, left));
    assert_eq!(m.scrollable_range.rows, m.rows[top..].to_vec());
    assert_eq!(m.scrollable_range.columns, m.columns[left..].to_vec());
}

#[test]
fn test_edge_locations() {
    let m = build(common::text_grid(3, 5));
    assert_eq!(m.first.as_ref().unwrap().indices(), (0, 0));
    assert_eq!(m.last.as_ref().unwrap().indices(), (2, 4));
}

#[test_case(0, 3 ; "no rows")]
#[test_case(3, 0 ; "no columns")]
fn test_degenerate_matrix(rows: usize, columns: usize) {
    let m = build(common::text_grid(rows, columns));
    assert!(m.is_empty());
    assert!(m.first.is_none());
    assert!(m.last.is_none());
    assert!(m.scrollable_range.is_empty());
}

#[test]
fn test_validate_location_clamps_removed_rows() {
    let big = build(common::text_grid(10, 3));
    let small = build(common::text_grid(4, 3));
    let stale = big.get_location(8, 2).unwrap();
    let clamped = small.validate_location(&stale).unwrap();
    assert_eq!(clamped.indices(), (3, 2));
}

#[test]
fn test_rejects_invalid_definitions() {
    let duplicate = GridProps::new(
        vec![RowDef::new("r0"), RowDef::new("r0")],
        vec![ColumnDef::new("c0")],
    );
    assert!(matches!(
        CellMatrix::build(&PropsHandle::new(duplicate)),
        Err(GridError::DuplicateRowId(_))
    ));

    let negative = sized(&[-1.0], &[10.0]);
    assert!(matches!(
        CellMatrix::build(&PropsHandle::new(negative)),
        Err(GridError::InvalidSize { .. })
    ));

    let overflow = common::text_grid(2, 2).with_sticky(3, 0);
    assert!(matches!(
        CellMatrix::build(&PropsHandle::new(overflow)),
        Err(GridError::StickyRowsOutOfBounds { .. })
    ));
}
