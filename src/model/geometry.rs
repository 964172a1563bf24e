use serde::Serialize;

use super::Id;

/// A laid-out row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRow {
    pub row_id: Id,
    pub idx: usize,
    /// Top edge, relative to the pane the row belongs to
    pub top: f32,
    pub height: f32,
    /// Bottom edge (`top + height`)
    pub bottom: f32,
}

/// A laid-out column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridColumn {
    pub column_id: Id,
    pub idx: usize,
    /// Left edge, relative to the pane the column belongs to
    pub left: f32,
    pub width: f32,
    /// Right edge (`left + width`)
    pub right: f32,
}

/// A (row, column) pair resolved against one specific matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub row: GridRow,
    pub column: GridColumn,
}

impl Location {
    pub fn new(row: GridRow, column: GridColumn) -> Self {
        Self { row, column }
    }

    pub fn row_id(&self) -> &str {
        &self.row.row_id
    }

    pub fn column_id(&self) -> &str {
        &self.column.column_id
    }

    /// `(row_idx, column_idx)`
    pub fn indices(&self) -> (usize, usize) {
        (self.row.idx, self.column.idx)
    }
}

/// Rectangular span of rows x columns.
///
/// Rows and columns are stored in index order; a range is empty when either
/// side is empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Range {
    pub rows: Vec<GridRow>,
    pub columns: Vec<GridColumn>,
}

impl Range {
    pub fn new(rows: Vec<GridRow>, columns: Vec<GridColumn>) -> Self {
        Self { rows, columns }
    }

    /// Single-cell range at `location`
    pub fn single(location: &Location) -> Self {
        Self {
            rows: vec![location.row.clone()],
            columns: vec![location.column.clone()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Top-left corner
    pub fn first(&self) -> Option<Location> {
        Some(Location::new(
            self.rows.first()?.clone(),
            self.columns.first()?.clone(),
        ))
    }

    /// Bottom-right corner
    pub fn last(&self) -> Option<Location> {
        Some(Location::new(
            self.rows.last()?.clone(),
            self.columns.last()?.clone(),
        ))
    }

    /// Sum of row heights
    pub fn height(&self) -> f32 {
        self.rows.iter().map(|r| r.height).sum()
    }

    /// Sum of column widths
    pub fn width(&self) -> f32 {
        self.columns.iter().map(|c| c.width).sum()
    }

    /// Whether the location lies within this range (by index).
    pub fn contains(&self, location: &Location) -> bool {
        self.contains_indices(location.row.idx, location.column.idx)
    }

    pub fn contains_indices(&self, row_idx: usize, column_idx: usize) -> bool {
        match (
            self.rows.first(),
            self.rows.last(),
            self.columns.first(),
            self.columns.last(),
        ) {
            (Some(top), Some(bottom), Some(left), Some(right)) => {
                (top.idx..=bottom.idx).contains(&row_idx)
                    && (left.idx..=right.idx).contains(&column_idx)
            }
            _ => false,
        }
    }

    /// Row ids in order, for handing the range across an API boundary
    pub fn row_ids(&self) -> Vec<Id> {
        self.rows.iter().map(|r| r.row_id.clone()).collect()
    }

    pub fn column_ids(&self) -> Vec<Id> {
        self.columns.iter().map(|c| c.column_id.clone()).collect()
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

    fn row(idx: usize, top: f32, height: f32) -> GridRow {
        GridRow {
            row_id: format!("r{idx}"),
            idx,
            top,
            height,
            bottom: top + height,
        }
    }

    fn col(idx: usize, left: f32, width: f32) -> GridColumn {
        GridColumn {
            column_id: format!("c{idx}"),
            idx,
            left,
            width,
            right: left + width,
        }
    }

    #[test]
    fn test_range_corners_and_size() {
        let range = Range::new(
            vec![row(1, 0.0, 20.0), row(2, 20.0, 30.0)],
            vec![col(3, 0.0, 50.0), col(4, 50.0, 60.0)],
        );

        assert_eq!(range.first().unwrap().indices(), (1, 3));
        assert_eq!(range.last().unwrap().indices(), (2, 4));
        assert_eq!(range.height(), 50.0);
        assert_eq!(range.width(), 110.0);
    }

    #[test]
    fn test_range_contains() {
        let range = Range::new(vec![row(1, 0.0, 20.0)], vec![col(1, 0.0, 50.0)]);
        let inside = Location::new(row(1, 0.0, 20.0), col(1, 0.0, 50.0));
        let outside = Location::new(row(0, 0.0, 20.0), col(1, 0.0, 50.0));

        assert!(range.contains(&inside));
        assert!(!range.contains(&outside));
    }

    #[test]
    fn test_empty_range() {
        let range = Range::new(vec![row(0, 0.0, 20.0)], Vec::new());
        assert!(range.is_empty());
        assert!(range.first().is_none());
        assert!(!range.contains_indices(0, 0));
    }
}
