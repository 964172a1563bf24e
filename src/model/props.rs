use std::collections::BTreeMap;
use std::ops::Deref;
use std::rc::Rc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Cell;
use crate::error::Result;
use crate::templates::CellTemplate;

/// Stable row/column identifier.
pub type Id = String;

/// A row as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowDef {
    pub row_id: Id,
    /// Height in pixels; `None` (or 0) falls back to the default row height
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    /// Cells of this row, one per column
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cells: Vec<Cell>,
}

impl RowDef {
    pub fn new(row_id: impl Into<Id>) -> Self {
        Self {
            row_id: row_id.into(),
            height: None,
            cells: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_height(mut self, height: f32) -> Self {
        self.height = Some(height);
        self
    }

    #[must_use]
    pub fn with_cells(mut self, cells: Vec<Cell>) -> Self {
        self.cells = cells;
        self
    }
}

/// A column as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    pub column_id: Id,
    /// Width in pixels; `None` (or 0) falls back to the default column width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
}

impl ColumnDef {
    pub fn new(column_id: impl Into<Id>) -> Self {
        Self {
            column_id: column_id.into(),
            width: None,
        }
    }

    #[must_use]
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }
}

/// A cell addressed by stable identifiers rather than indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellLocation {
    pub row_id: Id,
    pub column_id: Id,
}

impl CellLocation {
    pub fn new(row_id: impl Into<Id>, column_id: impl Into<Id>) -> Self {
        Self {
            row_id: row_id.into(),
            column_id: column_id.into(),
        }
    }
}

/// A highlighted cell (e.g. another user's cursor)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub row_id: Id,
    pub column_id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
}

/// Host platform, used to pick the primary shortcut modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Mac,
    #[default]
    Other,
}

/// Locale settings injected into the cell template layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocaleConfig {
    /// chrono format pattern for time cells
    pub time_format: String,
    /// Date that parsed times of day are anchored to
    pub default_date: NaiveDate,
    pub platform: Platform,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            time_format: "%H:%M".to_string(),
            default_date: NaiveDate::default(),
            platform: Platform::Other,
        }
    }
}

/// Caller-supplied templates keyed by cell type tag.
///
/// Entries override built-in templates with the same tag.
#[derive(Clone, Default)]
pub struct CustomTemplates(BTreeMap<String, Rc<dyn CellTemplate>>);

impl CustomTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, tag: impl Into<String>, template: Rc<dyn CellTemplate>) -> Self {
        self.insert(tag, template);
        self
    }

    pub fn insert(&mut self, tag: impl Into<String>, template: Rc<dyn CellTemplate>) {
        self.0.insert(tag.into(), template);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rc<dyn CellTemplate>)> {
        self.0.iter().map(|(tag, t)| (tag.as_str(), t))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for CustomTemplates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

/// Grid definition supplied by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridProps {
    pub rows: Vec<RowDef>,
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub sticky_top_rows: usize,
    #[serde(default)]
    pub sticky_left_columns: usize,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
    /// Cell to focus once, when nothing is focused yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_location: Option<CellLocation>,
    #[serde(default)]
    pub locale: LocaleConfig,
    #[serde(skip)]
    pub custom_cell_templates: CustomTemplates,
}

impl GridProps {
    pub fn new(rows: Vec<RowDef>, columns: Vec<ColumnDef>) -> Self {
        Self {
            rows,
            columns,
            ..Self::default()
        }
    }

    /// Parse a grid definition from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn with_sticky(mut self, top_rows: usize, left_columns: usize) -> Self {
        self.sticky_top_rows = top_rows;
        self.sticky_left_columns = left_columns;
        self
    }

    #[must_use]
    pub fn with_focus(mut self, location: CellLocation) -> Self {
        self.focus_location = Some(location);
        self
    }

    #[must_use]
    pub fn with_highlights(mut self, highlights: Vec<Highlight>) -> Self {
        self.highlights = highlights;
        self
    }

    #[must_use]
    pub fn with_custom_templates(mut self, templates: CustomTemplates) -> Self {
        self.custom_cell_templates = templates;
        self
    }

    /// Raw cell at the given indices, if the row carries one
    pub fn cell(&self, row_idx: usize, column_idx: usize) -> Option<&Cell> {
        self.rows.get(row_idx)?.cells.get(column_idx)
    }
}

/// Shared handle to a [`GridProps`] value.
///
/// Equality is identity: two handles are equal only when they point at the
/// same allocation. Cloning a handle keeps its identity, so an unchanged
/// handle short-circuits matrix rebuilds.
#[derive(Clone)]
pub struct PropsHandle(Rc<GridProps>);

impl PropsHandle {
    pub fn new(props: GridProps) -> Self {
        Self(Rc::new(props))
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl From<GridProps> for PropsHandle {
    fn from(props: GridProps) -> Self {
        Self::new(props)
    }
}

impl Deref for PropsHandle {
    type Target = GridProps;

    fn deref(&self) -> &GridProps {
        &self.0
    }
}

impl PartialEq for PropsHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl std::fmt::Debug for PropsHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropsHandle")
            .field("ptr", &Rc::as_ptr(&self.0))
            .field("rows", &self.0.rows.len())
            .field("columns", &self.0.columns.len())
            .finish()
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

    #[test]
    fn test_props_from_json() {
        let props = GridProps::from_json(
            r#"{
                "rows": [{"rowId": "r0", "height": 20}, {"rowId": "r1"}],
                "columns": [{"columnId": "c0", "width": 50}],
                "stickyTopRows": 1,
                "focusLocation": {"rowId": "r1", "columnId": "c0"},
                "locale": {"timeFormat": "%I:%M %p", "platform": "mac"}
            }"#,
        )
        .unwrap();

        assert_eq!(props.rows.len(), 2);
        assert_eq!(props.rows[0].height, Some(20.0));
        assert_eq!(props.rows[1].height, None);
        assert_eq!(props.sticky_top_rows, 1);
        assert_eq!(props.sticky_left_columns, 0);
        assert_eq!(props.focus_location, Some(CellLocation::new("r1", "c0")));
        assert_eq!(props.locale.time_format, "%I:%M %p");
        assert_eq!(props.locale.platform, Platform::Mac);
        assert_eq!(props.locale.default_date, NaiveDate::default());
    }

    #[test]
    fn test_handle_equality_is_identity() {
        let props = GridProps::new(vec![RowDef::new("r0")], vec![ColumnDef::new("c0")]);
        let a = PropsHandle::new(props.clone());
        let b = a.clone();
        let c = PropsHandle::new(props);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_cell_lookup_out_of_range() {
        let props = GridProps::new(vec![RowDef::new("r0")], vec![ColumnDef::new("c0")]);
        assert!(props.cell(0, 0).is_none());
        assert!(props.cell(5, 0).is_none());
    }
}
