//! Grid state snapshot and the pure transitions over it.
//!
//! A [`State`] is never mutated in place: every operation takes a state by
//! value and returns the next one. Heavy substructures (the matrix, the
//! template registry) sit behind `Rc`, so unchanged parts are shared between
//! consecutive snapshots and a state held by a caller stays a consistent
//! read of an earlier instant.
//!
//! This module handles:
//! - The derivation pipeline reconciling state with a new configuration
//! - Focus, selection and visible-range collaborators
//! - Keyboard handling and the single-cell edit session

mod derive;
mod edit;
mod focus;

pub use derive::derive_state;
pub use edit::{
    cancel_edit, clear_selection, commit_edit, handle_key_down, update_edited_cell, CellChange,
    Transition,
};
pub(crate) use focus::revalidate_selection;
pub use focus::{
    focus_location, get_active_selected_range, recalc_visible_range, select_all, select_range,
    set_viewport,
};

use std::rc::Rc;

use crate::error::{GridError, Result};
use crate::matrix::{CellMatrix, Viewport};
use crate::model::{CompatibleCell, Highlight, Location, PropsHandle, Range};
use crate::templates::{CellTemplate, CellTemplates};

/// Full UI snapshot
#[derive(Debug, Clone, PartialEq, Default)]
pub struct State {
    /// Configuration last adopted by the pipeline
    pub props: Option<PropsHandle>,
    /// Geometry of the last configuration that built successfully
    pub cell_matrix: Option<Rc<CellMatrix>>,
    pub focused_location: Option<Location>,
    /// Scrolled-into-view part of the scrollable range, once computed
    pub visible_range: Option<Range>,
    pub highlight_locations: Vec<Highlight>,
    pub cell_templates: Rc<CellTemplates>,
    /// Working copy of the cell being edited; `Some` means edit mode
    pub currently_edited_cell: Option<CompatibleCell>,
    pub selected_ranges: Vec<Range>,
    pub active_selected_range_idx: usize,
    pub viewport: Viewport,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn is_editing(&self) -> bool {
        self.currently_edited_cell.is_some()
    }

    /// The matrix, when it has at least one addressable cell
    pub fn operable_matrix(&self) -> Option<&Rc<CellMatrix>> {
        self.cell_matrix.as_ref().filter(|m| !m.is_empty())
    }

    /// Canonical cell at `location` together with its template.
    ///
    /// The row and column are looked up by id in the current matrix, so a
    /// location held across a configuration change reads the cell it names.
    pub fn cell_at(&self, location: &Location) -> Result<(CompatibleCell, &dyn CellTemplate)> {
        let matrix = self
            .cell_matrix
            .as_ref()
            .ok_or_else(|| GridError::Other("no cell matrix".to_string()))?;
        let (row_idx, column_idx) = matrix
            .get_location_by_id(location.row_id(), location.column_id())?
            .indices();
        let raw = matrix
            .props
            .cell(row_idx, column_idx)
            .ok_or_else(|| GridError::MissingCell {
                row_id: location.row_id().to_string(),
                column_id: location.column_id().to_string(),
            })?;
        let template = self.cell_templates.for_cell(raw)?;
        Ok((template.normalize(raw), template))
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
    use crate::model::{Cell, ColumnDef, GridProps, RowDef};

    #[test]
    fn test_cell_at_normalizes() {
        let props = PropsHandle::new(GridProps::new(
            vec![RowDef::new("r0").with_cells(vec![Cell::number(4.0)])],
            vec![ColumnDef::new("c0"), ColumnDef::new("c1")],
        ));
        let state = derive_state(&props, State::new());
        let matrix = state.cell_matrix.clone().unwrap();

        let (cell, _) = state.cell_at(&matrix.get_location(0, 0).unwrap()).unwrap();
        assert_eq!(cell.text, "4");

        let missing = state.cell_at(&matrix.get_location(0, 1).unwrap());
        assert!(matches!(missing, Err(GridError::MissingCell { .. })));
    }
}
