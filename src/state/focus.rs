use super::State;
use crate::matrix::Viewport;
use crate::model::{Location, Range};

/// Focus `location`, resetting the selection to that single cell.
///
/// The location is revalidated against the current matrix first. Any edit
/// in progress is dropped; commit it beforehand to keep it.
pub fn focus_location(state: State, location: &Location) -> State {
    let Some(location) = state
        .operable_matrix()
        .and_then(|m| m.validate_location(location))
    else {
        return state;
    };
    tracing::trace!(
        target: "cellgrid.derive",
        row_id = location.row_id(),
        column_id = location.column_id(),
        "focus"
    );
    State {
        selected_ranges: vec![Range::single(&location)],
        active_selected_range_idx: 0,
        focused_location: Some(location),
        currently_edited_cell: None,
        ..state
    }
}

/// Re-resolve focus and selection against the current matrix.
///
/// Focus follows [`CellMatrix::validate_location`]. Selected ranges keep
/// the rows and columns that still exist; a selection that vanished
/// entirely collapses onto the focused cell.
///
/// [`CellMatrix::validate_location`]: crate::matrix::CellMatrix::validate_location
pub(crate) fn revalidate_selection(state: State) -> State {
    let Some(matrix) = state.operable_matrix().cloned() else {
        return state;
    };
    let focused_location = state
        .focused_location
        .as_ref()
        .and_then(|l| matrix.validate_location(l));
    let mut selected_ranges: Vec<Range> = state
        .selected_ranges
        .iter()
        .map(|r| matrix.resolve_range(r))
        .filter(|r| !r.is_empty())
        .collect();
    if selected_ranges.is_empty() && !state.selected_ranges.is_empty() {
        selected_ranges.extend(focused_location.as_ref().map(Range::single));
    }
    let active_selected_range_idx = state
        .active_selected_range_idx
        .min(selected_ranges.len().saturating_sub(1));

    if focused_location == state.focused_location
        && selected_ranges == state.selected_ranges
        && active_selected_range_idx == state.active_selected_range_idx
    {
        return state;
    }
    tracing::debug!(
        target: "cellgrid.derive",
        from = ?state.focused_location.as_ref().map(Location::indices),
        to = ?focused_location.as_ref().map(Location::indices),
        ranges = selected_ranges.len(),
        "selection revalidated"
    );
    State {
        focused_location,
        selected_ranges,
        active_selected_range_idx,
        ..state
    }
}

/// The selection range keyboard and clipboard operations act on.
pub fn get_active_selected_range(state: &State) -> Option<&Range> {
    state
        .selected_ranges
        .get(state.active_selected_range_idx)
        .filter(|r| !r.is_empty())
}

/// Select the rectangle between two corners, keeping focus on `start`.
pub fn select_range(state: State, start: &Location, end: &Location) -> State {
    let Some(matrix) = state.operable_matrix().cloned() else {
        return state;
    };
    let (Some(start), Some(end)) = (matrix.validate_location(start), matrix.validate_location(end))
    else {
        return state;
    };
    let range = matrix.get_range(&start, &end);
    State {
        focused_location: Some(start),
        selected_ranges: vec![range],
        active_selected_range_idx: 0,
        ..state
    }
}

/// Select every cell, keeping the current focus.
pub fn select_all(state: State) -> State {
    let Some(matrix) = state.operable_matrix().cloned() else {
        return state;
    };
    let whole = Range::new(matrix.rows.clone(), matrix.columns.clone());
    State {
        selected_ranges: vec![whole],
        active_selected_range_idx: 0,
        ..state
    }
}

/// Recompute the visible range from the viewport and the current matrix.
pub fn recalc_visible_range(state: State) -> State {
    let Some(matrix) = state.operable_matrix() else {
        return state;
    };
    let visible_range = state.viewport.visible_range(matrix);
    tracing::trace!(
        target: "cellgrid.derive",
        rows = visible_range.rows.len(),
        columns = visible_range.columns.len(),
        "visible_range"
    );
    State {
        visible_range: Some(visible_range),
        ..state
    }
}

/// Adopt new scroll offsets/size and recompute the visible range.
pub fn set_viewport(state: State, viewport: Viewport) -> State {
    recalc_visible_range(state.with_viewport(viewport))
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
    use crate::state::derive_state;

    fn state(rows: usize, columns: usize) -> State {
        let props = PropsHandle::new(GridProps::new(
            (0..rows).map(|i| RowDef::new(format!("r{i}"))).collect(),
            (0..columns).map(|i| ColumnDef::new(format!("c{i}"))).collect(),
        ));
        derive_state(&props, State::new())
    }

    #[test]
    fn test_focus_resets_selection() {
        let s = state(3, 3);
        let loc = s.cell_matrix.as_ref().unwrap().get_location(1, 2).unwrap();
        let s = focus_location(s, &loc);
        assert_eq!(s.focused_location.as_ref().unwrap().indices(), (1, 2));
        let range = get_active_selected_range(&s).unwrap();
        assert!(range.contains(&loc));
        assert_eq!(range.rows.len(), 1);
    }

    #[test]
    fn test_focus_on_empty_matrix_is_noop() {
        let full = state(2, 2);
        let loc = full.cell_matrix.as_ref().unwrap().get_location(0, 0).unwrap();
        let empty = state(0, 0);
        let after = focus_location(empty.clone(), &loc);
        assert_eq!(after, empty);
    }

    #[test]
    fn test_select_range_and_all() {
        let s = state(4, 4);
        let m = s.cell_matrix.clone().unwrap();
        let s = select_range(s, &m.get_location(2, 2).unwrap(), &m.get_location(0, 1).unwrap());
        let range = get_active_selected_range(&s).unwrap();
        assert_eq!((range.rows.len(), range.columns.len()), (3, 2));
        assert_eq!(s.focused_location.as_ref().unwrap().indices(), (2, 2));

        let s = select_all(s);
        let range = get_active_selected_range(&s).unwrap();
        assert_eq!((range.rows.len(), range.columns.len()), (4, 4));
    }

    #[test]
    fn test_set_viewport_recalculates() {
        let s = state(100, 3);
        let s = set_viewport(s, Viewport::new(300.0, 100.0).scrolled_to(0.0, 50.0));
        let visible = s.visible_range.as_ref().unwrap();
        assert_eq!(visible.rows.first().unwrap().idx, 2);
        assert_eq!(visible.rows.len(), 4);
    }
}
