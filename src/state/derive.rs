//! State derivation: reconcile a [`State`] with a (possibly new)
//! configuration.
//!
//! The pass is a fold over a fixed list of steps. Each step is a pure
//! function of the pass context and the state produced by the previous step,
//! and redoes work only when its input changed. "Changed" for the
//! configuration means a different [`PropsHandle`] identity, decided once
//! before the first step runs so every step of the pass agrees on it.

use std::rc::Rc;

use super::{focus_location, recalc_visible_range, revalidate_selection, State};
use crate::matrix::CellMatrix;
use crate::model::PropsHandle;
use crate::templates::CellTemplates;

/// Inputs shared by every step of one pass
struct Derivation<'a> {
    props: &'a PropsHandle,
    /// No matrix yet, or the matrix was built from another configuration
    data_changed: bool,
}

type Step = fn(&Derivation<'_>, State) -> State;

const STEPS: [(&str, Step); 6] = [
    ("update_state_props", update_state_props),
    ("append_cell_templates_and_highlights", append_cell_templates_and_highlights),
    ("update_cell_matrix", update_cell_matrix),
    ("update_focused_location", update_focused_location),
    ("update_visible_range", update_visible_range),
    ("set_initial_focus_location", set_initial_focus_location),
];

/// Produce the state for `props`, starting from `state`.
///
/// Running it again with the same handle and its own output is a no-op.
pub fn derive_state(props: &PropsHandle, state: State) -> State {
    let derivation = Derivation {
        props,
        data_changed: data_has_changed(props, &state),
    };
    tracing::trace!(
        target: "cellgrid.derive",
        data_changed = derivation.data_changed,
        "derive_state"
    );
    STEPS.iter().fold(state, |state, (name, step)| {
        tracing::trace!(target: "cellgrid.derive", step = *name);
        step(&derivation, state)
    })
}

fn data_has_changed(props: &PropsHandle, state: &State) -> bool {
    !state
        .cell_matrix
        .as_ref()
        .is_some_and(|matrix| matrix.props == *props)
}

fn update_state_props(d: &Derivation<'_>, state: State) -> State {
    if state.props.as_ref() == Some(d.props) {
        return state;
    }
    State {
        props: Some(d.props.clone()),
        ..state
    }
}

fn append_cell_templates_and_highlights(d: &Derivation<'_>, state: State) -> State {
    let templates = CellTemplates::merged(&d.props.locale, &d.props.custom_cell_templates);
    let cell_templates = if *state.cell_templates == templates {
        state.cell_templates
    } else {
        Rc::new(templates)
    };
    let highlight_locations = if state.highlight_locations == d.props.highlights {
        state.highlight_locations
    } else {
        d.props.highlights.clone()
    };
    State {
        cell_templates,
        highlight_locations,
        ..state
    }
}

fn update_cell_matrix(d: &Derivation<'_>, state: State) -> State {
    if !d.data_changed {
        return state;
    }
    match CellMatrix::build(d.props) {
        Ok(matrix) => State {
            cell_matrix: Some(Rc::new(matrix)),
            ..state
        },
        Err(error) => {
            tracing::error!(
                target: "cellgrid.derive",
                %error,
                "rejected configuration; keeping previous cell matrix"
            );
            state
        }
    }
}

/// Keep focus and selection pointing at existing cells. Skipped mid-edit so
/// a geometry change cannot pull focus away from the edited cell; the edit
/// session revalidates when it ends.
fn update_focused_location(_d: &Derivation<'_>, state: State) -> State {
    if state.is_editing() {
        return state;
    }
    revalidate_selection(state)
}

fn update_visible_range(d: &Derivation<'_>, state: State) -> State {
    if state.visible_range.is_some() && d.data_changed {
        recalc_visible_range(state)
    } else {
        state
    }
}

fn set_initial_focus_location(d: &Derivation<'_>, state: State) -> State {
    let Some(requested) = d.props.focus_location.as_ref() else {
        return state;
    };
    if state.focused_location.is_some() {
        return state;
    }
    let Some(matrix) = state.operable_matrix() else {
        return state;
    };
    match matrix.get_location_by_id(&requested.row_id, &requested.column_id) {
        Ok(location) => focus_location(state, &location),
        Err(error) => {
            tracing::warn!(target: "cellgrid.derive", %error, "initial focus location not found");
            state
        }
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
    use crate::matrix::Viewport;
    use crate::model::{CellLocation, ColumnDef, GridProps, RowDef};
    use crate::state::set_viewport;

    fn props(rows: usize, columns: usize) -> GridProps {
        GridProps::new(
            (0..rows).map(|i| RowDef::new(format!("r{i}"))).collect(),
            (0..columns).map(|i| ColumnDef::new(format!("c{i}"))).collect(),
        )
    }

    #[test]
    fn test_matrix_rebuilt_only_on_new_handle() {
        let handle = PropsHandle::new(props(3, 3));
        let first = derive_state(&handle, State::new());
        let second = derive_state(&handle, first.clone());
        assert!(Rc::ptr_eq(
            first.cell_matrix.as_ref().unwrap(),
            second.cell_matrix.as_ref().unwrap()
        ));
        assert!(Rc::ptr_eq(&first.cell_templates, &second.cell_templates));

        let equal_data = PropsHandle::new(props(3, 3));
        let third = derive_state(&equal_data, second.clone());
        assert!(!Rc::ptr_eq(
            second.cell_matrix.as_ref().unwrap(),
            third.cell_matrix.as_ref().unwrap()
        ));
    }

    #[test]
    fn test_visible_range_follows_new_geometry() {
        let small = PropsHandle::new(props(2, 2));
        let state = derive_state(&small, State::new());
        let state = set_viewport(state, Viewport::new(1000.0, 1000.0));
        assert_eq!(state.visible_range.as_ref().unwrap().rows.len(), 2);

        let bigger = PropsHandle::new(props(10, 2));
        let state = derive_state(&bigger, state);
        assert_eq!(state.visible_range.as_ref().unwrap().rows.len(), 10);
    }

    #[test]
    fn test_invalid_configuration_keeps_previous_matrix() {
        let good = PropsHandle::new(props(2, 2));
        let state = derive_state(&good, State::new());
        let bad = PropsHandle::new(props(2, 2).with_sticky(5, 0));
        let next = derive_state(&bad, state.clone());
        assert_eq!(next.cell_matrix, state.cell_matrix);
        assert_eq!(next.props, Some(bad));
    }

    #[test]
    fn test_unknown_initial_focus_is_ignored() {
        let handle = PropsHandle::new(props(2, 2).with_focus(CellLocation::new("nope", "c0")));
        let state = derive_state(&handle, State::new());
        assert!(state.focused_location.is_none());
    }
}
