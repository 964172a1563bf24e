//! Keyboard handling and the edit session.
//!
//! At most one cell is edited at a time: [`State::currently_edited_cell`]
//! holds its working copy and the focused location says which cell it is.
//! Cell data is owned by the caller, so committed edits are reported as
//! [`CellChange`]s rather than written anywhere.

use serde::Serialize;

use super::{focus_location, get_active_selected_range, revalidate_selection, select_all, State};
use crate::error::Result;
use crate::model::{Cell, CompatibleCell, Id, Location};
use crate::templates::keys::{self, KeyChord};

/// A cell value the caller should store
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellChange {
    pub row_id: Id,
    pub column_id: Id,
    pub previous_cell: CompatibleCell,
    pub new_cell: CompatibleCell,
}

/// Next state plus the cell changes produced on the way
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: State,
    pub changes: Vec<CellChange>,
}

impl Transition {
    pub fn unchanged(state: State) -> Self {
        Self {
            state,
            changes: Vec::new(),
        }
    }

    /// Map the state without producing changes.
    #[must_use]
    pub fn map(self, f: impl FnOnce(State) -> State) -> Self {
        Self {
            state: f(self.state),
            changes: self.changes,
        }
    }
}

/// Merge `incoming` into the cell at `location` and record the change if the
/// canonical cell differs.
fn merge_into(
    state: &State,
    location: &Location,
    incoming: &CompatibleCell,
) -> Result<Option<CellChange>> {
    let (previous, template) = state.cell_at(location)?;
    let merged = template.merge(&previous, incoming);
    Ok((merged != previous).then(|| CellChange {
        row_id: location.row_id().to_string(),
        column_id: location.column_id().to_string(),
        previous_cell: previous,
        new_cell: merged,
    }))
}

/// Finish the edit session, reporting the merged cell.
///
/// Focus and selection are revalidated afterwards, since derivation leaves
/// them alone while a cell is being edited.
pub fn commit_edit(state: State) -> Transition {
    let (Some(edited), Some(location)) = (
        state.currently_edited_cell.as_ref(),
        state.focused_location.as_ref(),
    ) else {
        return Transition::unchanged(state);
    };
    let changes: Vec<_> = match merge_into(&state, location, edited) {
        Ok(change) => change.into_iter().collect(),
        Err(error) => {
            tracing::warn!(
                target: "cellgrid.keys",
                %error,
                row_id = location.row_id(),
                column_id = location.column_id(),
                "edited cell is gone; edit dropped"
            );
            Vec::new()
        }
    };
    tracing::debug!(target: "cellgrid.keys", changed = !changes.is_empty(), "commit_edit");
    Transition {
        state: revalidate_selection(State {
            currently_edited_cell: None,
            ..state
        }),
        changes,
    }
}

/// Leave edit mode, dropping the working copy.
pub fn cancel_edit(state: State) -> State {
    if !state.is_editing() {
        return state;
    }
    tracing::debug!(target: "cellgrid.keys", "cancel_edit");
    revalidate_selection(State {
        currently_edited_cell: None,
        ..state
    })
}

/// Editor change sink: store the working copy, committing when asked.
pub fn update_edited_cell(state: State, cell: CompatibleCell, commit: bool) -> Transition {
    if state.focused_location.is_none() {
        return Transition::unchanged(state);
    }
    let state = State {
        currently_edited_cell: Some(cell),
        ..state
    };
    if commit {
        commit_edit(state)
    } else {
        Transition::unchanged(state)
    }
}

/// Route a key press that reached the grid.
///
/// In edit mode only the session keys matter: Enter and Tab commit (and
/// move), Escape cancels; everything else belongs to the editor. In view
/// mode navigation keys move focus, Delete/Backspace clear the selection,
/// and any other key goes to the focused cell's template.
pub fn handle_key_down(state: State, chord: KeyChord) -> Transition {
    if state.operable_matrix().is_none() || state.focused_location.is_none() {
        return Transition::unchanged(state);
    }
    let key = chord.key_code;
    let m = chord.modifiers;
    tracing::trace!(target: "cellgrid.keys", key, editing = state.is_editing(), "key_down");

    if state.is_editing() {
        return match key {
            keys::ENTER => commit_edit(state).map(|s| move_focus(s, if m.shift { -1 } else { 1 }, 0)),
            keys::TAB => commit_edit(state).map(|s| move_focus(s, 0, if m.shift { -1 } else { 1 })),
            keys::ESCAPE => Transition::unchanged(cancel_edit(state)),
            _ => Transition::unchanged(state),
        };
    }

    match key {
        keys::LEFT_ARROW => Transition::unchanged(move_focus(state, 0, -1)),
        keys::RIGHT_ARROW => Transition::unchanged(move_focus(state, 0, 1)),
        keys::UP_ARROW => Transition::unchanged(move_focus(state, -1, 0)),
        keys::DOWN_ARROW => Transition::unchanged(move_focus(state, 1, 0)),
        keys::TAB => Transition::unchanged(move_focus(state, 0, if m.shift { -1 } else { 1 })),
        keys::PAGE_UP => {
            let page = page_size(&state);
            Transition::unchanged(move_focus(state, -page, 0))
        }
        keys::PAGE_DOWN => {
            let page = page_size(&state);
            Transition::unchanged(move_focus(state, page, 0))
        }
        keys::HOME => Transition::unchanged(jump(state, m.ctrl, Edge::Start)),
        keys::END => Transition::unchanged(jump(state, m.ctrl, Edge::End)),
        keys::A if m.ctrl => Transition::unchanged(select_all(state)),
        keys::DELETE | keys::BACKSPACE => clear_selection(state),
        _ => dispatch_to_template(state, chord),
    }
}

fn dispatch_to_template(state: State, chord: KeyChord) -> Transition {
    let Some(location) = state.focused_location.clone() else {
        return Transition::unchanged(state);
    };
    let (cell, template) = match state.cell_at(&location) {
        Ok(found) => found,
        Err(error) => {
            tracing::warn!(target: "cellgrid.keys", %error, "no template for focused cell");
            return Transition::unchanged(state);
        }
    };
    let outcome = template.handle_key(&cell, chord.key_code, chord.modifiers);
    if outcome.enable_edit_mode {
        tracing::debug!(
            target: "cellgrid.keys",
            row_id = location.row_id(),
            column_id = location.column_id(),
            "enter edit mode"
        );
        return Transition::unchanged(State {
            currently_edited_cell: Some(outcome.cell),
            ..state
        });
    }
    let changes = if outcome.cell == cell {
        Vec::new()
    } else {
        vec![CellChange {
            row_id: location.row_id().to_string(),
            column_id: location.column_id().to_string(),
            previous_cell: cell,
            new_cell: outcome.cell,
        }]
    };
    Transition { state, changes }
}

/// Empty every cell of the active selection through its template.
pub fn clear_selection(state: State) -> Transition {
    let Some(range) = get_active_selected_range(&state) else {
        return Transition::unchanged(state);
    };
    let blank = CompatibleCell::new(Cell::text(""), "", f64::NAN);
    let changes = range
        .rows
        .iter()
        .flat_map(|row| {
            range
                .columns
                .iter()
                .map(move |column| Location::new(row.clone(), column.clone()))
        })
        .filter_map(|location| match merge_into(&state, &location, &blank) {
            Ok(change) => change,
            Err(error) => {
                tracing::debug!(target: "cellgrid.keys", %error, "cell not writable");
                None
            }
        })
        .collect();
    Transition { state, changes }
}

fn move_focus(state: State, row_delta: isize, column_delta: isize) -> State {
    let (Some(matrix), Some(focused)) = (state.operable_matrix(), state.focused_location.as_ref())
    else {
        return state;
    };
    let (row_idx, column_idx) = focused.indices();
    let row_idx = row_idx
        .saturating_add_signed(row_delta)
        .min(matrix.rows.len().saturating_sub(1));
    let column_idx = column_idx
        .saturating_add_signed(column_delta)
        .min(matrix.columns.len().saturating_sub(1));
    match matrix.get_location(row_idx, column_idx) {
        Some(target) => focus_location(state, &target),
        None => state,
    }
}

enum Edge {
    Start,
    End,
}

/// Home/End: along the row, or to the grid corner with the primary modifier.
fn jump(state: State, to_corner: bool, edge: Edge) -> State {
    let (Some(matrix), Some(focused)) = (state.operable_matrix(), state.focused_location.as_ref())
    else {
        return state;
    };
    let target = match (edge, to_corner) {
        (Edge::Start, true) => matrix.first.clone(),
        (Edge::End, true) => matrix.last.clone(),
        (Edge::Start, false) => matrix.get_location(focused.row.idx, 0),
        (Edge::End, false) => {
            matrix.get_location(focused.row.idx, matrix.columns.len().saturating_sub(1))
        }
    };
    match target {
        Some(target) => focus_location(state, &target),
        None => state,
    }
}

/// Rows in the visible scrollable window, at least one.
fn page_size(state: &State) -> isize {
    let rows = state.visible_range.as_ref().map_or(0, |r| r.rows.len());
    isize::try_from(rows.max(1)).unwrap_or(1)
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
    use crate::model::{CellLocation, ColumnDef, GridProps, PropsHandle, RowDef};
    use crate::state::derive_state;
    use crate::templates::Modifiers;

    fn state() -> State {
        let props = GridProps::new(
            vec![
                RowDef::new("r0").with_cells(vec![Cell::text("a"), Cell::checkbox(false)]),
                RowDef::new("r1").with_cells(vec![Cell::number(2.0), Cell::header("h")]),
            ],
            vec![ColumnDef::new("c0"), ColumnDef::new("c1")],
        )
        .with_focus(CellLocation::new("r0", "c0"));
        derive_state(&PropsHandle::new(props), State::new())
    }

    #[test]
    fn test_typing_enters_edit_then_enter_commits() {
        let t = handle_key_down(state(), KeyChord::plain(keys::A + 25));
        assert!(t.changes.is_empty());
        assert_eq!(t.state.currently_edited_cell.as_ref().unwrap().text, "z");

        let t = handle_key_down(t.state, KeyChord::plain(keys::ENTER));
        assert!(!t.state.is_editing());
        assert_eq!(t.changes.len(), 1);
        assert_eq!(t.changes[0].previous_cell.text, "a");
        assert_eq!(t.changes[0].new_cell.text, "z");
        assert_eq!(t.state.focused_location.as_ref().unwrap().indices(), (1, 0));
    }

    #[test]
    fn test_escape_cancels() {
        let t = handle_key_down(state(), KeyChord::plain(keys::A));
        let t = handle_key_down(t.state, KeyChord::plain(keys::ESCAPE));
        assert!(!t.state.is_editing());
        assert!(t.changes.is_empty());
        assert_eq!(t.state.focused_location.as_ref().unwrap().indices(), (0, 0));
    }

    #[test]
    fn test_checkbox_toggle_reports_change_without_edit() {
        let s = handle_key_down(state(), KeyChord::plain(keys::RIGHT_ARROW)).state;
        let t = handle_key_down(s, KeyChord::plain(keys::SPACE));
        assert!(!t.state.is_editing());
        assert_eq!(t.changes.len(), 1);
        assert_eq!(t.changes[0].new_cell.value, 1.0);
    }

    #[test]
    fn test_arrows_clamp_at_edges() {
        let s = handle_key_down(state(), KeyChord::plain(keys::UP_ARROW)).state;
        assert_eq!(s.focused_location.as_ref().unwrap().indices(), (0, 0));
        let s = handle_key_down(s, KeyChord::new(keys::END, Modifiers::CTRL)).state;
        assert_eq!(s.focused_location.as_ref().unwrap().indices(), (1, 1));
    }

    #[test]
    fn test_delete_clears_selection_but_not_headers() {
        let s = select_all(state());
        let t = handle_key_down(s, KeyChord::plain(keys::DELETE));
        let changed: Vec<_> = t
            .changes
            .iter()
            .map(|c| (c.row_id.as_str(), c.column_id.as_str()))
            .collect();
        assert_eq!(changed, vec![("r0", "c0"), ("r1", "c0")]);
    }

    #[test]
    fn test_update_edited_cell_commit() {
        let s = state();
        let (cell, _) = s.cell_at(s.focused_location.as_ref().unwrap()).unwrap();
        let edited = CompatibleCell::new(Cell::text("typed"), "typed", f64::NAN);
        let t = update_edited_cell(s, edited.clone(), false);
        assert_eq!(t.state.currently_edited_cell.as_ref(), Some(&edited));
        assert!(t.changes.is_empty());

        let t = update_edited_cell(t.state, edited, true);
        assert!(!t.state.is_editing());
        assert_eq!(t.changes[0].previous_cell, cell);
        assert_eq!(t.changes[0].new_cell.text, "typed");
    }
}
