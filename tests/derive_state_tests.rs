//! Derivation pipeline behaviour across configuration changes.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::rc::Rc;

use cellgrid::state::{
    cancel_edit, commit_edit, focus_location, handle_key_down, select_all, set_viewport,
};
use cellgrid::templates::keys;
use cellgrid::templates::keys::KeyChord;
use cellgrid::{
    derive_state, Cell, CellLocation, ColumnDef, GridProps, Highlight, PropsHandle, RowDef, State,
    Viewport,
};
use common::{focused, focused_ids, location, text_grid};

#[test]
fn test_second_pass_is_a_no_op() {
    let handle = PropsHandle::new(
        text_grid(5, 5)
            .with_sticky(1, 1)
            .with_focus(CellLocation::new("r2", "c3"))
            .with_highlights(vec![Highlight {
                row_id: "r1".to_string(),
                column_id: "c1".to_string(),
                border_color: Some("red".to_string()),
            }]),
    );
    let once = derive_state(&handle, State::new());
    let once = set_viewport(once, Viewport::new(300.0, 80.0));
    let twice = derive_state(&handle, once.clone());
    assert_eq!(once, twice);
    assert!(Rc::ptr_eq(&once.cell_templates, &twice.cell_templates));
}

#[test]
fn test_initial_focus_resolved_by_id() {
    let state = focused(text_grid(3, 3), "r1", "c2");
    assert_eq!(focused_ids(&state), ("r1".to_string(), "c2".to_string()));
    assert_eq!(state.selected_ranges.len(), 1);
}

#[test]
fn test_initial_focus_only_applies_once() {
    let handle = PropsHandle::new(text_grid(3, 3).with_focus(CellLocation::new("r0", "c0")));
    let state = derive_state(&handle, State::new());
    let moved = focus_location(state.clone(), &location(&state, 2, 2));

    let next = PropsHandle::new(text_grid(3, 3).with_focus(CellLocation::new("r0", "c0")));
    let state = derive_state(&next, moved);
    assert_eq!(focused_ids(&state), ("r2".to_string(), "c2".to_string()));
}

#[test]
fn test_unknown_initial_focus_is_ignored() {
    let state = focused(text_grid(2, 2), "nope", "c0");
    assert!(state.focused_location.is_none());
    assert!(state.cell_matrix.is_some());
}

#[test]
fn test_shrink_clamps_focus() {
    let state = focused(text_grid(10, 4), "r8", "c3");
    let shrunk = derive_state(&PropsHandle::new(text_grid(5, 2)), state);
    let focused = shrunk.focused_location.as_ref().unwrap();
    assert_eq!(focused.indices(), (4, 1));
    assert_eq!(focused.row_id(), "r4");
}

#[test]
fn test_focus_follows_reordered_row() {
    let state = focused(text_grid(3, 1), "r2", "c0");
    let reordered = GridProps::new(
        vec![RowDef::new("r2"), RowDef::new("r0"), RowDef::new("r1")],
        vec![ColumnDef::new("c0")],
    );
    let state = derive_state(&PropsHandle::new(reordered), state);
    let focused = state.focused_location.as_ref().unwrap();
    assert_eq!(focused.row_id(), "r2");
    assert_eq!(focused.indices(), (0, 0));
}

#[test]
fn test_editing_skips_focus_revalidation() {
    let state = focused(text_grid(10, 2), "r8", "c0");
    let editing = handle_key_down(state, KeyChord::plain(keys::ENTER)).state;
    assert!(editing.is_editing());

    let shrunk = derive_state(&PropsHandle::new(text_grid(3, 2)), editing);
    assert!(shrunk.is_editing());
    assert_eq!(shrunk.focused_location.as_ref().unwrap().row_id(), "r8");
}

#[test]
fn test_visible_range_recomputed_on_change() {
    let state = focused(text_grid(50, 3), "r0", "c0");
    assert!(state.visible_range.is_none());

    let state = set_viewport(state, Viewport::new(1000.0, 100.0));
    assert_eq!(state.visible_range.as_ref().unwrap().rows.len(), 4);

    let taller: GridProps = GridProps::new(
        (0..50)
            .map(|i| RowDef::new(format!("r{i}")).with_height(50.0))
            .collect(),
        (0..3).map(|i| ColumnDef::new(format!("c{i}"))).collect(),
    );
    let state = derive_state(&PropsHandle::new(taller), state);
    assert_eq!(state.visible_range.as_ref().unwrap().rows.len(), 2);
}

#[test]
fn test_empty_grid_is_inert() {
    let state = derive_state(
        &PropsHandle::new(text_grid(0, 4).with_focus(CellLocation::new("r0", "c0"))),
        State::new(),
    );
    assert!(state.cell_matrix.as_ref().unwrap().is_empty());
    assert!(state.focused_location.is_none());
    assert!(state.operable_matrix().is_none());

    let state = set_viewport(state, Viewport::new(100.0, 100.0));
    assert!(state.visible_range.is_none());
}

#[test]
fn test_rejected_definition_keeps_previous_matrix() {
    let state = focused(text_grid(3, 3), "r1", "c1");
    let before = state.cell_matrix.clone().unwrap();

    let bad = PropsHandle::new(text_grid(3, 3).with_sticky(9, 0));
    let state = derive_state(&bad, state);
    assert!(Rc::ptr_eq(state.cell_matrix.as_ref().unwrap(), &before));
    assert_eq!(focused_ids(&state), ("r1".to_string(), "c1".to_string()));
}

/// Single-column grid whose rows hold one text cell reading `"{id}-text"`.
fn named_rows(ids: &[&str]) -> GridProps {
    GridProps::new(
        ids.iter()
            .map(|id| RowDef::new(*id).with_cells(vec![Cell::text(format!("{id}-text"))]))
            .collect(),
        vec![ColumnDef::new("c0")],
    )
}

#[test]
fn test_commit_after_reorder_targets_edited_row() {
    let state = focused(named_rows(&["a", "b"]), "a", "c0");
    let editing = handle_key_down(state, KeyChord::plain(keys::Z)).state;
    assert!(editing.is_editing());

    let reordered = derive_state(&PropsHandle::new(named_rows(&["b", "a"])), editing);
    let t = commit_edit(reordered);

    let changes: Vec<_> = t
        .changes
        .iter()
        .map(|c| (c.row_id.as_str(), c.previous_cell.text.as_str(), c.new_cell.text.as_str()))
        .collect();
    assert_eq!(changes, vec![("a", "a-text", "z")]);
    assert_eq!(focused_ids(&t.state), ("a".to_string(), "c0".to_string()));
    assert_eq!(t.state.focused_location.as_ref().unwrap().indices(), (1, 0));
}

#[test]
fn test_commit_after_edited_row_removed() {
    let state = focused(named_rows(&["a", "b", "c"]), "c", "c0");
    let editing = handle_key_down(state, KeyChord::plain(keys::Z)).state;
    let shrunk = derive_state(&PropsHandle::new(named_rows(&["a"])), editing);

    let t = commit_edit(shrunk);
    assert!(!t.state.is_editing());
    assert!(t.changes.is_empty());
    assert_eq!(focused_ids(&t.state), ("a".to_string(), "c0".to_string()));
    assert_eq!(t.state.selected_ranges[0].row_ids(), vec!["a".to_string()]);
}

#[test]
fn test_cancel_after_edited_row_removed() {
    let state = focused(named_rows(&["a", "b", "c"]), "c", "c0");
    let editing = handle_key_down(state, KeyChord::plain(keys::Z)).state;
    let shrunk = derive_state(&PropsHandle::new(named_rows(&["a", "b"])), editing);

    let state = cancel_edit(shrunk);
    assert!(!state.is_editing());
    assert_eq!(focused_ids(&state), ("b".to_string(), "c0".to_string()));
}

#[test]
fn test_delete_after_reorder_clears_selected_row() {
    let props = |ids: [&str; 2]| {
        GridProps::new(
            ids.iter()
                .map(|id| {
                    let cell = if *id == "h" {
                        Cell::header("title")
                    } else {
                        Cell::text("body")
                    };
                    RowDef::new(*id).with_cells(vec![cell])
                })
                .collect(),
            vec![ColumnDef::new("c0")],
        )
    };
    let state = focused(props(["t", "h"]), "t", "c0");
    let state = derive_state(&PropsHandle::new(props(["h", "t"])), state);
    assert_eq!(state.selected_ranges[0].rows[0].idx, 1);

    let t = handle_key_down(state, KeyChord::plain(keys::DELETE));
    assert_eq!(t.changes.len(), 1);
    assert_eq!(t.changes[0].row_id, "t");
    assert_eq!(t.changes[0].previous_cell.text, "body");
    assert_eq!(t.changes[0].new_cell.text, "");
}

#[test]
fn test_selection_drops_removed_rows() {
    let state = select_all(focused(text_grid(4, 2), "r0", "c0"));
    let state = derive_state(&PropsHandle::new(text_grid(2, 2)), state);

    let range = &state.selected_ranges[state.active_selected_range_idx];
    assert_eq!(range.row_ids(), vec!["r0".to_string(), "r1".to_string()]);
    assert_eq!(range.columns.len(), 2);
}
