//! Clipboard round trips between grids and from foreign applications.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::cell::RefCell;

use cellgrid::clipboard::{handle_copy, handle_paste, ClipboardData, ClipboardEvent, TEXT_MIME};
use cellgrid::state::{select_range, CellChange};
use cellgrid::{derive_state, Cell, CellStyle, CompatibleCell, NumberCell, PropsHandle, Range, State};
use chrono::NaiveDate;

/// Paste into `state`, returning the candidate handed to the applier along
/// with the destination range.
fn paste(event: &mut ClipboardData, state: State) -> Option<(CompatibleCell, Range)> {
    let seen = RefCell::new(None);
    handle_paste(event, state, |state, range, cell| {
        *seen.borrow_mut() = Some((cell, range.clone()));
        state
    });
    seen.into_inner()
}

fn copied(cells: Vec<Cell>) -> (ClipboardData, State) {
    let state = common::focused(common::row_of(cells), "r0", "c0");
    let mut event = ClipboardData::new();
    assert!(handle_copy(&mut event, &state));
    (event, state)
}

#[test]
fn test_round_trip_preserves_type_and_fields() {
    let original = Cell::Number(NumberCell {
        value: Some(12.75),
        hide_zero: true,
        class_name: Some("money".into()),
        style: Some(CellStyle {
            color: Some("green".into()),
            ..CellStyle::default()
        }),
        ..NumberCell::default()
    });
    let (mut event, source) = copied(vec![original]);
    let (expected, _) = source
        .cell_at(&common::location(&source, 0, 0))
        .unwrap();

    let target = common::focused(common::text_grid(3, 3), "r1", "c1");
    let (candidate, range) = paste(&mut event, target).unwrap();
    assert_eq!(candidate, expected);
    assert_eq!(candidate.type_tag(), "number");
    assert_eq!(range.row_ids(), vec!["r1".to_string()]);
    assert!(event.default_prevented());
}

#[test]
fn test_round_trip_time_cell() {
    let at = NaiveDate::from_ymd_opt(2022, 6, 1)
        .unwrap()
        .and_hms_opt(7, 45, 30)
        .unwrap();
    let (mut event, source) = copied(vec![Cell::time(at)]);
    let (expected, _) = source.cell_at(&common::location(&source, 0, 0)).unwrap();
    let (candidate, _) = paste(&mut event, common::focused(common::text_grid(1, 1), "r0", "c0")).unwrap();
    assert_eq!(candidate, expected);
    assert_eq!(candidate.cell.property::<chrono::NaiveDateTime>("time").unwrap(), at);
}

#[test]
fn test_plain_text_number() {
    let mut event = ClipboardData::new().with_text("42");
    let (candidate, _) = paste(&mut event, common::focused(common::text_grid(2, 2), "r0", "c0")).unwrap();
    assert_eq!(candidate.type_tag(), "text");
    assert_eq!(candidate.text, "42");
    assert_eq!(candidate.value, 42.0);
}

#[test]
fn test_plain_text_non_numeric() {
    let mut event = ClipboardData::new().with_text("hello world");
    let (candidate, _) = paste(&mut event, common::focused(common::text_grid(2, 2), "r0", "c0")).unwrap();
    assert_eq!(candidate.text, "hello world");
    assert!(candidate.value.is_nan());
}

#[test]
fn test_malformed_payload_degrades_to_text() {
    let html = concat!(
        r#"<html><body><table data-cellgrid="cellgrid-content"><tbody><tr>"#,
        r#"<td data-cellgrid="{&quot;type&quot;:">3.5<br>units</td>"#,
        r#"</tr></tbody></table></body></html>"#,
    );
    let mut event = ClipboardData::new().with_html(html).with_text("fallback");
    let (candidate, _) = paste(&mut event, common::focused(common::text_grid(1, 1), "r0", "c0")).unwrap();
    assert_eq!(candidate.type_tag(), "text");
    assert_eq!(candidate.text, "3.5\nunits");
    assert_eq!(candidate.value, 3.5);
}

#[test]
fn test_foreign_html_uses_plain_text() {
    let mut event = ClipboardData::new()
        .with_html("<meta charset='utf-8'><table><tr><td>x</td></tr></table>")
        .with_text("7");
    let (candidate, _) = paste(&mut event, common::focused(common::text_grid(1, 1), "r0", "c0")).unwrap();
    assert_eq!(candidate.text, "7");
    assert_eq!(candidate.value, 7.0);
}

#[test]
fn test_no_selection_aborts() {
    let state = common::derived(common::text_grid(2, 2));
    assert!(state.selected_ranges.is_empty());

    let mut event = ClipboardData::new().with_text("ignored");
    let applied = RefCell::new(false);
    let after = handle_paste(&mut event, state.clone(), |state, _, _| {
        *applied.borrow_mut() = true;
        state
    });
    assert!(!*applied.borrow());
    assert_eq!(after, state);
    assert!(!event.default_prevented());
}

#[test]
fn test_destination_is_active_range() {
    let state = common::focused(common::text_grid(4, 4), "r0", "c0");
    let start = common::location(&state, 1, 1);
    let end = common::location(&state, 2, 3);
    let state = select_range(state, &start, &end);

    let mut event = ClipboardData::new().with_text("x");
    let (_, range) = paste(&mut event, state).unwrap();
    assert_eq!(range.row_ids(), vec!["r1".to_string(), "r2".to_string()]);
    assert_eq!(
        range.column_ids(),
        vec!["c1".to_string(), "c2".to_string(), "c3".to_string()]
    );
}

#[test]
fn test_destination_skips_removed_rows() {
    let state = common::focused(common::text_grid(4, 2), "r0", "c0");
    let start = common::location(&state, 1, 0);
    let end = common::location(&state, 3, 1);
    let state = select_range(state, &start, &end);
    let state = derive_state(&PropsHandle::new(common::text_grid(2, 2)), state);

    let mut event = ClipboardData::new().with_text("x");
    let (_, range) = paste(&mut event, state).unwrap();
    assert_eq!(range.row_ids(), vec!["r1".to_string()]);
    assert_eq!(range.column_ids(), vec!["c0".to_string(), "c1".to_string()]);
}

#[test]
fn test_cut_reports_cleared_cells() {
    let state = common::focused(common::text_grid(2, 2), "r0", "c1");
    let mut event = ClipboardData::new();
    let t = cellgrid::clipboard::handle_cut(&mut event, state);
    assert_eq!(event.data(TEXT_MIME).as_deref(), Some("r0c1"));
    let changes: Vec<&CellChange> = t.changes.iter().collect();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].previous_cell.text, "r0c1");
    assert_eq!(changes[0].new_cell.text, "");
}
