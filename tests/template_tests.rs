//! Built-in and caller-supplied cell templates driven through the grid.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]

mod common;

use std::rc::Rc;

use cellgrid::state::{commit_edit, handle_key_down, update_edited_cell};
use cellgrid::templates::keys::{self, KeyChord, Modifiers};
use cellgrid::templates::{EditorEvent, KeyOutcome, OnCellChanged, Presentation};
use cellgrid::{
    Cell, CellLocation, CellTemplate, CellTemplates, CheckboxCell, CompatibleCell,
    CustomTemplates, LocaleConfig, NumberCell, TimeCell,
};
use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use test_case::test_case;

fn builtins() -> CellTemplates {
    CellTemplates::builtin(&LocaleConfig::default())
}

fn time(h: u32, m: u32, s: u32) -> Cell {
    Cell::time(
        NaiveDate::from_ymd_opt(2023, 11, 2)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap(),
    )
}

fn fixtures() -> Vec<Cell> {
    vec![
        Cell::text("hello"),
        Cell::text("12.5 kg"),
        Cell::text(""),
        Cell::header("Name"),
        Cell::number(42.0),
        Cell::number(-0.25),
        Cell::Number(NumberCell::default()),
        Cell::Number(NumberCell {
            value: Some(0.0),
            hide_zero: true,
            ..NumberCell::default()
        }),
        Cell::Number(NumberCell {
            nan_to_zero: true,
            ..NumberCell::default()
        }),
        Cell::checkbox(true),
        Cell::checkbox(false),
        Cell::Checkbox(CheckboxCell {
            checked: Some(true),
            checked_text: Some("yes".into()),
            unchecked_text: Some("no".into()),
            ..CheckboxCell::default()
        }),
        time(9, 5, 0),
        time(23, 59, 59),
        Cell::Time(TimeCell::default()),
    ]
}

#[test]
fn test_merge_of_own_representation_is_a_fixed_point() {
    let templates = builtins();
    for raw in fixtures() {
        let template = templates.for_cell(&raw).unwrap();
        let canonical = template.normalize(&raw);
        let merged = template.merge(&canonical, &canonical);
        assert_eq!(merged.text, canonical.text, "{raw:?}");
        assert!(
            merged.value == canonical.value || (merged.value.is_nan() && canonical.value.is_nan()),
            "{raw:?}"
        );
    }
}

#[test]
fn test_normalize_is_idempotent() {
    let templates = builtins();
    for raw in fixtures() {
        let once = templates.normalize(&raw).unwrap();
        let twice = templates.normalize(&once.cell).unwrap();
        assert_eq!(once, twice);
    }
}

#[test_case(Cell::text("abc"), keys::A, true, "a" ; "letter replaces text")]
#[test_case(Cell::text("abc"), keys::ENTER, true, "abc" ; "enter keeps text")]
#[test_case(Cell::text("abc"), keys::LEFT_ARROW, false, "abc" ; "arrow moves instead")]
#[test_case(Cell::number(3.0), keys::ZERO + 7, true, "7" ; "digit seeds number")]
#[test_case(Cell::number(3.0), keys::NUM_PAD_0 + 2, true, "2" ; "numpad digit seeds number")]
#[test_case(Cell::number(3.0), keys::DASH, true, "" ; "minus clears number")]
#[test_case(Cell::header("H"), keys::ENTER, false, "H" ; "header never edits")]
#[test_case(time(10, 30, 0), keys::ZERO + 1, true, "10:30" ; "digit opens time editor")]
fn test_view_mode_key(cell: Cell, key: u32, editing: bool, edited_text: &str) {
    let state = common::focused(common::row_of(vec![cell]), "r0", "c0");
    let next = handle_key_down(state, KeyChord::plain(key)).state;
    assert_eq!(next.is_editing(), editing);
    if editing {
        assert_eq!(next.currently_edited_cell.as_ref().unwrap().text, edited_text);
    }
}

#[test]
fn test_time_arrow_leaves_cell_in_view_mode() {
    let state = common::focused(common::row_of(vec![time(10, 30, 0), Cell::text("x")]), "r0", "c0");
    let t = handle_key_down(state, KeyChord::plain(keys::RIGHT_ARROW));
    assert!(!t.state.is_editing());
    assert!(t.changes.is_empty());
    assert_eq!(common::focused_ids(&t.state).1, "c1");
}

#[test_case(keys::SPACE ; "space")]
#[test_case(keys::ENTER ; "enter")]
fn test_checkbox_toggles_without_editing(key: u32) {
    let state = common::focused(common::row_of(vec![Cell::checkbox(false)]), "r0", "c0");
    let t = handle_key_down(state, KeyChord::plain(key));
    assert!(!t.state.is_editing());
    assert_eq!(t.changes.len(), 1);
    assert_eq!(t.changes[0].new_cell.value, 1.0);
    assert_eq!(t.changes[0].previous_cell.value, 0.0);
}

#[test]
fn test_edit_session_commit_on_enter() {
    let state = common::focused(common::row_of(vec![Cell::number(1.0)]), "r0", "c0");
    let t = handle_key_down(state, KeyChord::plain(keys::ZERO + 4));
    let typed = t.state.currently_edited_cell.clone().unwrap();

    let typing = CompatibleCell::new(typed.cell.clone(), "45.5", f64::NAN);
    let t = update_edited_cell(t.state, typing, false);
    assert!(t.changes.is_empty());
    assert!(t.state.is_editing());

    let t = handle_key_down(t.state, KeyChord::plain(keys::ENTER));
    assert!(!t.state.is_editing());
    assert_eq!(t.changes.len(), 1);
    assert_eq!(t.changes[0].new_cell.value, 45.5);
    assert_eq!(t.changes[0].new_cell.text, "45.5");
}

#[test]
fn test_escape_discards_edit() {
    let state = common::focused(common::row_of(vec![Cell::text("keep")]), "r0", "c0");
    let t = handle_key_down(state, KeyChord::plain(keys::Z));
    assert!(t.state.is_editing());
    let t = handle_key_down(t.state, KeyChord::plain(keys::ESCAPE));
    assert!(!t.state.is_editing());
    assert!(t.changes.is_empty());
    assert!(commit_edit(t.state).changes.is_empty());
}

#[test]
fn test_editor_commits_on_blur() {
    let templates = builtins();
    let template = templates.get("text").unwrap();
    let cell = template.normalize(&Cell::text("before"));
    let mut seen: Vec<(String, bool)> = Vec::new();
    {
        let sink: OnCellChanged<'_> = Box::new(|c, commit| seen.push((c.text, commit)));
        let Presentation::Editor(mut editor) = template.present(&cell, true, sink) else {
            panic!("text cells edit with an editor");
        };
        let typing = editor.dispatch(EditorEvent::Input("bef".into()));
        assert!(typing.stop_propagation);
        let blur = editor.dispatch(EditorEvent::Blur("after".into()));
        assert!(!blur.stop_propagation);
    }
    assert_eq!(seen, vec![("bef".to_string(), false), ("after".to_string(), true)]);
}

/// Star rating stored as a custom `stars` field
struct Rating;

impl Rating {
    fn with_stars(stars: f64) -> CompatibleCell {
        let stars = stars.clamp(0.0, 5.0).round();
        let mut fields = Map::new();
        fields.insert("stars".into(), json!(stars));
        let text = "*".repeat(stars as usize);
        CompatibleCell::new(Cell::custom("rating", fields), text, stars)
    }
}

impl CellTemplate for Rating {
    fn normalize(&self, candidate: &Cell) -> CompatibleCell {
        Self::with_stars(candidate.property::<f64>("stars").unwrap_or(0.0))
    }

    fn handle_key(&self, cell: &CompatibleCell, key_code: u32, _m: Modifiers) -> KeyOutcome {
        match key_code {
            keys::ADD => KeyOutcome::new(Self::with_stars(cell.value + 1.0), false),
            keys::SUBTRACT => KeyOutcome::new(Self::with_stars(cell.value - 1.0), false),
            _ => KeyOutcome::new(cell.clone(), false),
        }
    }

    fn merge(&self, _cell: &CompatibleCell, incoming: &CompatibleCell) -> CompatibleCell {
        let from_text = incoming.text.chars().filter(|c| *c == '*').count();
        if from_text > 0 {
            Self::with_stars(from_text as f64)
        } else {
            Self::with_stars(incoming.value)
        }
    }

    fn present<'a>(
        &'a self,
        cell: &CompatibleCell,
        _editing: bool,
        _on_change: OnCellChanged<'a>,
    ) -> Presentation<'a> {
        Presentation::Text(cell.text.clone())
    }
}

fn rating(stars: u64) -> Cell {
    let mut fields = Map::new();
    fields.insert("stars".into(), Value::from(stars));
    Cell::custom("rating", fields)
}

#[test]
fn test_custom_template_drives_keys() {
    let props = common::row_of(vec![rating(2)])
        .with_custom_templates(CustomTemplates::new().with("rating", Rc::new(Rating)))
        .with_focus(CellLocation::new("r0", "c0"));
    let state = common::derived(props);
    assert!(state.cell_templates.contains("rating"));

    let t = handle_key_down(state, KeyChord::plain(keys::ADD));
    assert_eq!(t.changes.len(), 1);
    assert_eq!(t.changes[0].new_cell.text, "***");
    assert_eq!(t.changes[0].new_cell.type_tag(), "rating");
}

#[test]
fn test_custom_cell_without_template_is_inert() {
    let state = common::focused(common::row_of(vec![rating(2)]), "r0", "c0");
    let t = handle_key_down(state, KeyChord::plain(keys::ADD));
    assert!(t.changes.is_empty());
    assert!(!t.state.is_editing());
}
