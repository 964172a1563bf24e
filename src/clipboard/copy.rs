use serde::Serialize;

use super::fragment::{write_fragment, FragmentCell};
use super::{text_cell, ClipboardEvent, HTML_MIME, TEXT_MIME};
use crate::model::Location;
use crate::state::{clear_selection, get_active_selected_range, State, Transition};

/// Both clipboard representations of a selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyPayload {
    /// Marked fragment for pasting back into a grid
    pub html: String,
    /// Tab-separated values for other applications
    pub text: String,
}

/// Serialize the active selection.
///
/// Rows and columns are looked up by id in the current matrix, so a
/// selection that outlived a configuration change copies what still exists.
pub fn copy_selection(state: &State) -> Option<CopyPayload> {
    let range = get_active_selected_range(state)?;
    let matrix = state.operable_matrix()?;

    let rows: Vec<Vec<FragmentCell>> = range
        .rows
        .iter()
        .filter_map(|row| matrix.row_index_lookup.get(&row.row_id))
        .map(|&row_idx| {
            range
                .columns
                .iter()
                .filter_map(|column| matrix.column_index_lookup.get(&column.column_id))
                .filter_map(|&column_idx| matrix.get_location(row_idx, column_idx))
                .map(|location| fragment_cell(state, &location))
                .collect()
        })
        .collect();

    let text = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| escape_cell_value(&cell.text))
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n");

    tracing::debug!(target: "cellgrid.copy", rows = rows.len(), "copy_selection");
    Some(CopyPayload {
        html: write_fragment(&rows),
        text,
    })
}

fn fragment_cell(state: &State, location: &Location) -> FragmentCell {
    let cell = match state.cell_at(location) {
        Ok((cell, _)) => cell,
        Err(error) => {
            tracing::debug!(target: "cellgrid.copy", %error, "copying as empty text");
            text_cell(String::new())
        }
    };
    let payload = match cell.to_json() {
        Ok(json) => json,
        Err(error) => {
            tracing::debug!(target: "cellgrid.copy", %error, "cell not serializable");
            String::new()
        }
    };
    FragmentCell {
        payload,
        text: cell.text,
    }
}

/// Quote a value for TSV when it contains a tab, line break or quote,
/// doubling internal quotes.
pub fn escape_cell_value(value: &str) -> String {
    let needs_quoting = value.contains(['\t', '\n', '\r', '"']);
    if needs_quoting {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Fill a copy event from the active selection. Returns whether anything
/// was copied.
pub fn handle_copy<E: ClipboardEvent + ?Sized>(event: &mut E, state: &State) -> bool {
    let Some(payload) = copy_selection(state) else {
        return false;
    };
    event.set_data(HTML_MIME, &payload.html);
    event.set_data(TEXT_MIME, &payload.text);
    event.prevent_default();
    true
}

/// Copy the active selection, then clear it.
pub fn handle_cut<E: ClipboardEvent + ?Sized>(event: &mut E, state: State) -> Transition {
    if !handle_copy(event, &state) {
        return Transition::unchanged(state);
    }
    clear_selection(state)
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
    use crate::clipboard::{pasted_cell, ClipboardData};
    use crate::model::{Cell, ColumnDef, GridProps, PropsHandle, RowDef};
    use crate::state::{derive_state, select_all};

    fn state() -> State {
        let props = GridProps::new(
            vec![
                RowDef::new("r0").with_cells(vec![Cell::text("a\tb"), Cell::number(1.5)]),
                RowDef::new("r1").with_cells(vec![Cell::text("say \"hi\""), Cell::checkbox(true)]),
            ],
            vec![ColumnDef::new("c0"), ColumnDef::new("c1")],
        );
        select_all(derive_state(&PropsHandle::new(props), State::new()))
    }

    #[test]
    fn test_escape_cell_value() {
        assert_eq!(escape_cell_value("plain"), "plain");
        assert_eq!(escape_cell_value("a\tb"), "\"a\tb\"");
        assert_eq!(escape_cell_value("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_copy_tsv() {
        let payload = copy_selection(&state()).unwrap();
        assert_eq!(payload.text, "\"a\tb\"\t1.5\n\"say \"\"hi\"\"\"\t1");
    }

    #[test]
    fn test_copy_without_selection() {
        let mut s = state();
        s.selected_ranges.clear();
        assert!(copy_selection(&s).is_none());
        let mut event = ClipboardData::new();
        assert!(!handle_copy(&mut event, &s));
        assert!(!event.default_prevented());
    }

    #[test]
    fn test_copy_then_paste_first_cell() {
        let s = state();
        let mut event = ClipboardData::new();
        assert!(handle_copy(&mut event, &s));
        assert!(event.default_prevented());

        let first = s.cell_matrix.as_ref().unwrap().get_location(0, 0).unwrap();
        let (original, _) = s.cell_at(&first).unwrap();
        assert_eq!(pasted_cell(&event), original);
    }

    #[test]
    fn test_cut_clears() {
        let mut event = ClipboardData::new();
        let t = handle_cut(&mut event, state());
        assert!(event.default_prevented());
        assert_eq!(t.changes.len(), 4);
    }
}
