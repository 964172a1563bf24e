use super::keys::Modifiers;
use super::{carried, CellTemplate, KeyOutcome, OnCellChanged, Presentation};
use crate::model::{Cell, CompatibleCell, HeaderCell};

/// Read-only header text. Never enters edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeaderCellTemplate;

impl CellTemplate for HeaderCellTemplate {
    fn normalize(&self, candidate: &Cell) -> CompatibleCell {
        let text = candidate.property::<String>("text").unwrap_or_default();
        let (class_name, style) = carried(candidate);
        let cell = Cell::Header(HeaderCell {
            text: Some(text.clone()),
            class_name,
            style,
        });
        CompatibleCell::new(cell, text, f64::NAN)
    }

    fn handle_key(&self, cell: &CompatibleCell, _key_code: u32, _modifiers: Modifiers) -> KeyOutcome {
        KeyOutcome::new(cell.clone(), false)
    }

    /// Headers are read-only: edits and pastes leave them untouched.
    fn merge(&self, cell: &CompatibleCell, _incoming: &CompatibleCell) -> CompatibleCell {
        cell.clone()
    }

    fn class_name(&self, cell: &CompatibleCell, _editing: bool) -> String {
        match cell.cell.class_name() {
            Some(extra) => format!("header {extra}"),
            None => "header".to_string(),
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
    use crate::templates::keys;

    #[test]
    fn test_header_never_edits() {
        let cell = HeaderCellTemplate.normalize(&Cell::header("Name"));
        for key in [keys::ENTER, keys::POINTER, keys::A, keys::ZERO] {
            let outcome = HeaderCellTemplate.handle_key(&cell, key, Modifiers::NONE);
            assert!(!outcome.enable_edit_mode);
            assert_eq!(outcome.cell, cell);
        }
    }

    #[test]
    fn test_header_ignores_merges() {
        let cell = HeaderCellTemplate.normalize(&Cell::header("Name"));
        let incoming = CompatibleCell::new(Cell::text(""), "", f64::NAN);
        assert_eq!(HeaderCellTemplate.merge(&cell, &incoming), cell);
    }

    #[test]
    fn test_header_class_name() {
        let cell = HeaderCellTemplate.normalize(&Cell::header("Name"));
        assert_eq!(HeaderCellTemplate.class_name(&cell, false), "header");
    }
}
