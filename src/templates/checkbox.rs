use super::keys::{self, Modifiers};
use super::{carried, CellTemplate, KeyOutcome, OnCellChanged, Presentation};
use crate::model::{Cell, CheckboxCell, CompatibleCell};

const DEFAULT_CHECKED_TEXT: &str = "1";

/// Boolean toggle. Space and Enter flip the value in place; the cell never
/// opens an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckboxCellTemplate;

impl CheckboxCellTemplate {
    fn with_checked(&self, cell: &Cell, checked: bool) -> CompatibleCell {
        let (class_name, style) = carried(cell);
        self.normalize(&Cell::Checkbox(CheckboxCell {
            checked: Some(checked),
            checked_text: cell.property::<String>("checkedText").ok(),
            unchecked_text: cell.property::<String>("uncheckedText").ok(),
            class_name,
            style,
        }))
    }

    fn parse_checked(&self, cell: &Cell, text: &str) -> Option<bool> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let checked_text = cell.property::<String>("checkedText").ok();
        let unchecked_text = cell.property::<String>("uncheckedText").ok();
        if text.eq_ignore_ascii_case("true") || text == "1" || checked_text.as_deref() == Some(text) {
            Some(true)
        } else if text.eq_ignore_ascii_case("false")
            || text == "0"
            || unchecked_text.as_deref() == Some(text)
        {
            Some(false)
        } else {
            None
        }
    }
}

impl CellTemplate for CheckboxCellTemplate {
    fn normalize(&self, candidate: &Cell) -> CompatibleCell {
        let checked = candidate.property::<bool>("checked").unwrap_or(false);
        let checked_text = candidate.property::<String>("checkedText").ok();
        let unchecked_text = candidate.property::<String>("uncheckedText").ok();
        let text = if checked {
            checked_text.clone().unwrap_or_else(|| DEFAULT_CHECKED_TEXT.to_string())
        } else {
            unchecked_text.clone().unwrap_or_default()
        };
        let (class_name, style) = carried(candidate);
        let cell = Cell::Checkbox(CheckboxCell {
            checked: Some(checked),
            checked_text,
            unchecked_text,
            class_name,
            style,
        });
        CompatibleCell::new(cell, text, if checked { 1.0 } else { 0.0 })
    }

    fn handle_key(&self, cell: &CompatibleCell, key_code: u32, modifiers: Modifiers) -> KeyOutcome {
        if !modifiers.ctrl && !modifiers.alt && (key_code == keys::SPACE || key_code == keys::ENTER) {
            let checked = cell.cell.property::<bool>("checked").unwrap_or(false);
            return KeyOutcome::new(self.with_checked(&cell.cell, !checked), false);
        }
        KeyOutcome::new(cell.clone(), false)
    }

    fn merge(&self, cell: &CompatibleCell, incoming: &CompatibleCell) -> CompatibleCell {
        let checked = self
            .parse_checked(&cell.cell, &incoming.text)
            .unwrap_or(!incoming.value.is_nan() && incoming.value != 0.0);
        self.with_checked(&cell.cell, checked)
    }

    fn present<'a>(
        &'a self,
        cell: &CompatibleCell,
        _editing: bool,
        _on_change: OnCellChanged<'a>,
    ) -> Presentation<'a> {
        Presentation::Checkbox {
            checked: cell.cell.property::<bool>("checked").unwrap_or(false),
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
    use test_case::test_case;

    #[test]
    fn test_normalize_defaults() {
        let cell = CheckboxCellTemplate.normalize(&Cell::Checkbox(CheckboxCell::default()));
        assert_eq!(cell.text, "");
        assert_eq!(cell.value, 0.0);

        let cell = CheckboxCellTemplate.normalize(&Cell::checkbox(true));
        assert_eq!(cell.text, "1");
        assert_eq!(cell.value, 1.0);
    }

    #[test_case(keys::SPACE; "space")]
    #[test_case(keys::ENTER; "enter")]
    fn test_toggle_without_edit(key: u32) {
        let cell = CheckboxCellTemplate.normalize(&Cell::checkbox(false));
        let outcome = CheckboxCellTemplate.handle_key(&cell, key, Modifiers::NONE);
        assert!(!outcome.enable_edit_mode);
        assert_eq!(outcome.cell.value, 1.0);
    }

    #[test_case("true", true; "literal true")]
    #[test_case("0", false; "zero")]
    #[test_case("yes", true; "custom checked text")]
    #[test_case("", false; "empty falls back to value")]
    fn test_merge_text(text: &str, expected: bool) {
        let template = CheckboxCellTemplate;
        let cell = template.normalize(&Cell::Checkbox(CheckboxCell {
            checked: Some(false),
            checked_text: Some("yes".into()),
            ..CheckboxCell::default()
        }));
        let incoming = CompatibleCell::new(Cell::text(text), text, 0.0);
        let merged = template.merge(&cell, &incoming);
        assert_eq!(merged.cell.property::<bool>("checked").unwrap(), expected);
    }
}
