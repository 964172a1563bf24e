use super::keys::{self, Modifiers};
use super::{
    carried, CellEditor, CellTemplate, EditorEvent, EditorKind, EventResponse, KeyOutcome,
    OnCellChanged, Presentation,
};
use crate::model::{Cell, CompatibleCell, NumberCell};
use crate::numeric::parse_float_strict;

/// Numeric values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumberCellTemplate;

impl NumberCellTemplate {
    fn with_value(&self, cell: &Cell, value: Option<f64>) -> CompatibleCell {
        let (class_name, style) = carried(cell);
        self.normalize(&Cell::Number(NumberCell {
            value,
            nan_to_zero: cell.property::<bool>("nanToZero").unwrap_or(false),
            hide_zero: cell.property::<bool>("hideZero").unwrap_or(false),
            class_name,
            style,
        }))
    }
}

fn format_number(value: f64, hide_zero: bool) -> String {
    if value.is_nan() || (hide_zero && value == 0.0) {
        String::new()
    } else {
        value.to_string()
    }
}

impl CellTemplate for NumberCellTemplate {
    fn normalize(&self, candidate: &Cell) -> CompatibleCell {
        let nan_to_zero = candidate.property::<bool>("nanToZero").unwrap_or(false);
        let hide_zero = candidate.property::<bool>("hideZero").unwrap_or(false);
        let mut value = candidate.property::<f64>("value").unwrap_or(f64::NAN);
        if nan_to_zero && value.is_nan() {
            value = 0.0;
        }
        let (class_name, style) = carried(candidate);
        let cell = Cell::Number(NumberCell {
            value: (!value.is_nan()).then_some(value),
            nan_to_zero,
            hide_zero,
            class_name,
            style,
        });
        CompatibleCell::new(cell, format_number(value, hide_zero), value)
    }

    fn handle_key(&self, cell: &CompatibleCell, key_code: u32, modifiers: Modifiers) -> KeyOutcome {
        if modifiers.ctrl || modifiers.alt {
            return KeyOutcome::activation(cell, key_code);
        }
        let key = if keys::is_numpad_numeric_key(key_code) {
            key_code - (keys::NUM_PAD_0 - keys::ZERO)
        } else {
            key_code
        };
        if !modifiers.shift && keys::is_numeric_key(key) {
            let digit = f64::from(key - keys::ZERO);
            return KeyOutcome::new(self.with_value(&cell.cell, Some(digit)), true);
        }
        if keys::is_allowed_on_number_typing_key(key) {
            return KeyOutcome::new(self.with_value(&cell.cell, None), true);
        }
        KeyOutcome::activation(cell, key_code)
    }

    fn merge(&self, cell: &CompatibleCell, incoming: &CompatibleCell) -> CompatibleCell {
        let value = parse_float_strict(&incoming.text)
            .or_else(|| (!incoming.value.is_nan()).then_some(incoming.value));
        self.with_value(&cell.cell, value)
    }

    fn class_name(&self, cell: &CompatibleCell, _editing: bool) -> String {
        let mut name = cell.cell.class_name().unwrap_or_default().to_string();
        if cell.value.is_nan() {
            if !name.is_empty() {
                name.push(' ');
            }
            name.push_str("rg-invalid");
        }
        name
    }

    fn present<'a>(
        &'a self,
        cell: &CompatibleCell,
        editing: bool,
        mut on_change: OnCellChanged<'a>,
    ) -> Presentation<'a> {
        if !editing {
            return Presentation::Text(cell.text.clone());
        }
        let base = cell.cell.clone();
        let initial = if cell.value.is_nan() {
            String::new()
        } else {
            cell.value.to_string()
        };
        Presentation::Editor(CellEditor::new(
            EditorKind::Number,
            initial,
            move |event| match event {
                EditorEvent::Input(raw) => {
                    on_change(self.with_value(&base, parse_float_strict(&raw)), false);
                    EventResponse::STOP
                }
                EditorEvent::Blur(raw) => {
                    on_change(self.with_value(&base, parse_float_strict(&raw)), true);
                    EventResponse::PROPAGATE
                }
                EditorEvent::KeyDown(chord) => {
                    let key = chord.key_code;
                    if keys::is_numeric_key(key)
                        || keys::is_navigation_key(key)
                        || keys::is_allowed_on_number_typing_key(key)
                    {
                        EventResponse::STOP
                    } else if keys::is_alphanumeric_key(key) && !chord.modifiers.ctrl {
                        EventResponse::PREVENT
                    } else {
                        EventResponse::PROPAGATE
                    }
                }
                EditorEvent::Copy | EditorEvent::Cut | EditorEvent::Paste | EditorEvent::PointerDown => {
                    EventResponse::STOP
                }
            },
        ))
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

    fn number(value: Option<f64>, nan_to_zero: bool, hide_zero: bool) -> Cell {
        Cell::Number(NumberCell {
            value,
            nan_to_zero,
            hide_zero,
            ..NumberCell::default()
        })
    }

    #[test_case(Some(1.5), false, false, "1.5"; "plain")]
    #[test_case(None, false, false, ""; "missing")]
    #[test_case(None, true, false, "0"; "nan to zero")]
    #[test_case(Some(0.0), false, true, ""; "hidden zero")]
    #[test_case(Some(-3.0), false, true, "-3"; "negative")]
    fn test_normalize_text(value: Option<f64>, nan_to_zero: bool, hide_zero: bool, text: &str) {
        let cell = NumberCellTemplate.normalize(&number(value, nan_to_zero, hide_zero));
        assert_eq!(cell.text, text);
    }

    #[test]
    fn test_digit_key_seeds_editor() {
        let cell = NumberCellTemplate.normalize(&Cell::number(42.0));
        let outcome = NumberCellTemplate.handle_key(&cell, keys::ZERO + 7, Modifiers::NONE);
        assert!(outcome.enable_edit_mode);
        assert_eq!(outcome.cell.value, 7.0);

        let outcome = NumberCellTemplate.handle_key(&cell, keys::NUM_PAD_0 + 3, Modifiers::NONE);
        assert_eq!(outcome.cell.value, 3.0);
    }

    #[test]
    fn test_minus_key_clears_value() {
        let cell = NumberCellTemplate.normalize(&Cell::number(42.0));
        let outcome = NumberCellTemplate.handle_key(&cell, keys::DASH, Modifiers::NONE);
        assert!(outcome.enable_edit_mode);
        assert!(outcome.cell.value.is_nan());
    }

    #[test]
    fn test_letter_key_is_ignored() {
        let cell = NumberCellTemplate.normalize(&Cell::number(42.0));
        let outcome = NumberCellTemplate.handle_key(&cell, keys::A, Modifiers::NONE);
        assert!(!outcome.enable_edit_mode);
        assert_eq!(outcome.cell, cell);
    }

    #[test]
    fn test_merge_prefers_text() {
        let template = NumberCellTemplate;
        let cell = template.normalize(&Cell::number(1.0));
        let typed = CompatibleCell::new(Cell::text("2.5"), "2.5", 99.0);
        assert_eq!(template.merge(&cell, &typed).value, 2.5);

        let garbage = CompatibleCell::new(Cell::text("abc"), "abc", 99.0);
        assert_eq!(template.merge(&cell, &garbage).value, 99.0);
    }

    #[test]
    fn test_invalid_class_name() {
        let cell = NumberCellTemplate.normalize(&number(None, false, false));
        assert_eq!(NumberCellTemplate.class_name(&cell, false), "rg-invalid");
    }
}
