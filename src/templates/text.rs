use super::keys::{self, Modifiers};
use super::{
    carried, text_editor_key, CellEditor, CellTemplate, EditorEvent, EditorKind, EventResponse,
    KeyOutcome, OnCellChanged, Presentation,
};
use crate::model::{Cell, CompatibleCell, TextCell};
use crate::numeric::parse_float_prefix;

/// Free-form text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextCellTemplate;

impl TextCellTemplate {
    fn with_text(&self, cell: &Cell, text: String) -> CompatibleCell {
        let (class_name, style) = carried(cell);
        let placeholder = cell.property::<String>("placeholder").ok();
        self.normalize(&Cell::Text(TextCell {
            text: Some(text),
            placeholder,
            class_name,
            style,
        }))
    }
}

impl CellTemplate for TextCellTemplate {
    fn normalize(&self, candidate: &Cell) -> CompatibleCell {
        let text = candidate.property::<String>("text").unwrap_or_default();
        let value = parse_float_prefix(&text);
        let (class_name, style) = carried(candidate);
        let cell = Cell::Text(TextCell {
            text: Some(text.clone()),
            placeholder: candidate.property::<String>("placeholder").ok(),
            class_name,
            style,
        });
        CompatibleCell::new(cell, text, value)
    }

    fn handle_key(&self, cell: &CompatibleCell, key_code: u32, modifiers: Modifiers) -> KeyOutcome {
        let typing = !modifiers.ctrl
            && !modifiers.alt
            && keys::is_alphanumeric_key(key_code)
            && !(modifiers.shift && key_code == keys::SPACE);
        if typing {
            if let Some(ch) = keys::char_from_key_code(key_code, modifiers.shift) {
                return KeyOutcome::new(self.with_text(&cell.cell, ch.to_string()), true);
            }
        }
        KeyOutcome::activation(cell, key_code)
    }

    fn merge(&self, cell: &CompatibleCell, incoming: &CompatibleCell) -> CompatibleCell {
        self.with_text(&cell.cell, incoming.text.clone())
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
        Presentation::Editor(CellEditor::new(
            EditorKind::Text,
            cell.text.clone(),
            move |event| match event {
                EditorEvent::Input(raw) => {
                    on_change(self.with_text(&base, raw), false);
                    EventResponse::STOP
                }
                EditorEvent::Blur(raw) => {
                    on_change(self.with_text(&base, raw), true);
                    EventResponse::PROPAGATE
                }
                EditorEvent::KeyDown(chord) => text_editor_key(chord),
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
    use crate::templates::KeyChord;

    #[test]
    fn test_normalize_missing_text() {
        let cell = TextCellTemplate.normalize(&Cell::Text(TextCell::default()));
        assert_eq!(cell.text, "");
        assert!(cell.value.is_nan());
        assert_eq!(cell.cell.property::<String>("text").unwrap(), "");
    }

    #[test]
    fn test_normalize_numeric_prefix() {
        let cell = TextCellTemplate.normalize(&Cell::text("12 apples"));
        assert_eq!(cell.value, 12.0);
    }

    #[test]
    fn test_typing_replaces_text() {
        let cell = TextCellTemplate.normalize(&Cell::text("old"));
        let outcome = TextCellTemplate.handle_key(&cell, keys::A + 1, Modifiers::NONE);
        assert!(outcome.enable_edit_mode);
        assert_eq!(outcome.cell.text, "b");

        let outcome = TextCellTemplate.handle_key(&cell, keys::A + 1, Modifiers::SHIFT);
        assert_eq!(outcome.cell.text, "B");
    }

    #[test]
    fn test_ctrl_and_shift_space_do_not_edit() {
        let cell = TextCellTemplate.normalize(&Cell::text("old"));
        let outcome = TextCellTemplate.handle_key(&cell, keys::C, Modifiers::CTRL);
        assert!(!outcome.enable_edit_mode);
        assert_eq!(outcome.cell, cell);

        let outcome = TextCellTemplate.handle_key(&cell, keys::SPACE, Modifiers::SHIFT);
        assert!(!outcome.enable_edit_mode);
    }

    #[test]
    fn test_editor_reports_changes() {
        let template = TextCellTemplate;
        let cell = template.normalize(&Cell::text("a"));
        let mut seen = Vec::new();
        {
            let presentation =
                template.present(&cell, true, Box::new(|c, commit| seen.push((c, commit))));
            let Presentation::Editor(mut editor) = presentation else {
                panic!("expected editor");
            };
            assert_eq!(editor.initial_value, "a");
            editor.dispatch(EditorEvent::Input("ab".into()));
            let response = editor.dispatch(EditorEvent::KeyDown(KeyChord::plain(keys::ENTER)));
            assert_eq!(response, EventResponse::PROPAGATE);
            editor.dispatch(EditorEvent::Blur("abc".into()));
        }
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0.text, "ab");
        assert!(!seen[0].1);
        assert_eq!(seen[1].0.text, "abc");
        assert!(seen[1].1);
    }
}
