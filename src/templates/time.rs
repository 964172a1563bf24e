//! Time-of-day cells.
//!
//! `value` is the time's epoch milliseconds modulo one day, so two cells with
//! the same wall-clock time compare equal regardless of their date. `text`
//! is rendered with the cell's own `format` or the locale's time format.

use std::fmt::Write;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use super::keys::{self, KeyChord, Modifiers};
use super::{
    carried, CellEditor, CellTemplate, EditorEvent, EditorKind, EventResponse, KeyOutcome,
    OnCellChanged, Presentation,
};
use crate::model::{Cell, CompatibleCell, LocaleConfig, TimeCell};

const DAY_IN_MILLIS: i64 = 86_400_000;

/// Rendering of the editor's value, matching a native time input
const EDITOR_FORMAT: &str = "%H:%M";

/// Used when a configured pattern cannot be rendered
const FALLBACK_FORMAT: &str = "%H:%M";

/// Wall-clock shapes accepted from typed or pasted text
const TIME_PATTERNS: [&str; 5] = ["%H:%M:%S%.f", "%H:%M", "%I:%M %p", "%I:%M:%S %p", "%I:%M%p"];

/// Time-of-day template, bound to a locale at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeCellTemplate {
    time_format: String,
    default_date: NaiveDate,
}

impl Default for TimeCellTemplate {
    fn default() -> Self {
        Self::new(&LocaleConfig::default())
    }
}

impl TimeCellTemplate {
    pub fn new(locale: &LocaleConfig) -> Self {
        Self {
            time_format: locale.time_format.clone(),
            default_date: locale.default_date,
        }
    }

    fn format_time(&self, time: &NaiveDateTime, pattern: Option<&str>) -> String {
        let pattern = pattern.unwrap_or(&self.time_format);
        render(time, pattern)
            .or_else(|| render(time, FALLBACK_FORMAT))
            .unwrap_or_default()
    }

    /// Parse typed text: the active pattern first (with or without a date),
    /// then ISO-8601, then common wall-clock shapes anchored to the
    /// default date.
    fn parse_time_text(&self, text: &str, pattern: Option<&str>) -> Option<NaiveDateTime> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let pattern = pattern.unwrap_or(&self.time_format);
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, pattern) {
            return Some(dt);
        }
        if let Ok(t) = NaiveTime::parse_from_str(text, pattern) {
            return Some(self.default_date.and_time(t));
        }
        if let Ok(dt) = text.parse::<NaiveDateTime>() {
            return Some(dt);
        }
        TIME_PATTERNS
            .iter()
            .find_map(|p| NaiveTime::parse_from_str(text, p).ok())
            .map(|t| self.default_date.and_time(t))
    }

    fn with_time(&self, cell: &Cell, time: Option<NaiveDateTime>) -> CompatibleCell {
        let (class_name, style) = carried(cell);
        self.normalize(&Cell::Time(TimeCell {
            time,
            format: cell.property::<String>("format").ok(),
            class_name,
            style,
        }))
    }
}

fn render(time: &NaiveDateTime, pattern: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", time.format(pattern)).ok()?;
    Some(out)
}

/// Digits, caret keys and separators stay in the editor; anything else is
/// swallowed natively but still reaches the grid (Enter commits, Escape
/// cancels).
fn editor_key(chord: KeyChord) -> EventResponse {
    let key = chord.key_code;
    if keys::is_numeric_key(key)
        || keys::is_navigation_key(key)
        || key == keys::COMMA
        || key == keys::PERIOD
    {
        EventResponse::STOP
    } else {
        EventResponse::PREVENT
    }
}

fn time_of_day_millis(time: &NaiveDateTime) -> f64 {
    let millis = time.and_utc().timestamp_millis().rem_euclid(DAY_IN_MILLIS);
    // Always below one day, exactly representable.
    millis as f64
}

fn time_from_millis(value: f64) -> Option<NaiveDateTime> {
    if !value.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let millis = value as i64;
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

impl CellTemplate for TimeCellTemplate {
    fn normalize(&self, candidate: &Cell) -> CompatibleCell {
        let time = candidate.property::<NaiveDateTime>("time").ok();
        let format = candidate.property::<String>("format").ok();
        let value = time.as_ref().map_or(f64::NAN, time_of_day_millis);
        let text = time
            .as_ref()
            .map(|t| self.format_time(t, format.as_deref()))
            .unwrap_or_default();
        let (class_name, style) = carried(candidate);
        let cell = Cell::Time(TimeCell {
            time,
            format,
            class_name,
            style,
        });
        CompatibleCell::new(cell, text, value)
    }

    fn handle_key(&self, cell: &CompatibleCell, key_code: u32, modifiers: Modifiers) -> KeyOutcome {
        if modifiers.is_empty() && keys::is_alphanumeric_key(key_code) {
            return KeyOutcome::new(self.normalize(&cell.cell), true);
        }
        KeyOutcome::activation(cell, key_code)
    }

    fn merge(&self, cell: &CompatibleCell, incoming: &CompatibleCell) -> CompatibleCell {
        let format = cell.cell.property::<String>("format").ok();
        let from_text = self.parse_time_text(&incoming.text, format.as_deref());
        let from_value = time_from_millis(incoming.value);
        let time = match (from_text, from_value) {
            // Text that merely renders the value loses precision; keep the value.
            (Some(_), Some(v)) if self.format_time(&v, format.as_deref()) == incoming.text => Some(v),
            (Some(t), _) => Some(t),
            (None, v) => v,
        };
        self.with_time(&cell.cell, time)
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
        let time = base.property::<NaiveDateTime>("time").ok();
        let initial = time
            .as_ref()
            .and_then(|t| render(t, EDITOR_FORMAT))
            .unwrap_or_default();
        Presentation::Editor(CellEditor::new(
            EditorKind::Time,
            initial,
            move |event| {
                let (raw, commit) = match event {
                    EditorEvent::Input(raw) => (raw, false),
                    EditorEvent::Blur(raw) => (raw, true),
                    EditorEvent::KeyDown(chord) => return editor_key(chord),
                    EditorEvent::Copy
                    | EditorEvent::Cut
                    | EditorEvent::Paste
                    | EditorEvent::PointerDown => return EventResponse::STOP,
                };
                if let Some(time) = self.parse_time_text(&raw, Some(EDITOR_FORMAT)) {
                    on_change(self.with_time(&base, Some(time)), commit);
                }
                if commit {
                    EventResponse::PROPAGATE
                } else {
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

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_normalize_value_is_time_of_day() {
        let cell = TimeCellTemplate::default().normalize(&Cell::time(at(10, 30, 0)));
        assert_eq!(cell.value, 37_800_000.0);
        assert_eq!(cell.text, "10:30");
    }

    #[test]
    fn test_normalize_without_time() {
        let cell = TimeCellTemplate::default().normalize(&Cell::Time(TimeCell::default()));
        assert!(cell.value.is_nan());
        assert_eq!(cell.text, "");
    }

    #[test]
    fn test_cell_format_overrides_locale() {
        let template = TimeCellTemplate::new(&LocaleConfig {
            time_format: "%I:%M %p".into(),
            ..LocaleConfig::default()
        });
        let cell = template.normalize(&Cell::time(at(14, 5, 0)));
        assert_eq!(cell.text, "02:05 PM");

        let custom = Cell::Time(TimeCell {
            time: Some(at(14, 5, 0)),
            format: Some("%H.%M".into()),
            ..TimeCell::default()
        });
        assert_eq!(template.normalize(&custom).text, "14.05");
    }

    #[test]
    fn test_invalid_format_falls_back() {
        let template = TimeCellTemplate::new(&LocaleConfig {
            time_format: "%Q".into(),
            ..LocaleConfig::default()
        });
        assert_eq!(template.normalize(&Cell::time(at(8, 0, 0))).text, "08:00");
    }

    #[test]
    fn test_printable_key_enters_edit() {
        let template = TimeCellTemplate::default();
        let cell = template.normalize(&Cell::time(at(10, 30, 0)));
        let outcome = template.handle_key(&cell, keys::ZERO + 1, Modifiers::NONE);
        assert!(outcome.enable_edit_mode);
        assert_eq!(outcome.cell, cell);
    }

    #[test_case(keys::LEFT_ARROW; "arrow")]
    #[test_case(keys::TAB; "tab")]
    #[test_case(keys::ESCAPE; "escape")]
    fn test_other_keys_stay_in_view(key: u32) {
        let template = TimeCellTemplate::default();
        let cell = template.normalize(&Cell::time(at(10, 30, 0)));
        let outcome = template.handle_key(&cell, key, Modifiers::NONE);
        assert!(!outcome.enable_edit_mode);
        assert_eq!(outcome.cell, cell);
    }

    #[test]
    fn test_shifted_letter_does_not_edit() {
        let template = TimeCellTemplate::default();
        let cell = template.normalize(&Cell::time(at(10, 30, 0)));
        assert!(!template.handle_key(&cell, keys::A, Modifiers::SHIFT).enable_edit_mode);
        assert!(template.handle_key(&cell, keys::ENTER, Modifiers::NONE).enable_edit_mode);
    }

    #[test]
    fn test_merge_typed_text() {
        let template = TimeCellTemplate::default();
        let cell = template.normalize(&Cell::time(at(10, 30, 0)));
        let typed = CompatibleCell::new(Cell::text("11:15"), "11:15", f64::NAN);
        let merged = template.merge(&cell, &typed);
        assert_eq!(merged.text, "11:15");
        assert_eq!(merged.value, 40_500_000.0);
    }

    #[test]
    fn test_merge_keeps_seconds_hidden_by_format() {
        let template = TimeCellTemplate::default();
        let cell = template.normalize(&Cell::time(at(10, 30, 45)));
        let merged = template.merge(&cell, &cell);
        assert_eq!(merged.text, cell.text);
        assert_eq!(merged.value, cell.value);
    }

    #[test]
    fn test_merge_unparseable_text_falls_back_to_value() {
        let template = TimeCellTemplate::default();
        let cell = template.normalize(&Cell::time(at(10, 30, 0)));
        let incoming = CompatibleCell::new(Cell::text("soon"), "soon", 3_600_000.0);
        assert_eq!(template.merge(&cell, &incoming).text, "01:00");

        let nothing = CompatibleCell::new(Cell::text(""), "", f64::NAN);
        assert!(template.merge(&cell, &nothing).value.is_nan());
    }

    #[test]
    fn test_editor_event_ownership() {
        let template = TimeCellTemplate::default();
        let cell = template.normalize(&Cell::time(at(10, 30, 0)));
        let mut commits = Vec::new();
        {
            let Presentation::Editor(mut editor) =
                template.present(&cell, true, Box::new(|c, commit| commits.push((c, commit))))
            else {
                panic!("expected editor");
            };
            assert_eq!(editor.initial_value, "10:30");

            let digit = editor.dispatch(EditorEvent::KeyDown(KeyChord::plain(keys::ZERO + 4)));
            assert!(digit.stop_propagation);
            let letter = editor.dispatch(EditorEvent::KeyDown(KeyChord::plain(keys::A)));
            assert_eq!(letter, EventResponse::PREVENT);
            let enter = editor.dispatch(EditorEvent::KeyDown(KeyChord::plain(keys::ENTER)));
            assert!(!enter.stop_propagation);
            assert!(editor.dispatch(EditorEvent::Paste).stop_propagation);
            assert!(editor.dispatch(EditorEvent::PointerDown).stop_propagation);

            editor.dispatch(EditorEvent::Input("bogus".into()));
            editor.dispatch(EditorEvent::Blur("12:45".into()));
        }
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].0.text, "12:45");
        assert!(commits[0].1);
    }
}
