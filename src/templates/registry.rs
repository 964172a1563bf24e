//! Tag-to-template registry, built once per configuration.

use std::collections::BTreeMap;
use std::rc::Rc;

use super::{
    CellTemplate, CheckboxCellTemplate, HeaderCellTemplate, NumberCellTemplate, TextCellTemplate,
    TimeCellTemplate,
};
use crate::error::{GridError, Result};
use crate::model::{Cell, CompatibleCell, CustomTemplates, LocaleConfig};

/// One of the templates shipped with the crate
#[derive(Debug, Clone, PartialEq)]
pub enum BuiltinTemplate {
    Text(TextCellTemplate),
    Header(HeaderCellTemplate),
    Number(NumberCellTemplate),
    Checkbox(CheckboxCellTemplate),
    Time(TimeCellTemplate),
}

impl BuiltinTemplate {
    pub fn as_template(&self) -> &dyn CellTemplate {
        match self {
            Self::Text(t) => t,
            Self::Header(t) => t,
            Self::Number(t) => t,
            Self::Checkbox(t) => t,
            Self::Time(t) => t,
        }
    }
}

/// A registered template.
///
/// Built-ins compare by value; caller-supplied templates compare by
/// identity, so re-registering the same `Rc` is not a change.
#[derive(Clone)]
pub enum TemplateEntry {
    Builtin(BuiltinTemplate),
    Custom(Rc<dyn CellTemplate>),
}

impl TemplateEntry {
    pub fn as_template(&self) -> &dyn CellTemplate {
        match self {
            Self::Builtin(b) => b.as_template(),
            Self::Custom(c) => c.as_ref(),
        }
    }
}

impl PartialEq for TemplateEntry {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Builtin(a), Self::Builtin(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            _ => false,
        }
    }
}

impl std::fmt::Debug for TemplateEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin(b) => f.debug_tuple("Builtin").field(b).finish(),
            Self::Custom(c) => f.debug_tuple("Custom").field(&Rc::as_ptr(c)).finish(),
        }
    }
}

/// Cell templates keyed by type tag
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellTemplates {
    entries: BTreeMap<String, TemplateEntry>,
}

impl CellTemplates {
    /// The built-in templates, bound to `locale`.
    pub fn builtin(locale: &LocaleConfig) -> Self {
        let entries = [
            (Cell::TEXT, BuiltinTemplate::Text(TextCellTemplate)),
            (Cell::HEADER, BuiltinTemplate::Header(HeaderCellTemplate)),
            (Cell::NUMBER, BuiltinTemplate::Number(NumberCellTemplate)),
            (Cell::CHECKBOX, BuiltinTemplate::Checkbox(CheckboxCellTemplate)),
            (Cell::TIME, BuiltinTemplate::Time(TimeCellTemplate::new(locale))),
        ]
        .into_iter()
        .map(|(tag, template)| (tag.to_string(), TemplateEntry::Builtin(template)))
        .collect();
        Self { entries }
    }

    /// Built-ins overlaid with caller templates; a custom entry replaces a
    /// built-in with the same tag.
    pub fn merged(locale: &LocaleConfig, custom: &CustomTemplates) -> Self {
        let mut templates = Self::builtin(locale);
        for (tag, template) in custom.iter() {
            templates
                .entries
                .insert(tag.to_string(), TemplateEntry::Custom(Rc::clone(template)));
        }
        templates
    }

    pub fn get(&self, tag: &str) -> Option<&dyn CellTemplate> {
        self.entries.get(tag).map(TemplateEntry::as_template)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Template for `cell`'s type tag.
    pub fn for_cell(&self, cell: &Cell) -> Result<&dyn CellTemplate> {
        self.get(cell.type_tag())
            .ok_or_else(|| GridError::MissingTemplate(cell.type_tag().to_string()))
    }

    /// Normalize `cell` with its own template.
    pub fn normalize(&self, cell: &Cell) -> Result<CompatibleCell> {
        Ok(self.for_cell(cell)?.normalize(cell))
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
    use crate::templates::{KeyOutcome, Modifiers, OnCellChanged, Presentation};

    struct Shouting;

    impl CellTemplate for Shouting {
        fn normalize(&self, candidate: &Cell) -> CompatibleCell {
            let text = candidate
                .property::<String>("text")
                .unwrap_or_default()
                .to_uppercase();
            CompatibleCell::new(candidate.clone(), text, f64::NAN)
        }

        fn handle_key(&self, cell: &CompatibleCell, _key: u32, _m: Modifiers) -> KeyOutcome {
            KeyOutcome::new(cell.clone(), false)
        }

        fn merge(&self, cell: &CompatibleCell, _incoming: &CompatibleCell) -> CompatibleCell {
            cell.clone()
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

    #[test]
    fn test_builtin_tags() {
        let templates = CellTemplates::builtin(&LocaleConfig::default());
        let tags: Vec<_> = templates.tags().collect();
        assert_eq!(tags, vec!["checkbox", "header", "number", "text", "time"]);
    }

    #[test]
    fn test_custom_overrides_builtin() {
        let custom = CustomTemplates::new().with("text", Rc::new(Shouting));
        let templates = CellTemplates::merged(&LocaleConfig::default(), &custom);
        assert_eq!(templates.len(), 5);
        let cell = templates.normalize(&Cell::text("hey")).unwrap();
        assert_eq!(cell.text, "HEY");
    }

    #[test]
    fn test_missing_template() {
        let templates = CellTemplates::builtin(&LocaleConfig::default());
        let cell = Cell::custom("rating", serde_json::Map::new());
        assert!(matches!(
            templates.normalize(&cell),
            Err(GridError::MissingTemplate(tag)) if tag == "rating"
        ));
    }

    #[test]
    fn test_equality_is_identity_for_custom() {
        let shouting: Rc<dyn CellTemplate> = Rc::new(Shouting);
        let locale = LocaleConfig::default();
        let a = CellTemplates::merged(&locale, &CustomTemplates::new().with("x", Rc::clone(&shouting)));
        let b = CellTemplates::merged(&locale, &CustomTemplates::new().with("x", shouting));
        let c = CellTemplates::merged(&locale, &CustomTemplates::new().with("x", Rc::new(Shouting)));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_locale_changes_time_template() {
        let a = CellTemplates::builtin(&LocaleConfig::default());
        let b = CellTemplates::builtin(&LocaleConfig {
            time_format: "%I:%M %p".into(),
            ..LocaleConfig::default()
        });
        assert_ne!(a, b);
    }
}
