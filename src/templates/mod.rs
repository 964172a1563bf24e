//! Cell templates: the behavior bound to each cell type tag.
//!
//! A template is a stateless function table. The grid never inspects cell
//! fields itself; it asks the template registered for the cell's tag to
//! normalize, react to keys, merge edits and describe how to present it.
//!
//! This module handles:
//! - The [`CellTemplate`] contract and its presentation/editor types
//! - Key codes and key classification ([`keys`])
//! - The built-in templates: text, header, number, checkbox, time
//! - The tag-to-template registry ([`CellTemplates`])

pub mod keys;

mod checkbox;
mod header;
mod number;
mod registry;
mod text;
mod time;

pub use checkbox::CheckboxCellTemplate;
pub use header::HeaderCellTemplate;
pub use keys::{KeyChord, Modifiers};
pub use number::NumberCellTemplate;
pub use registry::{BuiltinTemplate, CellTemplates, TemplateEntry};
pub use text::TextCellTemplate;
pub use time::TimeCellTemplate;

use crate::model::{Cell, CellStyle, CompatibleCell};

/// Result of a key press on a cell in view mode
#[derive(Debug, Clone, PartialEq)]
pub struct KeyOutcome {
    pub cell: CompatibleCell,
    pub enable_edit_mode: bool,
}

impl KeyOutcome {
    pub fn new(cell: CompatibleCell, enable_edit_mode: bool) -> Self {
        Self {
            cell,
            enable_edit_mode,
        }
    }

    /// Leave the cell as is, entering edit mode only for the activation keys.
    pub fn activation(cell: &CompatibleCell, key_code: u32) -> Self {
        Self::new(cell.clone(), is_activation_key(key_code))
    }
}

/// Pointer activation and Enter open the editor without touching the cell.
pub fn is_activation_key(key_code: u32) -> bool {
    key_code == keys::POINTER || key_code == keys::ENTER
}

/// Sink for editor changes: `(updated cell, commit)`.
pub type OnCellChanged<'a> = Box<dyn FnMut(CompatibleCell, bool) + 'a>;

/// Input widget an editor is rendered as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    Text,
    Number,
    Time,
}

/// Interaction delivered to an active editor
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// Live input; the payload is the editor's current raw value
    Input(String),
    /// Editor lost focus; finalizes the edit
    Blur(String),
    KeyDown(KeyChord),
    Copy,
    Cut,
    Paste,
    PointerDown,
}

/// What the host must do with the native event after dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventResponse {
    pub stop_propagation: bool,
    pub prevent_default: bool,
}

impl EventResponse {
    /// Let the event reach the grid's handlers.
    pub const PROPAGATE: Self = Self {
        stop_propagation: false,
        prevent_default: false,
    };
    /// Keep the event inside the editor.
    pub const STOP: Self = Self {
        stop_propagation: true,
        prevent_default: false,
    };
    /// Suppress the native action but let the grid see the event.
    pub const PREVENT: Self = Self {
        stop_propagation: false,
        prevent_default: true,
    };
}

/// An active in-cell editor.
pub struct CellEditor<'a> {
    pub kind: EditorKind,
    pub initial_value: String,
    handler: Box<dyn FnMut(EditorEvent) -> EventResponse + 'a>,
}

impl<'a> CellEditor<'a> {
    pub fn new(
        kind: EditorKind,
        initial_value: impl Into<String>,
        handler: impl FnMut(EditorEvent) -> EventResponse + 'a,
    ) -> Self {
        Self {
            kind,
            initial_value: initial_value.into(),
            handler: Box::new(handler),
        }
    }

    pub fn dispatch(&mut self, event: EditorEvent) -> EventResponse {
        (self.handler)(event)
    }
}

impl std::fmt::Debug for CellEditor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellEditor")
            .field("kind", &self.kind)
            .field("initial_value", &self.initial_value)
            .finish_non_exhaustive()
    }
}

/// Render description of a cell
#[derive(Debug)]
pub enum Presentation<'a> {
    /// Read-only text content
    Text(String),
    Checkbox { checked: bool },
    Editor(CellEditor<'a>),
}

impl Presentation<'_> {
    pub fn is_editor(&self) -> bool {
        matches!(self, Self::Editor(_))
    }
}

/// Behavior of one cell type.
///
/// Implementations must be pure: the same inputs always give the same
/// outputs, and nothing is retained between calls.
pub trait CellTemplate {
    /// Canonical form of an untrusted cell. Total: missing or malformed
    /// fields fall back to defaults.
    fn normalize(&self, candidate: &Cell) -> CompatibleCell;

    /// React to a key press in view mode.
    fn handle_key(&self, cell: &CompatibleCell, key_code: u32, modifiers: Modifiers) -> KeyOutcome;

    /// Fold an edited representation into `cell`, preferring `incoming.text`
    /// and falling back to `incoming.value`.
    fn merge(&self, cell: &CompatibleCell, incoming: &CompatibleCell) -> CompatibleCell;

    /// CSS class names for the cell.
    fn class_name(&self, cell: &CompatibleCell, _editing: bool) -> String {
        cell.cell.class_name().unwrap_or_default().to_string()
    }

    /// Describe the cell. In edit mode the returned editor reports every
    /// change through `on_change`, with `commit = true` once it finalizes.
    fn present<'a>(
        &'a self,
        cell: &CompatibleCell,
        editing: bool,
        on_change: OnCellChanged<'a>,
    ) -> Presentation<'a>;
}

/// `className` and `style` carried over when a template rebuilds a cell
pub(crate) fn carried(cell: &Cell) -> (Option<String>, Option<CellStyle>) {
    (cell.class_name().map(str::to_owned), cell.style().cloned())
}

/// Editor key handling shared by the free-text editors: keep printable and
/// caret keys inside the editor, let the grid see the rest.
pub(crate) fn text_editor_key(chord: KeyChord) -> EventResponse {
    if keys::is_alphanumeric_key(chord.key_code) || keys::is_navigation_key(chord.key_code) {
        EventResponse::STOP
    } else {
        EventResponse::PROPAGATE
    }
}
