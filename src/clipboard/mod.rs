//! Clipboard interchange.
//!
//! Copy writes the active selection as a marked HTML fragment (lossless,
//! for pasting back into a grid) plus tab-separated text (for everything
//! else). Paste reads either form back into a single candidate cell and
//! hands it to a caller-supplied applier that owns multi-cell fan-out.

mod copy;
mod fragment;
mod paste;

pub use copy::{copy_selection, escape_cell_value, handle_copy, handle_cut, CopyPayload};
pub use fragment::{
    read_fragment, write_fragment, Fragment, FragmentCell, MarkedCell, CONTENT_ATTR,
    CONTENT_MARKER,
};
pub use paste::{handle_paste, pasted_cell, text_cell};

use std::collections::BTreeMap;

pub const HTML_MIME: &str = "text/html";
pub const TEXT_MIME: &str = "text/plain";

/// The parts of a platform clipboard event the grid needs.
pub trait ClipboardEvent {
    /// Clipboard content for a MIME type, if present
    fn data(&self, mime: &str) -> Option<String>;

    /// Store content for a MIME type; returns whether it was accepted
    fn set_data(&mut self, mime: &str, data: &str) -> bool;

    /// Suppress the platform's own handling of the event
    fn prevent_default(&mut self);
}

/// In-memory clipboard event, for hosts without a native one and for tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardData {
    entries: BTreeMap<String, String>,
    default_prevented: bool,
}

impl ClipboardData {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.entries.insert(HTML_MIME.to_string(), html.into());
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.entries.insert(TEXT_MIME.to_string(), text.into());
        self
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

impl ClipboardEvent for ClipboardData {
    fn data(&self, mime: &str) -> Option<String> {
        self.entries.get(mime).cloned()
    }

    fn set_data(&mut self, mime: &str, data: &str) -> bool {
        self.entries.insert(mime.to_string(), data.to_string());
        true
    }

    fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

#[cfg(target_arch = "wasm32")]
impl ClipboardEvent for web_sys::ClipboardEvent {
    fn data(&self, mime: &str) -> Option<String> {
        self.clipboard_data()
            .and_then(|transfer| transfer.get_data(mime).ok())
            .filter(|data| !data.is_empty())
    }

    fn set_data(&mut self, mime: &str, data: &str) -> bool {
        self.clipboard_data()
            .is_some_and(|transfer| transfer.set_data(mime, data).is_ok())
    }

    fn prevent_default(&mut self) {
        web_sys::Event::prevent_default(self);
    }
}
