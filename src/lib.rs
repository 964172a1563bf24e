//! cellgrid - virtualized spreadsheet grid core
//!
//! The framework-independent half of a data grid, usable natively or from
//! the browser via WebAssembly:
//! - Row/column geometry with frozen panes, built once per definition
//! - Pluggable cell templates (text, header, number, checkbox, time, custom)
//! - Pure state derivation whenever the host hands in a new definition
//! - Keyboard navigation, single-cell edit sessions, copy/cut/paste
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { GridCore } from 'cellgrid';
//! await init();
//! const grid = new GridCore(width, height);
//! grid.setProps(JSON.stringify(definition));
//! grid.focus('r0', 'c0');
//! const changes = grid.keyDown(13, false, false, false, false);
//! ```

pub mod clipboard;
pub mod error;
pub mod matrix;
pub mod model;
pub mod numeric;
pub mod state;
pub mod templates;
pub mod wasm;

use wasm_bindgen::prelude::*;

pub use error::{GridError, Result};
pub use matrix::{CellMatrix, Viewport};
pub use model::*;
pub use state::{derive_state, State, Transition};
pub use templates::{CellTemplate, CellTemplates};
pub use wasm::GridCore;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
