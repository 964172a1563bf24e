//! JavaScript facade.
//!
//! `GridCore` owns one [`State`] and exposes the pure transitions as
//! methods taking and returning plain JS values. Cell data stays with the
//! host: edits come back as change lists, pastes as a candidate cell plus
//! the destination ids to fan out over.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::clipboard::{copy_selection, handle_paste, ClipboardData};
use crate::matrix::{CellMatrix, Viewport};
use crate::model::{
    CompatibleCell, GridProps, Highlight, Id, Location, Platform, PropsHandle, Range,
};
use crate::state::{
    cancel_edit, derive_state, focus_location, handle_key_down, set_viewport, update_edited_cell,
    State, Transition,
};
use crate::templates::keys::{KeyChord, Modifiers};

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PastePlan {
    cell: CompatibleCell,
    row_ids: Vec<Id>,
    column_ids: Vec<Id>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot<'a> {
    matrix: Option<&'a CellMatrix>,
    focused_location: Option<&'a Location>,
    visible_range: Option<&'a Range>,
    selected_ranges: &'a [Range],
    active_selected_range_idx: usize,
    highlight_locations: &'a [Highlight],
    currently_edited_cell: Option<&'a CompatibleCell>,
}

/// Grid core exported to JavaScript
#[wasm_bindgen]
pub struct GridCore {
    state: State,
}

impl GridCore {
    fn apply(&mut self, f: impl FnOnce(State) -> Transition) -> Result<JsValue, JsValue> {
        let transition = f(std::mem::take(&mut self.state));
        self.state = transition.state;
        to_js(&transition.changes)
    }

    fn platform(&self) -> Platform {
        self.state
            .props
            .as_ref()
            .map(|props| props.locale.platform)
            .unwrap_or_default()
    }
}

#[wasm_bindgen]
impl GridCore {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> GridCore {
        console_error_panic_hook::set_once();
        GridCore {
            state: State::new().with_viewport(Viewport::new(width, height)),
        }
    }

    /// Adopt a new grid definition (JSON, camelCase).
    ///
    /// # Errors
    /// Returns an error if the JSON does not describe a grid.
    #[wasm_bindgen(js_name = "setProps")]
    pub fn set_props(&mut self, json: &str) -> Result<(), JsValue> {
        let props = GridProps::from_json(json).map_err(js_err)?;
        let handle = PropsHandle::new(props);
        self.state = derive_state(&handle, std::mem::take(&mut self.state));
        Ok(())
    }

    #[wasm_bindgen(js_name = "setViewport")]
    pub fn set_viewport(&mut self, width: f32, height: f32, scroll_left: f32, scroll_top: f32) {
        let viewport = Viewport::new(width, height).scrolled_to(scroll_left, scroll_top);
        self.state = set_viewport(std::mem::take(&mut self.state), viewport);
    }

    /// Focus the cell at the given ids.
    ///
    /// # Errors
    /// Returns an error if either id is unknown.
    #[wasm_bindgen]
    pub fn focus(&mut self, row_id: &str, column_id: &str) -> Result<(), JsValue> {
        let location = self
            .state
            .cell_matrix
            .as_ref()
            .ok_or_else(|| JsValue::from_str("No grid definition loaded"))?
            .get_location_by_id(row_id, column_id)
            .map_err(js_err)?;
        self.state = focus_location(std::mem::take(&mut self.state), &location);
        Ok(())
    }

    /// Route a key press; returns the resulting cell changes.
    ///
    /// # Errors
    /// Returns an error if the changes cannot be serialized.
    #[wasm_bindgen(js_name = "keyDown")]
    pub fn key_down(
        &mut self,
        key_code: u32,
        ctrl: bool,
        meta: bool,
        shift: bool,
        alt: bool,
    ) -> Result<JsValue, JsValue> {
        let modifiers = Modifiers::from_raw(ctrl, meta, shift, alt, self.platform());
        let chord = KeyChord::new(key_code, modifiers);
        self.apply(|state| handle_key_down(state, chord))
    }

    /// Editor change sink; returns the committed changes, if any.
    ///
    /// # Errors
    /// Returns an error if `cell_json` is not a cell.
    #[wasm_bindgen(js_name = "editCell")]
    pub fn edit_cell(&mut self, cell_json: &str, commit: bool) -> Result<JsValue, JsValue> {
        let cell = CompatibleCell::from_json(cell_json).map_err(js_err)?;
        self.apply(|state| update_edited_cell(state, cell, commit))
    }

    #[wasm_bindgen(js_name = "cancelEdit")]
    pub fn cancel_edit(&mut self) {
        self.state = cancel_edit(std::mem::take(&mut self.state));
    }

    /// Read pasted content; returns `{ cell, rowIds, columnIds }` or `undefined`
    /// when nothing is selected.
    ///
    /// # Errors
    /// Returns an error if the plan cannot be serialized.
    #[wasm_bindgen]
    pub fn paste(&mut self, html: &str, text: &str) -> Result<JsValue, JsValue> {
        let mut event = ClipboardData::new().with_html(html).with_text(text);
        let mut plan = None;
        self.state = handle_paste(&mut event, std::mem::take(&mut self.state), |state, range, cell| {
            plan = Some(PastePlan {
                cell,
                row_ids: range.row_ids(),
                column_ids: range.column_ids(),
            });
            state
        });
        to_js(&plan)
    }

    /// Serialize the active selection as `{ html, text }`, or `undefined`.
    ///
    /// # Errors
    /// Returns an error if the payload cannot be serialized.
    #[wasm_bindgen]
    pub fn copy(&self) -> Result<JsValue, JsValue> {
        to_js(&copy_selection(&self.state))
    }

    /// Geometry, focus, selection and edit session as a JS object.
    ///
    /// # Errors
    /// Returns an error if the snapshot cannot be serialized.
    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let state = &self.state;
        to_js(&Snapshot {
            matrix: state.cell_matrix.as_deref(),
            focused_location: state.focused_location.as_ref(),
            visible_range: state.visible_range.as_ref(),
            selected_ranges: &state.selected_ranges,
            active_selected_range_idx: state.active_selected_range_idx,
            highlight_locations: &state.highlight_locations,
            currently_edited_cell: state.currently_edited_cell.as_ref(),
        })
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl GridCore {
    /// Handle a native `paste` event; returns the paste plan like [`GridCore::paste`].
    ///
    /// # Errors
    /// Returns an error if the plan cannot be serialized.
    #[wasm_bindgen(js_name = "pasteEvent")]
    pub fn paste_event(&mut self, mut event: web_sys::ClipboardEvent) -> Result<JsValue, JsValue> {
        let mut plan = None;
        self.state = handle_paste(&mut event, std::mem::take(&mut self.state), |state, range, cell| {
            plan = Some(PastePlan {
                cell,
                row_ids: range.row_ids(),
                column_ids: range.column_ids(),
            });
            state
        });
        to_js(&plan)
    }

    /// Handle a native `copy` event; returns whether anything was copied.
    #[wasm_bindgen(js_name = "copyEvent")]
    pub fn copy_event(&self, mut event: web_sys::ClipboardEvent) -> bool {
        crate::clipboard::handle_copy(&mut event, &self.state)
    }

    /// Handle a native `cut` event; returns the cleared cells as changes.
    ///
    /// # Errors
    /// Returns an error if the changes cannot be serialized.
    #[wasm_bindgen(js_name = "cutEvent")]
    pub fn cut_event(&mut self, mut event: web_sys::ClipboardEvent) -> Result<JsValue, JsValue> {
        self.apply(|state| crate::clipboard::handle_cut(&mut event, state))
    }

    /// Handle a native `keydown` event; returns the resulting cell changes.
    ///
    /// # Errors
    /// Returns an error if the changes cannot be serialized.
    #[wasm_bindgen(js_name = "keyDownEvent")]
    pub fn key_down_event(&mut self, event: &web_sys::KeyboardEvent) -> Result<JsValue, JsValue> {
        self.key_down(
            event.key_code(),
            event.ctrl_key(),
            event.meta_key(),
            event.shift_key(),
            event.alt_key(),
        )
    }
}
