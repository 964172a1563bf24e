use super::fragment::{read_fragment, Fragment};
use super::{ClipboardEvent, HTML_MIME, TEXT_MIME};
use crate::model::{Cell, CompatibleCell, Range};
use crate::numeric::parse_float_prefix;
use crate::state::{get_active_selected_range, State};

/// Paste the clipboard at the active selection.
///
/// Without an active selection the state is returned untouched and the
/// event is left alone. Otherwise the platform default is suppressed and
/// `apply` receives the destination range and the pasted candidate cell.
pub fn handle_paste<E, F>(event: &mut E, state: State, apply: F) -> State
where
    E: ClipboardEvent + ?Sized,
    F: FnOnce(State, &Range, CompatibleCell) -> State,
{
    let Some(range) = get_active_selected_range(&state).cloned() else {
        tracing::trace!(target: "cellgrid.paste", "no active selection; paste ignored");
        return state;
    };
    let candidate = pasted_cell(event);
    event.prevent_default();
    tracing::debug!(
        target: "cellgrid.paste",
        cell_type = candidate.type_tag(),
        rows = range.rows.len(),
        columns = range.columns.len(),
        "paste"
    );
    apply(state, &range, candidate)
}

/// The candidate cell carried by a clipboard event.
///
/// Marked HTML yields its embedded cell exactly; a missing or unreadable
/// payload degrades to the cell's text, and unmarked content to the plain
/// text representation.
pub fn pasted_cell<E: ClipboardEvent + ?Sized>(event: &E) -> CompatibleCell {
    let html = event.data(HTML_MIME).unwrap_or_default();
    match read_fragment(&html) {
        Fragment::Marked(Some(marked)) => marked
            .payload
            .as_deref()
            .and_then(|raw| match CompatibleCell::from_json(raw) {
                Ok(cell) => Some(cell),
                Err(error) => {
                    tracing::debug!(
                        target: "cellgrid.paste",
                        %error,
                        "unreadable cell payload; using cell text"
                    );
                    None
                }
            })
            .unwrap_or_else(|| text_cell(marked.inner_text)),
        Fragment::Marked(None) => {
            tracing::debug!(
                target: "cellgrid.paste",
                "marked content without cells; using plain text"
            );
            text_cell(event.data(TEXT_MIME).unwrap_or_default())
        }
        Fragment::Unmarked => text_cell(event.data(TEXT_MIME).unwrap_or_default()),
    }
}

/// A text cell whose `value` is the leading number in `text`, if any.
pub fn text_cell(text: String) -> CompatibleCell {
    let value = parse_float_prefix(&text);
    CompatibleCell::new(Cell::text(text.as_str()), text, value)
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
    use crate::clipboard::ClipboardData;

    #[test]
    fn test_plain_text_numeric() {
        let event = ClipboardData::new().with_text("42");
        let cell = pasted_cell(&event);
        assert_eq!(cell.type_tag(), "text");
        assert_eq!(cell.text, "42");
        assert_eq!(cell.value, 42.0);
    }

    #[test]
    fn test_plain_text_lenient_prefix() {
        let cell = pasted_cell(&ClipboardData::new().with_text("12abc"));
        assert_eq!(cell.value, 12.0);
        let cell = pasted_cell(&ClipboardData::new().with_text("abc"));
        assert!(cell.value.is_nan());
    }

    #[test]
    fn test_foreign_html_uses_plain_text() {
        let event = ClipboardData::new()
            .with_html("<table><tr><td>html</td></tr></table>")
            .with_text("plain");
        assert_eq!(pasted_cell(&event).text, "plain");
    }

    #[test]
    fn test_bad_payload_uses_cell_text() {
        let html = r#"<table data-cellgrid="cellgrid-content"><tr><td data-cellgrid="{not json">7 days</td></tr></table>"#;
        let cell = pasted_cell(&ClipboardData::new().with_html(html).with_text("ignored"));
        assert_eq!(cell.type_tag(), "text");
        assert_eq!(cell.text, "7 days");
        assert_eq!(cell.value, 7.0);
    }

    #[test]
    fn test_empty_clipboard() {
        let cell = pasted_cell(&ClipboardData::new());
        assert_eq!(cell.text, "");
        assert!(cell.value.is_nan());
    }
}
