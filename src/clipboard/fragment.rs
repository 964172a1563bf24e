//! The HTML fragment used to round-trip cells through the system clipboard.
//!
//! The fragment is a table whose root carries the content marker. Each data
//! cell holds its serialized cell in the same attribute, next to its text:
//!
//! ```html
//! <table data-cellgrid="cellgrid-content"><tbody>
//!   <tr><td data-cellgrid="{&quot;type&quot;:&quot;text&quot;,...}">hello</td></tr>
//! </tbody></table>
//! ```
//!
//! Clipboard HTML from browsers is not well-formed XML (void elements,
//! unquoted attributes, stray wrappers), so the reader is a lenient scan
//! rather than a validating parse.

use std::borrow::Cow;

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;

/// Attribute carrying the marker on the root and the payload on cells
pub const CONTENT_ATTR: &str = "data-cellgrid";

/// Marker value identifying fragments written by [`write_fragment`]
pub const CONTENT_MARKER: &str = "cellgrid-content";

/// Elements browsers wrap pasted content in
const WRAPPERS: [&str; 7] = ["html", "head", "body", "meta", "style", "title", "link"];

/// First data cell of a marked fragment
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkedCell {
    /// Raw serialized cell, when the cell carries one
    pub payload: Option<String>,
    /// Text content of the cell
    pub inner_text: String,
}

/// What the reader found in clipboard HTML
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// No markup, or markup from another application
    Unmarked,
    /// Our fragment; `None` when it contains no data cell
    Marked(Option<MarkedCell>),
}

/// One cell to write: its serialized form and display text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentCell {
    pub payload: String,
    pub text: String,
}

/// Scan clipboard HTML for the marked root and its first data cell.
pub fn read_fragment(html: &str) -> Fragment {
    let mut reader = Reader::from_str(html);
    reader.check_end_names(false);

    let mut scanner = Scanner::default();
    loop {
        let done = match reader.read_event() {
            Ok(Event::Start(e)) => scanner.open(&e, false),
            Ok(Event::Empty(e)) => scanner.open(&e, true),
            Ok(Event::End(e)) => scanner.close(e.local_name().as_ref()),
            Ok(Event::Text(t)) => {
                scanner.text(&t);
                None
            }
            Ok(Event::CData(t)) => {
                scanner.push_text(&String::from_utf8_lossy(&t));
                None
            }
            Ok(Event::Eof) => break,
            Err(error) => {
                tracing::debug!(
                    target: "cellgrid.paste",
                    %error,
                    position = reader.buffer_position(),
                    "stopped reading clipboard html"
                );
                break;
            }
            _ => None,
        };
        if let Some(fragment) = done {
            return fragment;
        }
    }
    scanner.finish()
}

#[derive(Default)]
enum ScanState {
    /// Before the first non-wrapper element
    #[default]
    Root,
    /// Inside the marked root, looking for a data cell
    Marked,
    /// Collecting the first data cell
    InCell(MarkedCell),
}

#[derive(Default)]
struct Scanner {
    state: ScanState,
}

impl Scanner {
    /// Returns the result as soon as it is known.
    fn open(&mut self, e: &BytesStart<'_>, self_closing: bool) -> Option<Fragment> {
        let name = element_name(e.local_name().as_ref());
        match &mut self.state {
            ScanState::Root => {
                if WRAPPERS.contains(&name.as_str()) {
                    return None;
                }
                if attr_string(e, CONTENT_ATTR).as_deref() != Some(CONTENT_MARKER) {
                    return Some(Fragment::Unmarked);
                }
                self.state = ScanState::Marked;
                None
            }
            ScanState::Marked if name == "td" || name == "th" => {
                let cell = MarkedCell {
                    payload: attr_string(e, CONTENT_ATTR),
                    inner_text: String::new(),
                };
                if self_closing {
                    return Some(Fragment::Marked(Some(cell)));
                }
                self.state = ScanState::InCell(cell);
                None
            }
            ScanState::InCell(cell) if name == "br" => {
                cell.inner_text.push('\n');
                None
            }
            ScanState::Marked | ScanState::InCell(_) => None,
        }
    }

    fn close(&mut self, local_name: &[u8]) -> Option<Fragment> {
        let name = element_name(local_name);
        if matches!(self.state, ScanState::InCell(_)) && (name == "td" || name == "th") {
            return Some(self.finish());
        }
        None
    }

    fn text(&mut self, t: &BytesText<'_>) {
        if !matches!(self.state, ScanState::InCell(_)) {
            return;
        }
        let text = t
            .unescape_with(html_entity)
            .unwrap_or_else(|_| String::from_utf8_lossy(t).into_owned().into());
        self.push_text(&text);
    }

    fn push_text(&mut self, text: &str) {
        if let ScanState::InCell(cell) = &mut self.state {
            cell.inner_text.push_str(text);
        }
    }

    fn finish(&mut self) -> Fragment {
        match std::mem::take(&mut self.state) {
            ScanState::Root => Fragment::Unmarked,
            ScanState::Marked => Fragment::Marked(None),
            ScanState::InCell(cell) => Fragment::Marked(Some(cell)),
        }
    }
}

fn element_name(local_name: &[u8]) -> String {
    String::from_utf8_lossy(local_name).to_ascii_lowercase()
}

/// Extract an attribute by case-insensitive name, unescaped.
fn attr_string(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.html_attributes()
        .flatten()
        .find(|attr| attr.key.as_ref().eq_ignore_ascii_case(key.as_bytes()))
        .and_then(|attr| attr.unescape_value().ok().map(Cow::into_owned))
}

/// The few named entities browsers put in copied text beyond XML's own.
fn html_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "nbsp" => Some("\u{a0}"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "quot" => Some("\""),
        "apos" | "#39" => Some("'"),
        _ => None,
    }
}

/// Write rows of cells as a marked fragment.
pub fn write_fragment(rows: &[Vec<FragmentCell>]) -> String {
    let mut out = String::with_capacity(64 + rows.len() * 128);
    out.push_str(&format!("<table {CONTENT_ATTR}=\"{CONTENT_MARKER}\"><tbody>"));
    for row in rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str(&format!(
                "<td {CONTENT_ATTR}=\"{}\">{}</td>",
                escape(cell.payload.as_str()),
                escape(cell.text.as_str())
            ));
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out
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

    #[test]
    fn test_unmarked_html() {
        assert_eq!(read_fragment(""), Fragment::Unmarked);
        assert_eq!(read_fragment("plain words"), Fragment::Unmarked);
        assert_eq!(
            read_fragment("<table><tr><td>1</td></tr></table>"),
            Fragment::Unmarked
        );
    }

    #[test]
    fn test_marked_first_cell() {
        let html = r#"<table data-cellgrid="cellgrid-content"><tbody>
            <tr><td data-cellgrid="{&quot;type&quot;:&quot;text&quot;}">a &amp; b</td><td>x</td></tr>
            </tbody></table>"#;
        let Fragment::Marked(Some(cell)) = read_fragment(html) else {
            panic!("expected marked cell");
        };
        assert_eq!(cell.payload.as_deref(), Some(r#"{"type":"text"}"#));
        assert_eq!(cell.inner_text, "a & b");
    }

    #[test]
    fn test_browser_wrapping() {
        let html = "<html><head><meta charset=\"utf-8\"></head><body><!--StartFragment-->\
            <table data-cellgrid=cellgrid-content><tr><td>7&nbsp;kg<br>net</td></tr></table>\
            <!--EndFragment--></body></html>";
        let Fragment::Marked(Some(cell)) = read_fragment(html) else {
            panic!("expected marked cell");
        };
        assert_eq!(cell.payload, None);
        assert_eq!(cell.inner_text, "7\u{a0}kg\nnet");
    }

    #[test]
    fn test_marked_without_cells() {
        let html = r#"<table data-cellgrid="cellgrid-content"></table>"#;
        assert_eq!(read_fragment(html), Fragment::Marked(None));
    }

    #[test]
    fn test_write_then_read() {
        let rows = vec![vec![
            FragmentCell {
                payload: r#"{"type":"text","text":"<b>\"q\""}"#.to_string(),
                text: "<b>\"q\"".to_string(),
            },
            FragmentCell {
                payload: "{}".to_string(),
                text: "second".to_string(),
            },
        ]];
        let html = write_fragment(&rows);
        assert!(html.starts_with("<table data-cellgrid=\"cellgrid-content\">"));

        let Fragment::Marked(Some(cell)) = read_fragment(&html) else {
            panic!("expected marked cell");
        };
        assert_eq!(cell.payload.as_deref(), Some(rows[0][0].payload.as_str()));
        assert_eq!(cell.inner_text, rows[0][0].text);
    }
}
