//! Key codes and key classification used by templates and the grid.

use serde::{Deserialize, Serialize};

use crate::model::Platform;

pub const POINTER: u32 = 1;
pub const BACKSPACE: u32 = 8;
pub const TAB: u32 = 9;
pub const ENTER: u32 = 13;
pub const SHIFT: u32 = 16;
pub const CTRL: u32 = 17;
pub const ALT: u32 = 18;
pub const ESCAPE: u32 = 27;
pub const SPACE: u32 = 32;
pub const PAGE_UP: u32 = 33;
pub const PAGE_DOWN: u32 = 34;
pub const END: u32 = 35;
pub const HOME: u32 = 36;
pub const LEFT_ARROW: u32 = 37;
pub const UP_ARROW: u32 = 38;
pub const RIGHT_ARROW: u32 = 39;
pub const DOWN_ARROW: u32 = 40;
pub const DELETE: u32 = 46;
pub const ZERO: u32 = 48;
pub const NINE: u32 = 57;
pub const A: u32 = 65;
pub const C: u32 = 67;
pub const V: u32 = 86;
pub const X: u32 = 88;
pub const Z: u32 = 90;
pub const NUM_PAD_0: u32 = 96;
pub const NUM_PAD_9: u32 = 105;
pub const MULTIPLY: u32 = 106;
pub const ADD: u32 = 107;
pub const SUBTRACT: u32 = 109;
pub const DECIMAL: u32 = 110;
pub const DIVIDE: u32 = 111;
pub const F1: u32 = 112;
pub const F12: u32 = 123;
pub const SEMICOLON: u32 = 186;
pub const EQUAL_SIGN: u32 = 187;
pub const COMMA: u32 = 188;
pub const DASH: u32 = 189;
pub const PERIOD: u32 = 190;
pub const FORWARD_SLASH: u32 = 191;
pub const GRAVE_ACCENT: u32 = 192;
pub const OPEN_BRACKET: u32 = 219;
pub const BACK_SLASH: u32 = 220;
pub const CLOSE_BRACKET: u32 = 221;
pub const SINGLE_QUOTE: u32 = 222;

/// Modifier state of a key press.
///
/// `ctrl` is the platform's primary shortcut modifier: the Command key on
/// macOS, Control elsewhere (see [`Modifiers::from_raw`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
        alt: false,
    };
    pub const SHIFT: Self = Self {
        ctrl: false,
        shift: true,
        alt: false,
    };
    pub const CTRL: Self = Self {
        ctrl: true,
        shift: false,
        alt: false,
    };

    /// Build from raw event flags, picking the primary modifier for `platform`.
    pub fn from_raw(ctrl: bool, meta: bool, shift: bool, alt: bool, platform: Platform) -> Self {
        Self {
            ctrl: match platform {
                Platform::Mac => meta,
                Platform::Other => ctrl,
            },
            shift,
            alt,
        }
    }

    pub fn is_empty(self) -> bool {
        !self.ctrl && !self.shift && !self.alt
    }
}

/// A key code with its modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyChord {
    pub key_code: u32,
    pub modifiers: Modifiers,
}

impl KeyChord {
    pub fn new(key_code: u32, modifiers: Modifiers) -> Self {
        Self {
            key_code,
            modifiers,
        }
    }

    pub fn plain(key_code: u32) -> Self {
        Self::new(key_code, Modifiers::NONE)
    }
}

/// Printable keys: digits, letters, numpad, punctuation and space.
pub fn is_alphanumeric_key(key_code: u32) -> bool {
    (ZERO..=Z).contains(&key_code)
        || (NUM_PAD_0..=DIVIDE).contains(&key_code)
        || (SEMICOLON..=GRAVE_ACCENT).contains(&key_code)
        || (OPEN_BRACKET..=SINGLE_QUOTE).contains(&key_code)
        || key_code == SPACE
}

/// Top-row and numpad digits
pub fn is_numeric_key(key_code: u32) -> bool {
    (ZERO..=NINE).contains(&key_code) || is_numpad_numeric_key(key_code)
}

pub fn is_numpad_numeric_key(key_code: u32) -> bool {
    (NUM_PAD_0..=NUM_PAD_9).contains(&key_code)
}

/// Keys that move the caret inside an editor
pub fn is_navigation_key(key_code: u32) -> bool {
    matches!(
        key_code,
        LEFT_ARROW | UP_ARROW | RIGHT_ARROW | DOWN_ARROW | END | HOME | BACKSPACE | DELETE
    )
}

/// Non-digit keys that may start typing a number
pub fn is_allowed_on_number_typing_key(key_code: u32) -> bool {
    matches!(key_code, COMMA | PERIOD | DASH | SUBTRACT | DECIMAL)
}

/// Character produced by a printable key, if any.
pub fn char_from_key_code(key_code: u32, shift: bool) -> Option<char> {
    let ch = match key_code {
        SPACE => ' ',
        ZERO..=NINE | A..=Z => char::from_u32(key_code)?,
        NUM_PAD_0..=NUM_PAD_9 => char::from_u32(key_code - (NUM_PAD_0 - ZERO))?,
        MULTIPLY => '*',
        ADD => '+',
        SUBTRACT | DASH => '-',
        DECIMAL | PERIOD => '.',
        DIVIDE | FORWARD_SLASH => '/',
        SEMICOLON => ';',
        EQUAL_SIGN => '=',
        COMMA => ',',
        GRAVE_ACCENT => '`',
        OPEN_BRACKET => '[',
        BACK_SLASH => '\\',
        CLOSE_BRACKET => ']',
        SINGLE_QUOTE => '\'',
        _ => return None,
    };
    Some(if shift { ch } else { ch.to_ascii_lowercase() })
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

    #[test_case(A, true; "letter")]
    #[test_case(ZERO + 5, true; "digit")]
    #[test_case(NUM_PAD_0 + 3, true; "numpad digit")]
    #[test_case(SPACE, true; "space")]
    #[test_case(COMMA, true; "comma")]
    #[test_case(LEFT_ARROW, false; "arrow")]
    #[test_case(ENTER, false; "enter")]
    #[test_case(F1, false; "function key")]
    #[test_case(SHIFT, false; "bare modifier")]
    fn test_is_alphanumeric_key(key_code: u32, expected: bool) {
        assert_eq!(is_alphanumeric_key(key_code), expected);
    }

    #[test]
    fn test_char_from_key_code() {
        assert_eq!(char_from_key_code(A, false), Some('a'));
        assert_eq!(char_from_key_code(A, true), Some('A'));
        assert_eq!(char_from_key_code(ZERO + 7, false), Some('7'));
        assert_eq!(char_from_key_code(NUM_PAD_0 + 2, false), Some('2'));
        assert_eq!(char_from_key_code(PERIOD, false), Some('.'));
        assert_eq!(char_from_key_code(ENTER, false), None);
    }

    #[test]
    fn test_modifiers_from_raw_per_platform() {
        let mac = Modifiers::from_raw(false, true, false, false, Platform::Mac);
        assert!(mac.ctrl);
        let other = Modifiers::from_raw(false, true, false, false, Platform::Other);
        assert!(!other.ctrl);
        assert!(other.is_empty());
    }
}
