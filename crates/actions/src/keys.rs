//! Key value normalization and US-layout key data
//!
//! WebDriver encodes non-printable keys as code points in the private use
//! range U+E000..=U+E05D. This module maps those (and printable characters)
//! to the `key`, `code` and `location` attributes of a keyboard event.

use serde::{Serialize, Serializer};

/// DOM `KeyboardEvent.location`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyLocation {
    #[default]
    Standard,
    Left,
    Right,
    Numpad,
}

impl KeyLocation {
    /// Numeric value as exposed by `KeyboardEvent.location`
    pub fn as_u8(self) -> u8 {
        match self {
            KeyLocation::Standard => 0,
            KeyLocation::Left => 1,
            KeyLocation::Right => 2,
            KeyLocation::Numpad => 3,
        }
    }
}

impl Serialize for KeyLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

/// Modifier flag carried by key input state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Alt,
    Shift,
    Ctrl,
    Meta,
}

/// Event attributes for one key value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyData {
    pub key: String,
    pub code: &'static str,
    pub location: KeyLocation,
    pub printable: bool,
}

// (code point, key, code, location)
const SPECIAL_KEYS: &[(char, &str, &str, KeyLocation)] = &[
    ('\u{E000}', "Unidentified", "", KeyLocation::Standard),
    ('\u{E001}', "Cancel", "", KeyLocation::Standard),
    ('\u{E002}', "Help", "Help", KeyLocation::Standard),
    ('\u{E003}', "Backspace", "Backspace", KeyLocation::Standard),
    ('\u{E004}', "Tab", "Tab", KeyLocation::Standard),
    ('\u{E005}', "Clear", "", KeyLocation::Standard),
    ('\u{E006}', "Enter", "Enter", KeyLocation::Standard),
    ('\u{E007}', "Enter", "NumpadEnter", KeyLocation::Numpad),
    ('\u{E008}', "Shift", "ShiftLeft", KeyLocation::Left),
    ('\u{E009}', "Control", "ControlLeft", KeyLocation::Left),
    ('\u{E00A}', "Alt", "AltLeft", KeyLocation::Left),
    ('\u{E00B}', "Pause", "Pause", KeyLocation::Standard),
    ('\u{E00C}', "Escape", "Escape", KeyLocation::Standard),
    ('\u{E00D}', " ", "Space", KeyLocation::Standard),
    ('\u{E00E}', "PageUp", "PageUp", KeyLocation::Standard),
    ('\u{E00F}', "PageDown", "PageDown", KeyLocation::Standard),
    ('\u{E010}', "End", "End", KeyLocation::Standard),
    ('\u{E011}', "Home", "Home", KeyLocation::Standard),
    ('\u{E012}', "ArrowLeft", "ArrowLeft", KeyLocation::Standard),
    ('\u{E013}', "ArrowUp", "ArrowUp", KeyLocation::Standard),
    ('\u{E014}', "ArrowRight", "ArrowRight", KeyLocation::Standard),
    ('\u{E015}', "ArrowDown", "ArrowDown", KeyLocation::Standard),
    ('\u{E016}', "Insert", "Insert", KeyLocation::Standard),
    ('\u{E017}', "Delete", "Delete", KeyLocation::Standard),
    ('\u{E018}', ";", "Semicolon", KeyLocation::Standard),
    ('\u{E019}', "=", "Equal", KeyLocation::Standard),
    ('\u{E01A}', "0", "Numpad0", KeyLocation::Numpad),
    ('\u{E01B}', "1", "Numpad1", KeyLocation::Numpad),
    ('\u{E01C}', "2", "Numpad2", KeyLocation::Numpad),
    ('\u{E01D}', "3", "Numpad3", KeyLocation::Numpad),
    ('\u{E01E}', "4", "Numpad4", KeyLocation::Numpad),
    ('\u{E01F}', "5", "Numpad5", KeyLocation::Numpad),
    ('\u{E020}', "6", "Numpad6", KeyLocation::Numpad),
    ('\u{E021}', "7", "Numpad7", KeyLocation::Numpad),
    ('\u{E022}', "8", "Numpad8", KeyLocation::Numpad),
    ('\u{E023}', "9", "Numpad9", KeyLocation::Numpad),
    ('\u{E024}', "*", "NumpadMultiply", KeyLocation::Numpad),
    ('\u{E025}', "+", "NumpadAdd", KeyLocation::Numpad),
    ('\u{E026}', ",", "NumpadComma", KeyLocation::Numpad),
    ('\u{E027}', "-", "NumpadSubtract", KeyLocation::Numpad),
    ('\u{E028}', ".", "NumpadDecimal", KeyLocation::Numpad),
    ('\u{E029}', "/", "NumpadDivide", KeyLocation::Numpad),
    ('\u{E031}', "F1", "F1", KeyLocation::Standard),
    ('\u{E032}', "F2", "F2", KeyLocation::Standard),
    ('\u{E033}', "F3", "F3", KeyLocation::Standard),
    ('\u{E034}', "F4", "F4", KeyLocation::Standard),
    ('\u{E035}', "F5", "F5", KeyLocation::Standard),
    ('\u{E036}', "F6", "F6", KeyLocation::Standard),
    ('\u{E037}', "F7", "F7", KeyLocation::Standard),
    ('\u{E038}', "F8", "F8", KeyLocation::Standard),
    ('\u{E039}', "F9", "F9", KeyLocation::Standard),
    ('\u{E03A}', "F10", "F10", KeyLocation::Standard),
    ('\u{E03B}', "F11", "F11", KeyLocation::Standard),
    ('\u{E03C}', "F12", "F12", KeyLocation::Standard),
    ('\u{E03D}', "Meta", "MetaLeft", KeyLocation::Left),
    ('\u{E040}', "ZenkakuHankaku", "Lang1", KeyLocation::Standard),
    ('\u{E050}', "Shift", "ShiftRight", KeyLocation::Right),
    ('\u{E051}', "Control", "ControlRight", KeyLocation::Right),
    ('\u{E052}', "Alt", "AltRight", KeyLocation::Right),
    ('\u{E053}', "Meta", "MetaRight", KeyLocation::Right),
    ('\u{E054}', "PageUp", "Numpad9", KeyLocation::Numpad),
    ('\u{E055}', "PageDown", "Numpad3", KeyLocation::Numpad),
    ('\u{E056}', "End", "Numpad1", KeyLocation::Numpad),
    ('\u{E057}', "Home", "Numpad7", KeyLocation::Numpad),
    ('\u{E058}', "ArrowLeft", "Numpad4", KeyLocation::Numpad),
    ('\u{E059}', "ArrowUp", "Numpad8", KeyLocation::Numpad),
    ('\u{E05A}', "ArrowRight", "Numpad6", KeyLocation::Numpad),
    ('\u{E05B}', "ArrowDown", "Numpad2", KeyLocation::Numpad),
    ('\u{E05C}', "Insert", "Numpad0", KeyLocation::Numpad),
    ('\u{E05D}', "Delete", "NumpadDecimal", KeyLocation::Numpad),
];

// (unshifted, shifted, code)
const PRINTABLE_KEYS: &[(char, char, &str)] = &[
    ('`', '~', "Backquote"),
    ('1', '!', "Digit1"),
    ('2', '@', "Digit2"),
    ('3', '#', "Digit3"),
    ('4', '$', "Digit4"),
    ('5', '%', "Digit5"),
    ('6', '^', "Digit6"),
    ('7', '&', "Digit7"),
    ('8', '*', "Digit8"),
    ('9', '(', "Digit9"),
    ('0', ')', "Digit0"),
    ('-', '_', "Minus"),
    ('=', '+', "Equal"),
    ('[', '{', "BracketLeft"),
    (']', '}', "BracketRight"),
    ('\\', '|', "Backslash"),
    (';', ':', "Semicolon"),
    ('\'', '"', "Quote"),
    (',', '<', "Comma"),
    ('.', '>', "Period"),
    ('/', '?', "Slash"),
];

const LETTER_CODES: [&str; 26] = [
    "KeyA", "KeyB", "KeyC", "KeyD", "KeyE", "KeyF", "KeyG", "KeyH", "KeyI", "KeyJ", "KeyK",
    "KeyL", "KeyM", "KeyN", "KeyO", "KeyP", "KeyQ", "KeyR", "KeyS", "KeyT", "KeyU", "KeyV",
    "KeyW", "KeyX", "KeyY", "KeyZ",
];

fn single_char(raw: &str) -> Option<char> {
    let mut chars = raw.chars();
    let first = chars.next()?;
    chars.next().is_none().then_some(first)
}

fn special(raw: &str) -> Option<&'static (char, &'static str, &'static str, KeyLocation)> {
    let ch = single_char(raw)?;
    SPECIAL_KEYS.iter().find(|entry| entry.0 == ch)
}

/// Normalized key value: private-use code points become their key names,
/// everything else is returned unchanged.
pub fn normalize(raw: &str) -> String {
    match special(raw) {
        Some((_, key, _, _)) => (*key).to_string(),
        None => raw.to_string(),
    }
}

fn printable_code(ch: char) -> &'static str {
    if ch.is_ascii_alphabetic() {
        return LETTER_CODES[(ch.to_ascii_lowercase() as u8 - b'a') as usize];
    }
    if ch == ' ' {
        return "Space";
    }
    PRINTABLE_KEYS
        .iter()
        .find(|(plain, shifted, _)| *plain == ch || *shifted == ch)
        .map(|(_, _, code)| *code)
        .unwrap_or("")
}

/// Look up event attributes for a raw key value.
pub fn key_data(raw: &str) -> KeyData {
    if let Some((_, key, code, location)) = special(raw) {
        return KeyData {
            key: (*key).to_string(),
            code,
            location: *location,
            printable: key.chars().count() == 1,
        };
    }
    let code = single_char(raw).map(printable_code).unwrap_or("");
    KeyData {
        key: raw.to_string(),
        code,
        location: KeyLocation::Standard,
        printable: !raw.is_empty(),
    }
}

/// US-layout shifted form of a key value. Values without one come back as-is.
pub fn shifted_key(raw: &str) -> String {
    let Some(ch) = single_char(raw) else {
        return raw.to_string();
    };
    if ch.is_ascii_lowercase() {
        return ch.to_ascii_uppercase().to_string();
    }
    PRINTABLE_KEYS
        .iter()
        .find(|(plain, _, _)| *plain == ch)
        .map(|(_, shifted, _)| shifted.to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Modifier flag controlled by a normalized key value, if any.
pub fn modifier_for(key: &str) -> Option<Modifier> {
    match key {
        "Alt" => Some(Modifier::Alt),
        "Shift" => Some(Modifier::Shift),
        "Control" => Some(Modifier::Ctrl),
        "Meta" => Some(Modifier::Meta),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_use_code_points_normalize_to_names() {
        assert_eq!(normalize("\u{E008}"), "Shift");
        assert_eq!(normalize("\u{E050}"), "Shift");
        assert_eq!(normalize("\u{E006}"), "Enter");
        assert_eq!(normalize("a"), "a");
    }

    #[test]
    fn key_data_reports_code_and_location() {
        let right_ctrl = key_data("\u{E051}");
        assert_eq!(right_ctrl.key, "Control");
        assert_eq!(right_ctrl.code, "ControlRight");
        assert_eq!(right_ctrl.location, KeyLocation::Right);
        assert_eq!(serde_json::to_value(right_ctrl.location).unwrap(), 2);
        assert!(!right_ctrl.printable);

        let numpad = key_data("\u{E01D}");
        assert_eq!(numpad.key, "3");
        assert_eq!(numpad.location, KeyLocation::Numpad);
        assert!(numpad.printable);

        let letter = key_data("Q");
        assert_eq!(letter.code, "KeyQ");
        assert!(letter.printable);

        assert_eq!(key_data("!").code, "Digit1");
        assert_eq!(key_data("é").code, "");
    }

    #[test]
    fn shift_map_covers_letters_digits_and_punctuation() {
        assert_eq!(shifted_key("a"), "A");
        assert_eq!(shifted_key("2"), "@");
        assert_eq!(shifted_key("/"), "?");
        assert_eq!(shifted_key("A"), "A");
        assert_eq!(shifted_key("Enter"), "Enter");
    }

    #[test]
    fn only_the_four_modifiers_map_to_flags() {
        assert_eq!(modifier_for("Control"), Some(Modifier::Ctrl));
        assert_eq!(modifier_for("Meta"), Some(Modifier::Meta));
        assert_eq!(modifier_for("a"), None);
    }
}
