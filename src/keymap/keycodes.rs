//! Key vocabulary tables
//!
//! Display tokens are the names shown to and typed by the operator (the
//! desktop keyboard vocabulary, e.g. `CTRL`, `RETURN`). Device tokens are the
//! `adafruit_hid.keycode` names the pedal firmware understands (e.g.
//! `CONTROL`, `ENTER`).
//!
//! `DEVICE_TO_DISPLAY` is built by inverting the forward table in declaration
//! order (later entries win) and then applying [`DISPLAY_ALIASES`], which pick
//! the preferred display spelling where several display names lead to the same
//! device token:
//!
//! | device token  | display |
//! |---------------|---------|
//! | `CONTROL`     | `CTRL`  |
//! | `GUI`         | `META`  |
//! | `ENTER`       | `RETURN`|
//! | `ESCAPE`      | `ESC`   |
//! | `UP_ARROW`    | `UP`    |
//! | `DOWN_ARROW`  | `DOWN`  |
//! | `LEFT_ARROW`  | `LEFT`  |
//! | `RIGHT_ARROW` | `RIGHT` |
//! | `PAGE_UP`     | `PAGEUP`|
//! | `PAGE_DOWN`   | `PAGEDOWN`|
//! | `DELETE`      | `DEL`   |
//!
//! Round trips therefore hold for the canonical spellings only: `CTRL` maps to
//! `CONTROL` and back to `CTRL`, while the display alias `CONTROL` comes back
//! as `CTRL`.

use once_cell::sync::Lazy;
use std::collections::HashMap;

const MODIFIERS: &[(&str, &str)] = &[
    ("CTRL", "CONTROL"),
    ("CONTROL", "CONTROL"),
    ("SHIFT", "SHIFT"),
    ("ALT", "ALT"),
    // Windows / Command key
    ("META", "GUI"),
];

const DIGITS: &[(&str, &str)] = &[
    ("0", "ZERO"),
    ("1", "ONE"),
    ("2", "TWO"),
    ("3", "THREE"),
    ("4", "FOUR"),
    ("5", "FIVE"),
    ("6", "SIX"),
    ("7", "SEVEN"),
    ("8", "EIGHT"),
    ("9", "NINE"),
];

const COMMON: &[(&str, &str)] = &[
    ("RETURN", "ENTER"),
    ("ENTER", "ENTER"),
    ("ESC", "ESCAPE"),
    ("ESCAPE", "ESCAPE"),
    ("TAB", "TAB"),
    ("SPACE", "SPACE"),
    ("BACKSPACE", "BACKSPACE"),
    ("DEL", "DELETE"),
    ("DELETE", "DELETE"),
    ("INS", "INSERT"),
    ("INSERT", "INSERT"),
];

const ARROWS: &[(&str, &str)] = &[
    ("UP", "UP_ARROW"),
    ("DOWN", "DOWN_ARROW"),
    ("LEFT", "LEFT_ARROW"),
    ("RIGHT", "RIGHT_ARROW"),
];

const NAVIGATION: &[(&str, &str)] = &[
    ("PAGEUP", "PAGE_UP"),
    ("PAGEDOWN", "PAGE_DOWN"),
    ("HOME", "HOME"),
    ("END", "END"),
];

const PUNCTUATION: &[(&str, &str)] = &[
    ("-", "MINUS"),
    ("=", "EQUALS"),
    ("[", "LEFT_BRACKET"),
    ("]", "RIGHT_BRACKET"),
    ("\\", "BACKSLASH"),
    (";", "SEMICOLON"),
    ("'", "QUOTE"),
    ("`", "GRAVE_ACCENT"),
    (",", "COMMA"),
    (".", "PERIOD"),
    ("/", "FORWARD_SLASH"),
];

const KEYPAD: &[(&str, &str)] = &[
    ("NUMLOCK", "KEYPAD_NUMLOCK"),
    ("NUMPAD0", "KEYPAD_ZERO"),
    ("NUMPAD1", "KEYPAD_ONE"),
    ("NUMPAD2", "KEYPAD_TWO"),
    ("NUMPAD3", "KEYPAD_THREE"),
    ("NUMPAD4", "KEYPAD_FOUR"),
    ("NUMPAD5", "KEYPAD_FIVE"),
    ("NUMPAD6", "KEYPAD_SIX"),
    ("NUMPAD7", "KEYPAD_SEVEN"),
    ("NUMPAD8", "KEYPAD_EIGHT"),
    ("NUMPAD9", "KEYPAD_NINE"),
    ("NUMPAD.", "KEYPAD_PERIOD"),
    ("NUMPAD/", "KEYPAD_FORWARD_SLASH"),
    ("NUMPAD*", "KEYPAD_ASTERISK"),
    ("NUMPAD-", "KEYPAD_MINUS"),
    ("NUMPAD+", "KEYPAD_PLUS"),
    ("NUMPADENTER", "KEYPAD_ENTER"),
];

/// Preferred display spelling for device tokens reachable from several names
pub const DISPLAY_ALIASES: &[(&str, &str)] = &[
    ("CONTROL", "CTRL"),
    ("GUI", "META"),
    ("ENTER", "RETURN"),
    ("ESCAPE", "ESC"),
    ("UP_ARROW", "UP"),
    ("DOWN_ARROW", "DOWN"),
    ("LEFT_ARROW", "LEFT"),
    ("RIGHT_ARROW", "RIGHT"),
    ("PAGE_UP", "PAGEUP"),
    ("PAGE_DOWN", "PAGEDOWN"),
    ("DELETE", "DEL"),
];

/// Display -> device pairs in declaration order
fn forward_pairs() -> Vec<(String, String)> {
    fn owned(table: &[(&str, &str)]) -> Vec<(String, String)> {
        table
            .iter()
            .map(|(display, device)| (display.to_string(), device.to_string()))
            .collect()
    }

    let mut pairs = owned(MODIFIERS);
    pairs.extend((b'A'..=b'Z').map(|c| {
        let letter = (c as char).to_string();
        (letter.clone(), letter)
    }));
    pairs.extend(owned(DIGITS));
    pairs.extend(owned(COMMON));
    pairs.extend(owned(ARROWS));
    pairs.extend(owned(NAVIGATION));
    pairs.extend((1..=24).map(|n| (format!("F{}", n), format!("F{}", n))));
    pairs.extend(owned(PUNCTUATION));
    pairs.extend(owned(KEYPAD));
    pairs
}

/// Display token -> device token
pub static DISPLAY_TO_DEVICE: Lazy<HashMap<String, String>> =
    Lazy::new(|| forward_pairs().into_iter().collect());

/// Device token -> display token (inverse of the forward table plus aliases)
pub static DEVICE_TO_DISPLAY: Lazy<HashMap<String, String>> = Lazy::new(|| {
    let mut table = HashMap::new();
    for (display, device) in forward_pairs() {
        table.insert(device, display);
    }
    for (device, display) in DISPLAY_ALIASES {
        table.insert(device.to_string(), display.to_string());
    }
    table
});
