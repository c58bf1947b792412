//! Parsing of hotkey trigger strings into OS hotkeys
//!
//! Triggers are stored lower-cased in display vocabulary (`ctrl+alt+1`).
//! Each part is canonicalized through the keymap first, so device spellings
//! (`control`, `enter`, `minus`) resolve to the same hotkey as their display
//! forms.

use crate::core::error::{PedalError, Result};
use crate::keymap;
use global_hotkey::hotkey::{Code, HotKey, Modifiers};

/// Canonical stored form of a trigger: trimmed, lower-case, no spaces around `+`
pub fn normalize_trigger(trigger: &str) -> String {
    let trimmed = trigger.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    trimmed
        .split('+')
        .map(|part| part.trim().to_lowercase())
        .collect::<Vec<_>>()
        .join("+")
}

/// Parse a trigger such as `ctrl+shift+f5` into a registrable hotkey
pub fn parse_hotkey(trigger: &str) -> Result<HotKey> {
    let mut modifiers = Modifiers::empty();
    let mut code = None;

    for part in keymap::split_combo(trigger)? {
        let canonical = keymap::display_token(&keymap::device_token(&part));

        if let Some(modifier) = parse_modifier(&canonical) {
            modifiers |= modifier;
            continue;
        }

        let key = parse_code(&canonical).ok_or_else(|| {
            PedalError::invalid(format!("unknown key '{}' in hotkey '{}'", part, trigger.trim()))
        })?;
        if code.replace(key).is_some() {
            return Err(PedalError::invalid(format!(
                "hotkey '{}' has more than one non-modifier key",
                trigger.trim()
            )));
        }
    }

    let code = code.ok_or_else(|| {
        PedalError::invalid(format!("hotkey '{}' has no key besides modifiers", trigger.trim()))
    })?;
    Ok(HotKey::new(Some(modifiers), code))
}

fn parse_modifier(name: &str) -> Option<Modifiers> {
    match name {
        "CTRL" => Some(Modifiers::CONTROL),
        "SHIFT" => Some(Modifiers::SHIFT),
        "ALT" | "OPTION" => Some(Modifiers::ALT),
        "META" | "WIN" | "WINDOWS" | "SUPER" | "CMD" | "COMMAND" => Some(Modifiers::META),
        _ => None,
    }
}

fn parse_code(name: &str) -> Option<Code> {
    let code = match name {
        "A" => Code::KeyA,
        "B" => Code::KeyB,
        "C" => Code::KeyC,
        "D" => Code::KeyD,
        "E" => Code::KeyE,
        "F" => Code::KeyF,
        "G" => Code::KeyG,
        "H" => Code::KeyH,
        "I" => Code::KeyI,
        "J" => Code::KeyJ,
        "K" => Code::KeyK,
        "L" => Code::KeyL,
        "M" => Code::KeyM,
        "N" => Code::KeyN,
        "O" => Code::KeyO,
        "P" => Code::KeyP,
        "Q" => Code::KeyQ,
        "R" => Code::KeyR,
        "S" => Code::KeyS,
        "T" => Code::KeyT,
        "U" => Code::KeyU,
        "V" => Code::KeyV,
        "W" => Code::KeyW,
        "X" => Code::KeyX,
        "Y" => Code::KeyY,
        "Z" => Code::KeyZ,
        "0" => Code::Digit0,
        "1" => Code::Digit1,
        "2" => Code::Digit2,
        "3" => Code::Digit3,
        "4" => Code::Digit4,
        "5" => Code::Digit5,
        "6" => Code::Digit6,
        "7" => Code::Digit7,
        "8" => Code::Digit8,
        "9" => Code::Digit9,
        "F1" => Code::F1,
        "F2" => Code::F2,
        "F3" => Code::F3,
        "F4" => Code::F4,
        "F5" => Code::F5,
        "F6" => Code::F6,
        "F7" => Code::F7,
        "F8" => Code::F8,
        "F9" => Code::F9,
        "F10" => Code::F10,
        "F11" => Code::F11,
        "F12" => Code::F12,
        "F13" => Code::F13,
        "F14" => Code::F14,
        "F15" => Code::F15,
        "F16" => Code::F16,
        "F17" => Code::F17,
        "F18" => Code::F18,
        "F19" => Code::F19,
        "F20" => Code::F20,
        "F21" => Code::F21,
        "F22" => Code::F22,
        "F23" => Code::F23,
        "F24" => Code::F24,
        "RETURN" => Code::Enter,
        "ESC" => Code::Escape,
        "TAB" => Code::Tab,
        "SPACE" => Code::Space,
        "BACKSPACE" => Code::Backspace,
        "DEL" => Code::Delete,
        "INSERT" => Code::Insert,
        "UP" => Code::ArrowUp,
        "DOWN" => Code::ArrowDown,
        "LEFT" => Code::ArrowLeft,
        "RIGHT" => Code::ArrowRight,
        "PAGEUP" => Code::PageUp,
        "PAGEDOWN" => Code::PageDown,
        "HOME" => Code::Home,
        "END" => Code::End,
        "-" => Code::Minus,
        "=" | "EQUAL" => Code::Equal,
        "[" => Code::BracketLeft,
        "]" => Code::BracketRight,
        "\\" => Code::Backslash,
        ";" => Code::Semicolon,
        "'" => Code::Quote,
        "`" => Code::Backquote,
        "," => Code::Comma,
        "." => Code::Period,
        "/" => Code::Slash,
        "CAPSLOCK" => Code::CapsLock,
        "PRINTSCREEN" | "PRINT" => Code::PrintScreen,
        "SCROLLLOCK" => Code::ScrollLock,
        "PAUSE" => Code::Pause,
        "NUMLOCK" => Code::NumLock,
        "NUMPAD0" => Code::Numpad0,
        "NUMPAD1" => Code::Numpad1,
        "NUMPAD2" => Code::Numpad2,
        "NUMPAD3" => Code::Numpad3,
        "NUMPAD4" => Code::Numpad4,
        "NUMPAD5" => Code::Numpad5,
        "NUMPAD6" => Code::Numpad6,
        "NUMPAD7" => Code::Numpad7,
        "NUMPAD8" => Code::Numpad8,
        "NUMPAD9" => Code::Numpad9,
        "NUMPAD." => Code::NumpadDecimal,
        "NUMPAD/" => Code::NumpadDivide,
        "NUMPAD*" => Code::NumpadMultiply,
        "NUMPAD-" => Code::NumpadSubtract,
        "NUMPADENTER" => Code::NumpadEnter,
        _ => return None,
    };
    Some(code)
}
