//! Bidirectional translation between display and device key vocabularies
//!
//! Both directions are pure lookups against the static tables in
//! [`super::keycodes`]; tokens outside the vocabulary pass through upper-cased
//! so arbitrary single characters keep working. Only malformed shapes (empty
//! input, empty `+` segments, empty chords) are rejected.

use super::keycodes::{DEVICE_TO_DISPLAY, DISPLAY_TO_DEVICE};
use crate::core::error::{PedalError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One key token or an ordered chord of tokens (press order)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyValue {
    Single(String),
    Chord(Vec<String>),
}

impl KeyValue {
    /// Tokens in press order
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            KeyValue::Single(token) => vec![token.as_str()],
            KeyValue::Chord(tokens) => tokens.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens().join("+"))
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        KeyValue::Single(value.to_string())
    }
}

impl From<Vec<String>> for KeyValue {
    fn from(value: Vec<String>) -> Self {
        KeyValue::Chord(value)
    }
}

fn normalize(token: &str) -> Result<String> {
    let token = token.trim();
    if token.is_empty() {
        return Err(PedalError::invalid("empty key name"));
    }
    Ok(token.to_uppercase())
}

/// Split a `+`-joined combo string into upper-cased parts.
///
/// `+` is also a key name of its own: a `+` standing alone between
/// separators (or at either end) is the plus key, and a trailing `+` stays
/// on the token before it when that spells a known key such as `NUMPAD+`.
pub fn split_combo(combo: &str) -> Result<Vec<String>> {
    let combo = combo.trim();
    if combo.is_empty() {
        return Err(PedalError::invalid("empty key combination"));
    }
    let malformed = || PedalError::invalid(format!("malformed key combination '{}'", combo));

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = combo.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '+' {
            current.push(c);
            continue;
        }
        let ends_token = matches!(chars.peek(), None | Some('+'));
        if current.trim().is_empty() {
            if !ends_token {
                return Err(malformed());
            }
            current.push('+');
        } else if ends_token && is_plus_suffixed_key(&current) {
            current.push('+');
        } else {
            parts.push(normalize(&current).map_err(|_| malformed())?);
            current.clear();
        }
    }
    parts.push(normalize(&current).map_err(|_| malformed())?);
    Ok(parts)
}

fn is_plus_suffixed_key(token: &str) -> bool {
    DISPLAY_TO_DEVICE.contains_key(&format!("{}+", token.trim().to_uppercase()))
}

/// Look up one display token; unknown tokens pass through upper-cased
pub fn device_token(token: &str) -> String {
    let token = token.trim().to_uppercase();
    DISPLAY_TO_DEVICE.get(&token).cloned().unwrap_or(token)
}

/// Look up one device token; unknown tokens pass through upper-cased
pub fn display_token(token: &str) -> String {
    let token = token.trim().to_uppercase();
    DEVICE_TO_DISPLAY.get(&token).cloned().unwrap_or(token)
}

/// Translate a `+`-joined display combo into device tokens.
///
/// A single resulting token comes back unwrapped; two or more come back as a
/// chord in input order.
pub fn combo_to_device(combo: &str) -> Result<KeyValue> {
    let mut tokens: Vec<String> = split_combo(combo)?
        .iter()
        .map(|part| device_token(part))
        .collect();
    if tokens.len() == 1 {
        Ok(KeyValue::Single(tokens.remove(0)))
    } else {
        Ok(KeyValue::Chord(tokens))
    }
}

/// Display vocabulary -> device vocabulary.
///
/// A single string is treated as a combo string and split on `+`; a chord is
/// translated element-wise and stays a chord.
pub fn to_device(input: &KeyValue) -> Result<KeyValue> {
    match input {
        KeyValue::Single(combo) => combo_to_device(combo),
        KeyValue::Chord(tokens) => translate_chord(tokens, device_token),
    }
}

/// Device vocabulary -> display vocabulary.
///
/// A single string is looked up as one token (device tokens never contain
/// `+`); a chord is translated element-wise.
pub fn to_display(input: &KeyValue) -> Result<KeyValue> {
    match input {
        KeyValue::Single(token) => Ok(KeyValue::Single(display_token(&normalize(token)?))),
        KeyValue::Chord(tokens) => translate_chord(tokens, display_token),
    }
}

fn translate_chord(tokens: &[String], lookup: fn(&str) -> String) -> Result<KeyValue> {
    if tokens.is_empty() {
        return Err(PedalError::invalid("empty key combination"));
    }
    tokens
        .iter()
        .map(|token| normalize(token).map(|token| lookup(&token)))
        .collect::<Result<Vec<_>>>()
        .map(KeyValue::Chord)
}
