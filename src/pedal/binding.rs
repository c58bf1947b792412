//! Pin action table
//!
//! On disk every binding is a three element record `[pin, kind, value]`, the
//! format the pedal firmware reads from `config.json`:
//!
//! ```json
//! [
//!     ["GP0", "key", "C"],
//!     ["GP1", "cmb", ["WINDOWS", "TAB"]]
//! ]
//! ```

use crate::core::error::{PedalError, Result};
use crate::keymap::{self, KeyValue};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Maximum number of pins the editor hands out (`GP0`..`GP25`)
pub const MAX_PINS: usize = 26;

/// Opaque pin identifier, e.g. a GPIO label
pub type PinId = String;

/// Action value: one device token or an ordered chord
pub type ActionValue = KeyValue;

/// What a pin does when pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Press a single key
    #[serde(rename = "key")]
    SingleKey,
    /// Press a chord, modifiers first
    #[serde(rename = "cmb")]
    Combo,
    /// Consumer control code (media keys, volume); never key-translated
    #[serde(rename = "ccc")]
    ContinuousControl,
}

impl ActionKind {
    /// Short code used in persisted documents
    pub fn code(&self) -> &'static str {
        match self {
            ActionKind::SingleKey => "key",
            ActionKind::Combo => "cmb",
            ActionKind::ContinuousControl => "ccc",
        }
    }
}

/// One row of the pin table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinBinding {
    pub pin: PinId,
    pub action_kind: ActionKind,
    pub value: ActionValue,
}

impl PinBinding {
    pub fn new(pin: impl Into<PinId>, action_kind: ActionKind, value: ActionValue) -> Self {
        Self {
            pin: pin.into(),
            action_kind,
            value,
        }
    }

    /// Build a binding from what the operator typed in the editor.
    ///
    /// `text` is in display vocabulary (`CTRL+RETURN`); the stored value is in
    /// device vocabulary (`["CONTROL", "ENTER"]`).
    pub fn from_display(pin: impl Into<PinId>, action_kind: ActionKind, text: &str) -> Result<Self> {
        let value = match action_kind {
            ActionKind::SingleKey => match keymap::combo_to_device(text)? {
                KeyValue::Chord(_) => {
                    return Err(PedalError::invalid(format!(
                        "'{}' is a combination; use a cmb action for it",
                        text.trim()
                    )))
                }
                single => single,
            },
            ActionKind::Combo => KeyValue::Chord(
                keymap::split_combo(text)?
                    .iter()
                    .map(|part| keymap::device_token(part))
                    .collect(),
            ),
            ActionKind::ContinuousControl => {
                let code = text.trim();
                if code.is_empty() {
                    return Err(PedalError::invalid("empty consumer control code"));
                }
                KeyValue::Single(code.to_uppercase())
            }
        };
        Ok(Self::new(pin, action_kind, value))
    }

    /// Value rendered for the editor, `+`-joined in display vocabulary
    pub fn display_value(&self) -> String {
        match self.action_kind {
            ActionKind::ContinuousControl => self.value.to_string(),
            ActionKind::SingleKey | ActionKind::Combo => keymap::to_display(&self.value)
                .unwrap_or_else(|_| self.value.clone())
                .to_string(),
        }
    }
}

impl Serialize for PinBinding {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (&self.pin, self.action_kind, &self.value).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PinBinding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let (pin, action_kind, value) = <(PinId, ActionKind, ActionValue)>::deserialize(deserializer)?;
        Ok(Self {
            pin,
            action_kind,
            value,
        })
    }
}

/// Ordered pin table. Order is display order only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PedalConfig {
    pub bindings: Vec<PinBinding>,
}

impl Default for PedalConfig {
    fn default() -> Self {
        Self {
            bindings: vec![
                PinBinding::new("GP0", ActionKind::SingleKey, KeyValue::Single("C".into())),
                PinBinding::new(
                    "GP1",
                    ActionKind::Combo,
                    KeyValue::Chord(vec!["WINDOWS".into(), "TAB".into()]),
                ),
            ],
        }
    }
}

impl PedalConfig {
    pub fn new(bindings: Vec<PinBinding>) -> Self {
        Self { bindings }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PinBinding> {
        self.bindings.iter()
    }

    /// First binding for a pin
    pub fn get(&self, pin: &str) -> Option<&PinBinding> {
        self.bindings.iter().find(|b| b.pin == pin)
    }

    /// Replace the first binding for the same pin, or append
    pub fn set(&mut self, binding: PinBinding) {
        match self.bindings.iter_mut().find(|b| b.pin == binding.pin) {
            Some(existing) => *existing = binding,
            None => self.bindings.push(binding),
        }
    }

    /// Append the lowest unused `GP<n>` pin bound to key `A`
    pub fn add_pin(&mut self) -> Result<&PinBinding> {
        if self.bindings.len() >= MAX_PINS {
            return Err(PedalError::invalid(format!(
                "The maximum number of pins is {}.",
                MAX_PINS
            )));
        }
        let pin = (0..MAX_PINS)
            .map(|n| format!("GP{}", n))
            .find(|name| self.get(name).is_none())
            .ok_or_else(|| PedalError::invalid("no free GP pin left"))?;
        self.bindings.push(PinBinding::new(
            pin,
            ActionKind::SingleKey,
            KeyValue::Single("A".into()),
        ));
        let index = self.bindings.len() - 1;
        Ok(&self.bindings[index])
    }

    /// Remove every binding for `pin`; true when something was removed
    pub fn remove_pin(&mut self, pin: &str) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|b| b.pin != pin);
        self.bindings.len() != before
    }
}
