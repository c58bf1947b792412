//! Hotkey module - global shortcuts that switch presets

pub mod combo;
pub mod listener;
pub mod registry;

pub use combo::{normalize_trigger, parse_hotkey};
pub use listener::{GlobalHotkeyListener, HotkeyBackend, ListenerState, OsHotkeyBackend};
pub use registry::{validate_bindings, HotkeyMap, HotkeyRegistry};
