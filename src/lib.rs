//! Pedal Deck
//!
//! Companion app for a CircuitPython USB foot pedal.
//!
//! # Features
//! - Translates operator key names (`CTRL+RETURN`) to firmware keycodes and back
//! - Edits the per-pin action table and keeps it in `config.json`
//! - Pushes and pulls the table through the pedal's removable drive
//! - Saves named presets and switches them with global hotkeys
//! - Shows the pedal's serial log
//! - Runs as a system tray application

pub mod core;
pub mod device;
pub mod dispatch;
pub mod display;
pub mod hotkey;
pub mod keymap;
pub mod pedal;
pub mod tray;

pub use core::config::AppConfig;
pub use core::error::{PedalError, Result, Severity};
pub use core::events::{AppEvent, EventSender, PresetSource};
pub use core::state::ActiveState;
pub use dispatch::{DisplaySink, Notice, PresetDispatchCoordinator};
pub use pedal::{ActionKind, PedalConfig, PinBinding};
