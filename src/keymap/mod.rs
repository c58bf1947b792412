//! Keymap module - translation between operator key names and firmware keycodes

pub mod keycodes;
mod translate;

pub use translate::{
    combo_to_device, device_token, display_token, split_combo, to_device, to_display, KeyValue,
};
