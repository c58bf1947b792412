//! Pedal module - pin action table and its local persistence

pub mod binding;
pub mod storage;

pub use binding::{ActionKind, ActionValue, PedalConfig, PinBinding, PinId, MAX_PINS};
pub use storage::{ConfigStore, LocalConfigFile, PresetDirectory, PresetId, PresetStore};
