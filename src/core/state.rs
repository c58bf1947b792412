//! Application state management

use crate::pedal::{PedalConfig, PresetId};
use chrono::{DateTime, Local};

/// In-memory state owned by the event-loop thread
#[derive(Debug, Clone, Default)]
pub struct ActiveState {
    /// Configuration currently shown and (ideally) on the device
    pub config: PedalConfig,
    /// Preset the configuration came from, if any
    pub active_preset: Option<PresetId>,
    /// When the last preset was applied
    pub applied_at: Option<DateTime<Local>>,
}

impl ActiveState {
    pub fn new(config: PedalConfig) -> Self {
        Self {
            config,
            active_preset: None,
            applied_at: None,
        }
    }

    /// Record a freshly applied preset
    pub fn mark_applied(&mut self, preset: &str) {
        self.active_preset = Some(preset.to_string());
        self.applied_at = Some(Local::now());
    }

    /// Forget the active preset (the config was edited or reloaded)
    pub fn clear_preset(&mut self) {
        self.active_preset = None;
    }

    /// Status bar text
    pub fn status_line(&self) -> String {
        match (&self.active_preset, &self.applied_at) {
            (Some(name), Some(at)) => format!("Active preset: {} (since {})", name, at.format("%H:%M:%S")),
            (Some(name), None) => format!("Active preset: {}", name),
            (None, _) => "No active preset".to_string(),
        }
    }
}
