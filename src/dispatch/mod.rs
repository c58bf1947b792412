//! Dispatch module - the preset apply pipeline and its collaborators

mod coordinator;
mod hotkeys;

pub use coordinator::{ApplyReport, ApplyStep, PresetDispatchCoordinator, StepFailure};
pub use hotkeys::update_hotkeys;

use crate::core::error::{PedalError, Severity};
use crate::pedal::PedalConfig;

/// Message for the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Severity,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Severity::Error,
            message: message.into(),
        }
    }

    /// Notice for a failed operation, prefixed with what was being done
    pub fn failure(context: &str, error: &PedalError) -> Self {
        Self {
            level: error.severity(),
            message: format!("{}: {}", context, error.user_message()),
        }
    }
}

/// Surface that shows the active configuration and operator messages
pub trait DisplaySink {
    /// Show `config` as the configuration being edited
    fn render(&mut self, config: &PedalConfig);
    /// Configuration as currently shown, including unsaved edits
    fn current(&self) -> PedalConfig;
    fn notify(&mut self, notice: Notice);
    /// Update the active preset indicator
    fn show_active_preset(&mut self, preset: Option<&str>);
}
