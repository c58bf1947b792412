//! Preset dispatch coordinator
//!
//! Runs on the owning thread. Every preset request, whether it came from a
//! hotkey or from the tray, goes through [`PresetDispatchCoordinator::apply`]:
//!
//! 1. resolve the preset (failure leaves everything unchanged)
//! 2. make it the active configuration and render it
//! 3. persist it locally (failure is reported, the apply continues)
//! 4. push it to the device (failure is a warning, nothing is rolled back)
//! 5. update the active preset indicator
//!
//! Local state is authoritative; the device is synced best-effort.

use super::{DisplaySink, Notice};
use crate::core::error::{PedalError, Result};
use crate::core::events::PresetSource;
use crate::core::state::ActiveState;
use crate::device::DeviceTransport;
use crate::pedal::storage::validate_preset_name;
use crate::pedal::{ConfigStore, PedalConfig, PresetId, PresetStore};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Step of the apply pipeline that can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStep {
    Resolve,
    Persist,
    Push,
}

#[derive(Debug)]
pub struct StepFailure {
    pub step: ApplyStep,
    pub error: PedalError,
}

/// Outcome of one `apply`
#[derive(Debug)]
pub struct ApplyReport {
    pub preset: PresetId,
    pub source: PresetSource,
    /// Where the device copy was written, when the push succeeded
    pub device_path: Option<PathBuf>,
    pub failures: Vec<StepFailure>,
}

impl ApplyReport {
    fn new(preset: &str, source: PresetSource) -> Self {
        Self {
            preset: preset.to_string(),
            source,
            device_path: None,
            failures: Vec::new(),
        }
    }

    fn failed(&self, step: ApplyStep) -> bool {
        self.failures.iter().any(|failure| failure.step == step)
    }

    /// The preset became the active configuration
    pub fn applied(&self) -> bool {
        !self.failed(ApplyStep::Resolve)
    }

    pub fn persisted(&self) -> bool {
        self.applied() && !self.failed(ApplyStep::Persist)
    }

    pub fn pushed(&self) -> bool {
        self.device_path.is_some()
    }
}

/// Owner-side component applying presets and syncing configurations
pub struct PresetDispatchCoordinator {
    presets: Box<dyn PresetStore>,
    local: Box<dyn ConfigStore>,
    device: Box<dyn DeviceTransport>,
    display: Box<dyn DisplaySink>,
    state: ActiveState,
}

impl PresetDispatchCoordinator {
    pub fn new(
        presets: Box<dyn PresetStore>,
        local: Box<dyn ConfigStore>,
        device: Box<dyn DeviceTransport>,
        display: Box<dyn DisplaySink>,
    ) -> Self {
        Self {
            presets,
            local,
            device,
            display,
            state: ActiveState::default(),
        }
    }

    pub fn state(&self) -> &ActiveState {
        &self.state
    }

    /// Apply a preset through the canonical pipeline
    pub fn apply(&mut self, preset: &str, source: PresetSource) -> ApplyReport {
        let mut report = ApplyReport::new(preset, source);
        info!("Applying preset '{}' ({:?})", preset, report.source);

        // 1. Resolve
        let config = match self.presets.load(preset) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load preset '{}': {}", preset, e);
                self.display
                    .notify(Notice::failure(&format!("Could not apply preset '{}'", preset), &e));
                report.failures.push(StepFailure {
                    step: ApplyStep::Resolve,
                    error: e,
                });
                return report;
            }
        };

        // 2. Activate
        self.state.config = config;
        self.display.render(&self.state.config);

        // 3. Persist
        if let Err(e) = self.local.save(&self.state.config) {
            error!("Failed to save active configuration: {}", e);
            self.display
                .notify(Notice::error(format!("Could not save configuration: {}", e.user_message())));
            report.failures.push(StepFailure {
                step: ApplyStep::Persist,
                error: e,
            });
        }

        // 4. Push
        match self.device.push(&self.state.config) {
            Ok(path) => report.device_path = Some(path),
            Err(e) => {
                warn!("Device not updated with preset '{}': {}", preset, e);
                self.display.notify(Notice::warning(format!(
                    "Preset '{}' applied locally; device not updated: {}",
                    preset,
                    e.user_message()
                )));
                report.failures.push(StepFailure {
                    step: ApplyStep::Push,
                    error: e,
                });
            }
        }

        // 5. Indicator
        self.state.mark_applied(preset);
        self.display.show_active_preset(Some(preset));
        let via = match &report.source {
            PresetSource::Hotkey { trigger } => format!(" via {}", trigger),
            PresetSource::Ui => String::new(),
        };
        self.display
            .notify(Notice::info(format!("Preset '{}' applied{}", preset, via)));

        report
    }

    /// Load the local active configuration and show it
    pub fn load_local(&mut self) -> Result<()> {
        match self.local.load() {
            Ok(config) => {
                info!("Loaded local configuration with {} pin(s)", config.len());
                self.state = ActiveState::new(config);
                self.display.render(&self.state.config);
                self.display.show_active_preset(None);
                Ok(())
            }
            Err(e) => {
                error!("Failed to load local configuration: {}", e);
                self.display
                    .notify(Notice::failure("Could not load configuration", &e));
                Err(e)
            }
        }
    }

    /// Persist what the display shows and push it to the device.
    ///
    /// Returns the device path, or `None` when only the local save happened.
    pub fn save_active(&mut self) -> Result<Option<PathBuf>> {
        let config = self.display.current();
        if let Err(e) = self.local.save(&config) {
            error!("Failed to save configuration: {}", e);
            self.display
                .notify(Notice::failure("Could not save configuration", &e));
            return Err(e);
        }

        if config != self.state.config {
            self.state.clear_preset();
            self.display.show_active_preset(None);
        }
        self.state.config = config;

        match self.device.push(&self.state.config) {
            Ok(path) => {
                self.display.notify(Notice::info(format!(
                    "Configuration saved and sent to {}",
                    path.display()
                )));
                Ok(Some(path))
            }
            Err(e) => {
                warn!("Saved locally, device push failed: {}", e);
                self.display.notify(Notice::warning(format!(
                    "Configuration saved locally; device not updated: {}",
                    e.user_message()
                )));
                Ok(None)
            }
        }
    }

    /// Push the persisted local configuration to the device
    pub fn upload(&mut self) -> Result<PathBuf> {
        let result = self
            .local
            .load()
            .and_then(|config| self.device.push(&config));
        match result {
            Ok(path) => {
                self.display
                    .notify(Notice::info(format!("Configuration sent to {}", path.display())));
                Ok(path)
            }
            Err(e) => {
                error!("Upload failed: {}", e);
                self.display.notify(Notice::failure("Upload failed", &e));
                Err(e)
            }
        }
    }

    /// Replace the local configuration with the one on the device
    pub fn download(&mut self) -> Result<()> {
        let config = match self.device.pull() {
            Ok(config) => config,
            Err(e) => {
                error!("Download failed: {}", e);
                self.display.notify(Notice::failure("Download failed", &e));
                return Err(e);
            }
        };

        self.state = ActiveState::new(config);
        self.display.render(&self.state.config);
        self.display.show_active_preset(None);

        if let Err(e) = self.local.save(&self.state.config) {
            error!("Failed to save downloaded configuration: {}", e);
            self.display.notify(Notice::failure(
                "Configuration downloaded but not saved",
                &e,
            ));
            return Err(e);
        }

        self.display
            .notify(Notice::info("Configuration downloaded from device"));
        Ok(())
    }

    /// Store the configuration on display as a named preset
    pub fn save_preset_as(&mut self, name: &str) -> Result<PresetId> {
        let result = validate_preset_name(name).and_then(|name| {
            self.presets.save(name, &self.display.current())?;
            Ok(name.to_string())
        });
        match result {
            Ok(name) => {
                self.display
                    .notify(Notice::info(format!("Preset '{}' saved", name)));
                Ok(name)
            }
            Err(e) => {
                self.display
                    .notify(Notice::failure("Could not save preset", &e));
                Err(e)
            }
        }
    }

    pub fn delete_preset(&mut self, name: &str) -> Result<()> {
        if let Err(e) = self.presets.delete(name) {
            self.display
                .notify(Notice::failure("Could not delete preset", &e));
            return Err(e);
        }

        if self.state.active_preset.as_deref() == Some(name.trim()) {
            self.state.clear_preset();
            self.display.show_active_preset(None);
        }
        self.display
            .notify(Notice::info(format!("Preset '{}' deleted", name.trim())));
        Ok(())
    }

    pub fn list_presets(&self) -> Result<Vec<PresetId>> {
        self.presets.list()
    }
}
