//! Log-backed display sink
//!
//! The tray app has no editor window; the active configuration and every
//! notice go to the log, and the tray reads the status line for its tooltip.

use crate::core::error::Severity;
use crate::dispatch::{DisplaySink, Notice};
use crate::pedal::PedalConfig;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Notices kept for inspection
const NOTICE_HISTORY: usize = 64;

#[derive(Debug, Default)]
struct DisplayState {
    config: PedalConfig,
    active_preset: Option<String>,
    notices: VecDeque<Notice>,
    /// Set when the status line changed since the last `take_status`
    dirty: bool,
}

/// Display sink writing to `tracing`; clones share the same state
#[derive(Debug, Clone, Default)]
pub struct LogDisplay {
    inner: Arc<Mutex<DisplayState>>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_preset(&self) -> Option<String> {
        self.inner.lock().active_preset.clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.inner.lock().notices.iter().cloned().collect()
    }

    pub fn last_notice(&self) -> Option<Notice> {
        self.inner.lock().notices.back().cloned()
    }

    /// One-line summary for the tray tooltip
    pub fn status_line(&self) -> String {
        let state = self.inner.lock();
        let preset = match &state.active_preset {
            Some(name) => format!("preset '{}'", name),
            None => "no preset".to_string(),
        };
        format!("Pedal Deck - {} pin(s), {}", state.config.len(), preset)
    }

    /// Status line, if it changed since the previous call
    pub fn take_status(&self) -> Option<String> {
        let changed = std::mem::take(&mut self.inner.lock().dirty);
        changed.then(|| self.status_line())
    }
}

impl DisplaySink for LogDisplay {
    fn render(&mut self, config: &PedalConfig) {
        info!("Active configuration, {} pin(s):", config.len());
        for binding in config.iter() {
            info!(
                "  {} [{}] {}",
                binding.pin,
                binding.action_kind.code(),
                binding.display_value()
            );
        }
        let mut state = self.inner.lock();
        state.config = config.clone();
        state.dirty = true;
    }

    fn current(&self) -> PedalConfig {
        self.inner.lock().config.clone()
    }

    fn notify(&mut self, notice: Notice) {
        match notice.level {
            Severity::Info => info!("{}", notice.message),
            Severity::Warning => warn!("{}", notice.message),
            Severity::Error => error!("{}", notice.message),
        }
        let mut state = self.inner.lock();
        if state.notices.len() == NOTICE_HISTORY {
            state.notices.pop_front();
        }
        state.notices.push_back(notice);
    }

    fn show_active_preset(&mut self, preset: Option<&str>) {
        let mut state = self.inner.lock();
        state.active_preset = preset.map(str::to_string);
        state.dirty = true;
    }
}
