//! Application event definitions

use crate::pedal::PresetId;
use crate::tray::TrayAction;
use tokio::sync::mpsc;
use winit::event_loop::EventLoopProxy;

/// Wrapper around `mpsc::UnboundedSender<AppEvent>` that also wakes the winit
/// event loop via the proxy after every send, so the loop can sleep in
/// `ControlFlow::Wait`/`WaitUntil` without missing hotkey or tray events.
///
/// Sending never blocks, which keeps it usable from OS hook threads.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<AppEvent>,
    proxy: Option<EventLoopProxy<()>>,
}

impl EventSender {
    pub fn new(tx: mpsc::UnboundedSender<AppEvent>, proxy: EventLoopProxy<()>) -> Self {
        Self {
            tx,
            proxy: Some(proxy),
        }
    }

    /// Sender with no event loop to wake (tests, headless use)
    pub fn detached(tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { tx, proxy: None }
    }

    pub fn send(&self, event: AppEvent) -> Result<(), mpsc::error::SendError<AppEvent>> {
        let result = self.tx.send(event);
        if let Some(proxy) = &self.proxy {
            let _ = proxy.send_event(());
        }
        result
    }
}

/// Where a preset request came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetSource {
    /// Global hotkey fired; carries the normalized trigger
    Hotkey { trigger: String },
    /// Direct operator action (tray menu, editor)
    Ui,
}

/// Application-wide events delivered to the owning thread
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Apply a preset through the dispatch pipeline
    PresetRequested {
        preset: PresetId,
        source: PresetSource,
    },

    /// Tray menu action triggered
    TrayAction(TrayAction),
}
