// Hide console window on Windows release builds
#![cfg_attr(
    all(target_os = "windows", not(debug_assertions)),
    windows_subsystem = "windows"
)]

//! Pedal Deck - Entry Point
//!
//! Builds the preset pipeline, then runs the tray, the global hotkeys and the
//! device log reader on the winit event loop.

use anyhow::Result;
use chrono::Local;
use pedal_deck::{
    core::{
        config::AppConfig,
        error::PedalError,
        events::{AppEvent, EventSender, PresetSource},
    },
    device::{CircuitPyDrive, SerialReader},
    dispatch::{DisplaySink, Notice, PresetDispatchCoordinator},
    display::LogDisplay,
    hotkey::{GlobalHotkeyListener, HotkeyRegistry, OsHotkeyBackend},
    pedal::{LocalConfigFile, PresetDirectory},
    tray::{TrayAction, TrayManager},
};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::WindowId,
};

/// Main application handler for winit event loop
struct App {
    /// Configuration
    config: AppConfig,
    /// Where config.json, presets and hotkeys live
    data_dir: PathBuf,
    hotkeys_path: PathBuf,
    /// Event sender for inter-module communication (wakes event loop)
    event_tx: EventSender,
    /// Event receiver for inter-module communication
    event_rx: Option<mpsc::UnboundedReceiver<AppEvent>>,
    coordinator: PresetDispatchCoordinator,
    /// Shares state with the coordinator's display sink
    display: LogDisplay,
    registry: Option<HotkeyRegistry>,
    listener: Option<GlobalHotkeyListener<OsHotkeyBackend>>,
    serial: Option<SerialReader>,
    tray_manager: Option<TrayManager>,
    poll_interval: Duration,
    started: bool,
}

impl App {
    fn new(
        config: AppConfig,
        event_tx: EventSender,
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
    ) -> Result<Self> {
        let data_dir = config.data_dir()?;
        let display = LogDisplay::new();
        let coordinator = PresetDispatchCoordinator::new(
            Box::new(PresetDirectory::new(config.presets_dir()?)),
            Box::new(LocalConfigFile::new(config.active_config_path()?)),
            Box::new(CircuitPyDrive::new(config.device.clone())),
            Box::new(display.clone()),
        );
        info!("Data directory: {:?}", data_dir);

        Ok(Self {
            hotkeys_path: config.hotkeys_path()?,
            poll_interval: Duration::from_millis(config.serial.poll_interval_ms.max(10)),
            config,
            data_dir,
            event_tx,
            event_rx: Some(event_rx),
            coordinator,
            display,
            registry: None,
            listener: None,
            serial: None,
            tray_manager: None,
            started: false,
        })
    }

    fn report(&mut self, context: &str, error: &PedalError) {
        self.display.notify(Notice::failure(context, error));
    }

    /// Register preset hotkeys (must run on the event loop thread)
    fn start_hotkeys(&mut self) {
        if !self.config.hotkeys.enabled {
            info!("Global hotkeys disabled in config");
            return;
        }

        let registry = match HotkeyRegistry::open(&self.hotkeys_path) {
            Ok(registry) => registry,
            Err(e) => {
                self.report("Could not read hotkeys", &e);
                return;
            }
        };

        let backend = match OsHotkeyBackend::new() {
            Ok(backend) => backend,
            Err(e) => {
                error!("Failed to initialize global hotkeys: {:#}", e);
                return;
            }
        };

        let mut listener =
            GlobalHotkeyListener::new(backend, self.event_tx.clone(), &self.config.hotkeys);
        if let Err(e) = listener.start(registry.snapshot()) {
            self.report("Hotkeys", &e);
        }

        self.registry = Some(registry);
        self.listener = Some(listener);
    }

    fn reload_hotkeys(&mut self) {
        if self.registry.is_none() || self.listener.is_none() {
            self.start_hotkeys();
            return;
        }
        let (Some(registry), Some(listener)) = (self.registry.as_mut(), self.listener.as_mut()) else {
            return;
        };

        let result = registry
            .reload()
            .and_then(|snapshot| listener.reload(snapshot));
        let notice = match result {
            Ok(()) => Notice::info(format!("{} hotkey(s) active", listener.active_triggers().len())),
            Err(e) => Notice::failure("Hotkeys", &e),
        };
        self.display.notify(notice);
    }

    fn start_serial(&mut self) {
        if !self.config.serial.enabled {
            return;
        }
        match SerialReader::open(&self.config.serial) {
            Ok(reader) => self.serial = Some(reader),
            Err(e) => warn!("Device log unavailable: {}", e),
        }
    }

    fn poll_serial(&mut self) {
        let Some(reader) = self.serial.as_mut() else {
            return;
        };
        while let Some(line) = reader.poll_line() {
            info!("[Pico] {}", line);
        }
        if !reader.is_running() {
            info!("Device log on {} closed", reader.name());
            self.serial = None;
        }
    }

    /// Sync tray presets, icon and tooltip with the active state
    fn refresh_tray(&mut self) {
        let Some(tray) = self.tray_manager.as_mut() else {
            return;
        };

        let state = self.coordinator.state();
        match self.coordinator.list_presets() {
            Ok(presets) => tray.set_presets(&presets, state.active_preset.as_deref()),
            Err(e) => warn!("Failed to list presets: {}", e),
        }
        tray.set_status(
            &format!("Pedal Deck - {}", state.status_line()),
            state.active_preset.is_some(),
        );
    }

    fn handle_event(&mut self, event: AppEvent, event_loop: &ActiveEventLoop) {
        match event {
            AppEvent::PresetRequested { preset, source } => {
                self.coordinator.apply(&preset, source);
            }
            AppEvent::TrayAction(action) => self.handle_tray_action(action, event_loop),
        }
    }

    fn handle_tray_action(&mut self, action: TrayAction, event_loop: &ActiveEventLoop) {
        debug!("Tray action: {:?}", action);
        // Failures below are already reported through the display
        match action {
            TrayAction::ApplyPreset(name) => {
                self.coordinator.apply(&name, PresetSource::Ui);
            }
            TrayAction::SavePresetAs => {
                let name = format!("preset-{}", Local::now().format("%Y%m%d-%H%M%S"));
                let _ = self.coordinator.save_preset_as(&name);
            }
            TrayAction::Upload => {
                let _ = self.coordinator.upload();
            }
            TrayAction::Download => {
                let _ = self.coordinator.download();
            }
            TrayAction::ReloadConfig => {
                let _ = self.coordinator.load_local();
            }
            TrayAction::ReloadHotkeys => self.reload_hotkeys(),
            TrayAction::OpenDataDir => {
                if let Err(e) = std::fs::create_dir_all(&self.data_dir) {
                    warn!("Failed to create data directory: {}", e);
                }
                if let Err(e) = open::that(&self.data_dir) {
                    warn!("Failed to open {:?}: {}", self.data_dir, e);
                }
            }
            TrayAction::Quit => {
                info!("Quit requested");
                event_loop.exit();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + self.poll_interval));
        if self.started {
            return;
        }
        self.started = true;

        let _ = self.coordinator.load_local();

        // Initialize tray manager
        match TrayManager::new(self.event_tx.clone()) {
            Ok(tray) => {
                self.tray_manager = Some(tray);
                info!("Tray manager initialized");
            }
            Err(e) => {
                error!("Failed to initialize tray manager: {:#}", e);
            }
        }

        self.start_hotkeys();
        self.start_serial();
        self.refresh_tray();
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _window_id: WindowId, _event: WindowEvent) {
        // No windows; the app lives in the tray
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Collect events first, then process them
        let events: Vec<AppEvent> = if let Some(ref mut rx) = self.event_rx {
            let mut events = Vec::new();
            while let Ok(event) = rx.try_recv() {
                events.push(event);
            }
            events
        } else {
            Vec::new()
        };

        let handled = !events.is_empty();
        for event in events {
            self.handle_event(event, event_loop);
        }

        self.poll_serial();

        let status_changed = self.display.take_status().is_some();
        if handled || status_changed {
            self.refresh_tray();
        }

        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + self.poll_interval));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        info!("Application exiting");

        if let Some(listener) = self.listener.as_mut() {
            listener.stop();
        }
        if let Some(reader) = self.serial.as_mut() {
            reader.stop();
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pedal Deck");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded");

    // Create event channel
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    // Create event loop
    let event_loop = EventLoop::new()?;

    // Create EventSender that wraps the channel + event loop proxy for wake-up
    let proxy = event_loop.create_proxy();
    let event_sender = EventSender::new(event_tx, proxy);

    // Create application
    let mut app = App::new(config, event_sender, event_rx)?;

    // Run event loop
    event_loop.run_app(&mut app)?;

    Ok(())
}
