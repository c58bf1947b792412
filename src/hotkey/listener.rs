//! Global hotkey listener
//!
//! Binds OS-wide hotkeys to presets and hands triggered preset names to the
//! owning thread through the [`EventSender`] queue. The listener thread only
//! looks the hotkey up in an immutable [`HookTable`] and enqueues; it never
//! touches configuration, files or the device.
//!
//! The hook table is published through an `ArcSwap`, so the listener thread
//! reads it without locking and the owner replaces it with a single pointer
//! swap.
//!
//! # Reload policy
//!
//! `reload` publishes an empty table, unregisters every old hotkey, registers
//! the new set and then publishes the new table. A trigger pressed during that
//! gap is lost, never duplicated, and an old trigger can never fire once the
//! new table is visible.

use super::combo::parse_hotkey;
use super::registry::HotkeyMap;
use crate::core::config::HotkeyConfig;
use crate::core::error::{PedalError, Result};
use crate::core::events::{AppEvent, EventSender, PresetSource};
use crate::pedal::PresetId;
use anyhow::Context;
use arc_swap::ArcSwap;
use global_hotkey::{hotkey::HotKey, GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Listener lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// Raw OS hotkey event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent {
    pub id: u32,
    pub pressed: bool,
}

/// Blocking source of OS hotkey events, drained on the listener thread
pub trait TriggerSource: Send + 'static {
    /// Wait up to `timeout` for the next event
    fn next_event(&mut self, timeout: Duration) -> Option<TriggerEvent>;
}

/// OS hotkey registration mechanism
pub trait HotkeyBackend {
    fn register(&mut self, hotkey: HotKey) -> std::result::Result<(), global_hotkey::Error>;
    fn unregister(&mut self, hotkey: HotKey) -> std::result::Result<(), global_hotkey::Error>;
    /// Event stream for a newly started listener thread
    fn event_source(&self) -> Box<dyn TriggerSource>;
}

/// Backend using the `global-hotkey` crate.
///
/// Must be created on the thread running the platform event loop.
pub struct OsHotkeyBackend {
    manager: GlobalHotKeyManager,
}

impl OsHotkeyBackend {
    pub fn new() -> anyhow::Result<Self> {
        let manager = GlobalHotKeyManager::new().context("Failed to create hotkey manager")?;
        Ok(Self { manager })
    }
}

impl HotkeyBackend for OsHotkeyBackend {
    fn register(&mut self, hotkey: HotKey) -> std::result::Result<(), global_hotkey::Error> {
        self.manager.register(hotkey)
    }

    fn unregister(&mut self, hotkey: HotKey) -> std::result::Result<(), global_hotkey::Error> {
        self.manager.unregister(hotkey)
    }

    fn event_source(&self) -> Box<dyn TriggerSource> {
        Box::new(OsTriggerSource)
    }
}

struct OsTriggerSource;

impl TriggerSource for OsTriggerSource {
    fn next_event(&mut self, timeout: Duration) -> Option<TriggerEvent> {
        GlobalHotKeyEvent::receiver()
            .recv_timeout(timeout)
            .ok()
            .map(|event| TriggerEvent {
                id: event.id,
                pressed: event.state == HotKeyState::Pressed,
            })
    }
}

/// Installed hotkey
#[derive(Debug, Clone)]
pub struct HookEntry {
    pub trigger: String,
    pub preset: PresetId,
}

/// Hotkey id -> binding, immutable once published
pub type HookTable = HashMap<u32, HookEntry>;

/// Background listener mapping OS hotkeys to preset requests
pub struct GlobalHotkeyListener<B: HotkeyBackend> {
    backend: B,
    state: ListenerState,
    /// Registry snapshot the current hooks were built from
    snapshot: Arc<HotkeyMap>,
    /// Table read by the listener thread
    table: Arc<ArcSwap<HookTable>>,
    installed: Vec<(String, HotKey)>,
    events: EventSender,
    stop_flag: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    keepalive: Duration,
    stop_timeout: Duration,
}

impl<B: HotkeyBackend> GlobalHotkeyListener<B> {
    pub fn new(backend: B, events: EventSender, config: &HotkeyConfig) -> Self {
        Self {
            backend,
            state: ListenerState::Stopped,
            snapshot: Arc::new(HotkeyMap::new()),
            table: Arc::new(ArcSwap::from_pointee(HookTable::new())),
            installed: Vec::new(),
            events,
            stop_flag: Arc::new(AtomicBool::new(true)),
            thread: None,
            keepalive: Duration::from_millis(config.keepalive_ms.max(1)),
            stop_timeout: Duration::from_millis(config.stop_timeout_ms),
        }
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Triggers with a live OS hook
    pub fn active_triggers(&self) -> Vec<String> {
        self.installed.iter().map(|(trigger, _)| trigger.clone()).collect()
    }

    /// Install hooks for `snapshot` and start the listener thread.
    ///
    /// Installation is best-effort: the listener runs even when some hooks
    /// fail, and the failures are returned as `PartialInstallFailure`.
    pub fn start(&mut self, snapshot: Arc<HotkeyMap>) -> Result<()> {
        if self.state != ListenerState::Stopped {
            debug!("Hotkey listener already {:?}", self.state);
            return Ok(());
        }
        self.state = ListenerState::Starting;
        self.snapshot = snapshot;

        let installed = self.install();

        // Fresh flag per thread so a detached predecessor keeps its own stop signal
        let stop_flag = Arc::new(AtomicBool::new(false));
        self.stop_flag = Arc::clone(&stop_flag);
        let source = self.backend.event_source();
        let table = Arc::clone(&self.table);
        let events = self.events.clone();
        let keepalive = self.keepalive;
        self.thread = Some(thread::spawn(move || {
            run_listener(source, table, events, stop_flag, keepalive)
        }));

        self.state = ListenerState::Running;
        info!("Hotkey listener running with {} hotkey(s)", self.installed.len());
        installed
    }

    /// Swap the active hooks for ones built from `snapshot`.
    ///
    /// When the listener is not running the snapshot is kept for the next
    /// `start`.
    pub fn reload(&mut self, snapshot: Arc<HotkeyMap>) -> Result<()> {
        self.snapshot = snapshot;
        if self.state != ListenerState::Running {
            debug!("Hotkey listener not running; reload deferred to start");
            return Ok(());
        }

        self.table.store(Arc::new(HookTable::new()));
        self.uninstall_all();
        let result = self.install();
        info!("Hotkeys reloaded: {} active", self.installed.len());
        result
    }

    /// Remove all hooks and stop the listener thread. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.state == ListenerState::Stopped {
            return;
        }
        self.state = ListenerState::Stopping;

        self.table.store(Arc::new(HookTable::new()));
        self.uninstall_all();
        self.stop_flag.store(true, Ordering::Release);

        if let Some(handle) = self.thread.take() {
            join_with_timeout(handle, self.stop_timeout);
        }

        self.state = ListenerState::Stopped;
        info!("Hotkey listener stopped");
    }

    fn install(&mut self) -> Result<()> {
        let mut table = HookTable::new();
        let mut failed = Vec::new();
        let snapshot = Arc::clone(&self.snapshot);

        for (trigger, preset) in snapshot.iter() {
            let hotkey = match parse_hotkey(trigger) {
                Ok(hotkey) => hotkey,
                Err(e) => {
                    warn!("Skipping hotkey '{}': {}", trigger, e);
                    failed.push(trigger.clone());
                    continue;
                }
            };

            if let Some(existing) = table.get(&hotkey.id()) {
                warn!(
                    "Hotkey '{}' is the same key combination as '{}'",
                    trigger, existing.trigger
                );
                failed.push(trigger.clone());
                continue;
            }

            match self.backend.register(hotkey) {
                Ok(()) => {
                    table.insert(
                        hotkey.id(),
                        HookEntry {
                            trigger: trigger.clone(),
                            preset: preset.clone(),
                        },
                    );
                    self.installed.push((trigger.clone(), hotkey));
                    info!("Registered hotkey {} -> preset '{}'", trigger, preset);
                }
                Err(e) => {
                    warn!("Failed to register hotkey {}: {}", trigger, e);
                    failed.push(trigger.clone());
                }
            }
        }

        self.table.store(Arc::new(table));

        if failed.is_empty() {
            Ok(())
        } else {
            Err(PedalError::PartialInstallFailure { failed })
        }
    }

    fn uninstall_all(&mut self) {
        for (trigger, hotkey) in std::mem::take(&mut self.installed) {
            if let Err(e) = self.backend.unregister(hotkey) {
                warn!("Failed to unregister hotkey {}: {}", trigger, e);
            }
        }
    }
}

impl<B: HotkeyBackend> Drop for GlobalHotkeyListener<B> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_listener(
    mut source: Box<dyn TriggerSource>,
    table: Arc<ArcSwap<HookTable>>,
    events: EventSender,
    stop_flag: Arc<AtomicBool>,
    keepalive: Duration,
) {
    debug!("Hotkey listener thread started");
    while !stop_flag.load(Ordering::Acquire) {
        if let Some(event) = source.next_event(keepalive) {
            // Only respond to key press, not release
            if event.pressed && !stop_flag.load(Ordering::Acquire) {
                dispatch(&table, &events, event.id);
            }
        }
    }
    debug!("Hotkey listener thread exiting");
}

/// Look up a fired hotkey and enqueue its preset; true when something was sent
fn dispatch(table: &ArcSwap<HookTable>, events: &EventSender, id: u32) -> bool {
    let table = table.load();
    let Some(entry) = table.get(&id) else {
        debug!("Hotkey {} is not bound", id);
        return false;
    };

    debug!("Hotkey {} pressed -> preset '{}'", entry.trigger, entry.preset);
    let event = AppEvent::PresetRequested {
        preset: entry.preset.clone(),
        source: PresetSource::Hotkey {
            trigger: entry.trigger.clone(),
        },
    };
    if let Err(e) = events.send(event) {
        error!("Failed to send hotkey event: {}", e);
        return false;
    }
    true
}

fn join_with_timeout(handle: JoinHandle<()>, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            warn!("Hotkey listener thread did not exit within {:?}; detaching", timeout);
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    if handle.join().is_err() {
        error!("Hotkey listener thread panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotkey::registry::validate_bindings;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::mpsc as std_mpsc;
    use tokio::sync::mpsc;

    /// In-process stand-in for the OS hotkey service
    #[derive(Clone, Default)]
    struct FakeOs {
        inner: Arc<Mutex<FakeOsState>>,
    }

    #[derive(Default)]
    struct FakeOsState {
        registered: HashSet<u32>,
        rejected: HashSet<u32>,
        subscribers: Vec<std_mpsc::Sender<TriggerEvent>>,
    }

    impl FakeOs {
        fn reject(&self, trigger: &str) {
            let id = parse_hotkey(trigger).unwrap().id();
            self.inner.lock().rejected.insert(id);
        }

        fn registered_count(&self) -> usize {
            self.inner.lock().registered.len()
        }

        fn send(&self, trigger: &str, pressed: bool) {
            let id = parse_hotkey(trigger).unwrap().id();
            let state = self.inner.lock();
            // The OS only reports hotkeys that are registered
            if !state.registered.contains(&id) {
                return;
            }
            for subscriber in &state.subscribers {
                let _ = subscriber.send(TriggerEvent { id, pressed });
            }
        }

        fn press(&self, trigger: &str) {
            self.send(trigger, true);
        }
    }

    impl HotkeyBackend for FakeOs {
        fn register(&mut self, hotkey: HotKey) -> std::result::Result<(), global_hotkey::Error> {
            let mut state = self.inner.lock();
            if state.rejected.contains(&hotkey.id()) {
                return Err(global_hotkey::Error::FailedToRegister("taken".into()));
            }
            if !state.registered.insert(hotkey.id()) {
                return Err(global_hotkey::Error::AlreadyRegistered(hotkey));
            }
            Ok(())
        }

        fn unregister(&mut self, hotkey: HotKey) -> std::result::Result<(), global_hotkey::Error> {
            self.inner.lock().registered.remove(&hotkey.id());
            Ok(())
        }

        fn event_source(&self) -> Box<dyn TriggerSource> {
            let (tx, rx) = std_mpsc::channel();
            self.inner.lock().subscribers.push(tx);
            Box::new(FakeSource { rx })
        }
    }

    struct FakeSource {
        rx: std_mpsc::Receiver<TriggerEvent>,
    }

    impl TriggerSource for FakeSource {
        fn next_event(&mut self, timeout: Duration) -> Option<TriggerEvent> {
            self.rx.recv_timeout(timeout).ok()
        }
    }

    fn test_config() -> HotkeyConfig {
        HotkeyConfig {
            enabled: true,
            keepalive_ms: 10,
            stop_timeout_ms: 500,
        }
    }

    fn listener() -> (
        FakeOs,
        GlobalHotkeyListener<FakeOs>,
        mpsc::UnboundedReceiver<AppEvent>,
    ) {
        let os = FakeOs::default();
        let (tx, rx) = mpsc::unbounded_channel();
        let listener = GlobalHotkeyListener::new(os.clone(), EventSender::detached(tx), &test_config());
        (os, listener, rx)
    }

    fn bindings(rows: &[(&str, &str)]) -> Arc<HotkeyMap> {
        Arc::new(validate_bindings(rows.iter().copied()).unwrap())
    }

    /// Next delivered preset name, waiting up to `timeout`
    fn next_preset(rx: &mut mpsc::UnboundedReceiver<AppEvent>, timeout: Duration) -> Option<String> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(AppEvent::PresetRequested { preset, .. }) = rx.try_recv() {
                return Some(preset);
            }
            if Instant::now() >= deadline {
                return None;
            }
            thread::sleep(Duration::from_millis(2));
        }
    }

    const WAIT: Duration = Duration::from_secs(2);
    const QUIET: Duration = Duration::from_millis(100);

    #[test]
    fn test_start_and_deliver() {
        let (os, mut listener, mut rx) = listener();
        listener.start(bindings(&[("ctrl+alt+1", "gaming")])).unwrap();
        assert_eq!(listener.state(), ListenerState::Running);

        os.press("ctrl+alt+1");
        assert_eq!(next_preset(&mut rx, WAIT).as_deref(), Some("gaming"));
        assert_eq!(next_preset(&mut rx, QUIET), None);
        listener.stop();
    }

    #[test]
    fn test_delivery_carries_trigger() {
        let (os, mut listener, mut rx) = listener();
        listener.start(bindings(&[("F5", "live")])).unwrap();
        os.press("f5");

        let deadline = Instant::now() + WAIT;
        let event = loop {
            if let Ok(event) = rx.try_recv() {
                break event;
            }
            assert!(Instant::now() < deadline, "no delivery");
            thread::sleep(Duration::from_millis(2));
        };
        match event {
            AppEvent::PresetRequested { preset, source } => {
                assert_eq!(preset, "live");
                assert_eq!(source, PresetSource::Hotkey { trigger: "f5".into() });
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_release_is_ignored() {
        let (os, mut listener, mut rx) = listener();
        listener.start(bindings(&[("ctrl+1", "a")])).unwrap();
        os.send("ctrl+1", false);
        assert_eq!(next_preset(&mut rx, QUIET), None);
    }

    #[test]
    fn test_reload_swaps_bindings() {
        let (os, mut listener, mut rx) = listener();
        listener.start(bindings(&[("ctrl+1", "old")])).unwrap();

        listener.reload(bindings(&[("ctrl+2", "new")])).unwrap();
        assert_eq!(listener.active_triggers(), vec!["ctrl+2".to_string()]);

        os.press("ctrl+1");
        assert_eq!(next_preset(&mut rx, QUIET), None);

        os.press("ctrl+2");
        assert_eq!(next_preset(&mut rx, WAIT).as_deref(), Some("new"));
        assert_eq!(next_preset(&mut rx, QUIET), None);
    }

    #[test]
    fn test_reload_rebinds_same_trigger_to_new_preset() {
        let (os, mut listener, mut rx) = listener();
        listener.start(bindings(&[("ctrl+1", "old")])).unwrap();
        listener.reload(bindings(&[("ctrl+1", "new")])).unwrap();
        assert_eq!(os.registered_count(), 1);

        os.press("ctrl+1");
        assert_eq!(next_preset(&mut rx, WAIT).as_deref(), Some("new"));
        assert_eq!(next_preset(&mut rx, QUIET), None);
    }

    #[test]
    fn test_deliveries_keep_trigger_order() {
        let (os, mut listener, mut rx) = listener();
        listener
            .start(bindings(&[("ctrl+1", "first"), ("ctrl+2", "second")]))
            .unwrap();

        os.press("ctrl+1");
        os.press("ctrl+2");
        os.press("ctrl+1");

        assert_eq!(next_preset(&mut rx, WAIT).as_deref(), Some("first"));
        assert_eq!(next_preset(&mut rx, WAIT).as_deref(), Some("second"));
        assert_eq!(next_preset(&mut rx, WAIT).as_deref(), Some("first"));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (os, mut listener, mut rx) = listener();
        listener.start(bindings(&[("ctrl+1", "a"), ("ctrl+2", "b")])).unwrap();
        assert_eq!(os.registered_count(), 2);

        listener.stop();
        listener.stop();
        assert_eq!(listener.state(), ListenerState::Stopped);
        assert_eq!(os.registered_count(), 0);
        assert!(listener.active_triggers().is_empty());

        os.press("ctrl+1");
        assert_eq!(next_preset(&mut rx, QUIET), None);
    }

    #[test]
    fn test_stop_before_start() {
        let (_os, mut listener, _rx) = listener();
        listener.stop();
        assert_eq!(listener.state(), ListenerState::Stopped);
    }

    #[test]
    fn test_restart_after_stop() {
        let (os, mut listener, mut rx) = listener();
        listener.start(bindings(&[("ctrl+1", "a")])).unwrap();
        listener.stop();
        listener.start(bindings(&[("ctrl+1", "b")])).unwrap();

        os.press("ctrl+1");
        assert_eq!(next_preset(&mut rx, WAIT).as_deref(), Some("b"));
        assert_eq!(next_preset(&mut rx, QUIET), None);
    }

    #[test]
    fn test_partial_install_failure_keeps_others() {
        let (os, mut listener, mut rx) = listener();
        os.reject("ctrl+2");

        let result = listener.start(bindings(&[
            ("ctrl+1", "a"),
            ("ctrl+2", "b"),
            ("ctrl+nonsense", "c"),
        ]));
        match result {
            Err(PedalError::PartialInstallFailure { failed }) => {
                assert_eq!(failed, vec!["ctrl+2".to_string(), "ctrl+nonsense".to_string()]);
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(listener.state(), ListenerState::Running);

        os.press("ctrl+1");
        assert_eq!(next_preset(&mut rx, WAIT).as_deref(), Some("a"));
    }

    #[test]
    fn test_equivalent_triggers_conflict() {
        let (_os, mut listener, _rx) = listener();
        let result = listener.start(bindings(&[("control+enter", "a"), ("ctrl+return", "b")]));
        assert!(matches!(result, Err(PedalError::PartialInstallFailure { ref failed }) if failed.len() == 1));
        assert_eq!(listener.active_triggers().len(), 1);
    }

    #[test]
    fn test_reload_while_stopped_is_used_on_start() {
        let (os, mut listener, mut rx) = listener();
        listener.reload(bindings(&[("ctrl+9", "later")])).unwrap();
        assert_eq!(os.registered_count(), 0);

        let snapshot = listener.snapshot.clone();
        listener.start(snapshot).unwrap();
        os.press("ctrl+9");
        assert_eq!(next_preset(&mut rx, WAIT).as_deref(), Some("later"));
    }

    #[test]
    fn test_drop_unregisters() {
        let (os, mut listener, _rx) = listener();
        listener.start(bindings(&[("ctrl+1", "a")])).unwrap();
        drop(listener);
        assert_eq!(os.registered_count(), 0);
    }
}
