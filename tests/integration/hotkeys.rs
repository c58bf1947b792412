//! Hotkey table edits flowing into the listener

use global_hotkey::hotkey::HotKey;
use parking_lot::Mutex;
use pedal_deck::core::config::HotkeyConfig;
use pedal_deck::dispatch::update_hotkeys;
use pedal_deck::hotkey::listener::{TriggerEvent, TriggerSource};
use pedal_deck::hotkey::{parse_hotkey, GlobalHotkeyListener, HotkeyBackend, HotkeyRegistry};
use pedal_deck::{AppEvent, EventSender, PedalError, PresetSource};
use std::collections::HashSet;
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::sync::mpsc;

/// OS hotkey service that only reports registered hotkeys
#[derive(Clone, Default)]
struct FakeOs {
    registered: Arc<Mutex<HashSet<u32>>>,
    subscribers: Arc<Mutex<Vec<std_mpsc::Sender<TriggerEvent>>>>,
}

impl FakeOs {
    fn press(&self, trigger: &str) {
        let id = parse_hotkey(trigger).unwrap().id();
        if !self.registered.lock().contains(&id) {
            return;
        }
        for subscriber in self.subscribers.lock().iter() {
            let _ = subscriber.send(TriggerEvent { id, pressed: true });
        }
    }
}

impl HotkeyBackend for FakeOs {
    fn register(&mut self, hotkey: HotKey) -> Result<(), global_hotkey::Error> {
        if !self.registered.lock().insert(hotkey.id()) {
            return Err(global_hotkey::Error::AlreadyRegistered(hotkey));
        }
        Ok(())
    }

    fn unregister(&mut self, hotkey: HotKey) -> Result<(), global_hotkey::Error> {
        self.registered.lock().remove(&hotkey.id());
        Ok(())
    }

    fn event_source(&self) -> Box<dyn TriggerSource> {
        let (tx, rx) = std_mpsc::channel();
        self.subscribers.lock().push(tx);
        Box::new(FakeSource(rx))
    }
}

struct FakeSource(std_mpsc::Receiver<TriggerEvent>);

impl TriggerSource for FakeSource {
    fn next_event(&mut self, timeout: Duration) -> Option<TriggerEvent> {
        self.0.recv_timeout(timeout).ok()
    }
}

fn next_event(rx: &mut mpsc::UnboundedReceiver<AppEvent>, timeout: Duration) -> Option<AppEvent> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Ok(event) = rx.try_recv() {
            return Some(event);
        }
        if Instant::now() >= deadline {
            return None;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
}

struct Setup {
    _dir: TempDir,
    os: FakeOs,
    registry: HotkeyRegistry,
    listener: GlobalHotkeyListener<FakeOs>,
    rx: mpsc::UnboundedReceiver<AppEvent>,
}

fn setup() -> Setup {
    let dir = TempDir::new().unwrap();
    let registry = HotkeyRegistry::open(dir.path().join("hotkeys.toml")).unwrap();
    let os = FakeOs::default();
    let (tx, rx) = mpsc::unbounded_channel();
    let config = HotkeyConfig {
        keepalive_ms: 10,
        ..HotkeyConfig::default()
    };
    let mut listener = GlobalHotkeyListener::new(os.clone(), EventSender::detached(tx), &config);
    listener.start(registry.snapshot()).unwrap();
    Setup {
        _dir: dir,
        os,
        registry,
        listener,
        rx,
    }
}

#[test]
fn test_update_rebinds_live() {
    let mut s = setup();

    update_hotkeys(
        &mut s.registry,
        &mut s.listener,
        [("Ctrl+Alt+1", "gaming"), ("", "ignored"), ("ctrl + alt + 2", "writing")],
    )
    .unwrap();
    assert_eq!(s.listener.active_triggers().len(), 2);

    s.os.press("ctrl+alt+2");
    match next_event(&mut s.rx, Duration::from_secs(2)) {
        Some(AppEvent::PresetRequested { preset, source }) => {
            assert_eq!(preset, "writing");
            assert_eq!(
                source,
                PresetSource::Hotkey {
                    trigger: "ctrl+alt+2".into()
                }
            );
        }
        other => panic!("unexpected delivery {:?}", other),
    }

    // Replace the table: the old trigger goes quiet
    update_hotkeys(&mut s.registry, &mut s.listener, [("f13", "gaming")]).unwrap();
    s.os.press("ctrl+alt+1");
    assert!(next_event(&mut s.rx, Duration::from_millis(100)).is_none());
    s.os.press("f13");
    assert!(matches!(
        next_event(&mut s.rx, Duration::from_secs(2)),
        Some(AppEvent::PresetRequested { preset, .. }) if preset == "gaming"
    ));

    s.listener.stop();
}

#[test]
fn test_duplicate_rows_change_nothing() {
    let mut s = setup();
    update_hotkeys(&mut s.registry, &mut s.listener, [("f1", "a")]).unwrap();

    let result = update_hotkeys(
        &mut s.registry,
        &mut s.listener,
        [("F2", "b"), ("f2", "c")],
    );
    assert!(matches!(result, Err(PedalError::DuplicateBinding { ref trigger }) if trigger == "f2"));

    // Neither the file, the snapshot nor the hooks moved
    assert_eq!(s.registry.load().unwrap().len(), 1);
    assert_eq!(s.registry.snapshot().get("f1").map(String::as_str), Some("a"));
    assert_eq!(s.listener.active_triggers(), vec!["f1".to_string()]);
}

#[test]
fn test_saved_table_survives_restart() {
    let mut s = setup();
    update_hotkeys(
        &mut s.registry,
        &mut s.listener,
        [("ctrl+shift+p", "podcast"), ("ctrl+shift+g", "gaming")],
    )
    .unwrap();

    let reopened = HotkeyRegistry::open(s.registry.path()).unwrap();
    assert_eq!(*reopened.snapshot(), *s.registry.snapshot());
}
