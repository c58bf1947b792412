//! Preset apply pipeline over real files

use pedal_deck::core::config::DeviceConfig;
use pedal_deck::device::CircuitPyDrive;
use pedal_deck::dispatch::ApplyStep;
use pedal_deck::display::LogDisplay;
use pedal_deck::pedal::storage::read_config;
use pedal_deck::pedal::{LocalConfigFile, PresetDirectory, PresetStore};
use pedal_deck::{
    ActionKind, DisplaySink, PedalConfig, PedalError, PinBinding, PresetDispatchCoordinator,
    PresetSource, Severity,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Setup {
    _dir: TempDir,
    data_dir: PathBuf,
    mounts: PathBuf,
    display: LogDisplay,
    coordinator: PresetDispatchCoordinator,
}

/// Data directory plus an empty "mounts" directory standing in for /media
fn setup() -> Setup {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    let mounts = dir.path().join("mounts");
    fs::create_dir_all(&mounts).unwrap();

    let display = LogDisplay::new();
    let coordinator = coordinator_for(&data_dir, &mounts, &display);
    Setup {
        _dir: dir,
        data_dir,
        mounts,
        display,
        coordinator,
    }
}

fn coordinator_for(data_dir: &Path, mounts: &Path, display: &LogDisplay) -> PresetDispatchCoordinator {
    // Only `mounts/CIRCUITPY` is searched; tests create it to plug the pedal in
    let drive = CircuitPyDrive::with_search_roots(
        DeviceConfig::default(),
        vec![mounts.join("CIRCUITPY")],
    );
    PresetDispatchCoordinator::new(
        Box::new(PresetDirectory::new(data_dir.join("presets"))),
        Box::new(LocalConfigFile::new(data_dir.join("config.json"))),
        Box::new(drive),
        Box::new(display.clone()),
    )
}

fn writing_preset() -> PedalConfig {
    PedalConfig::new(vec![
        PinBinding::from_display("GP0", ActionKind::Combo, "CTRL+S").unwrap(),
        PinBinding::from_display("GP1", ActionKind::SingleKey, "PAGEDOWN").unwrap(),
        PinBinding::from_display("GP2", ActionKind::ContinuousControl, "mute").unwrap(),
    ])
}

#[test]
fn test_apply_without_device_persists_locally() {
    let mut s = setup();
    PresetDirectory::new(s.data_dir.join("presets"))
        .save("writing", &writing_preset())
        .unwrap();

    let report = s.coordinator.apply(
        "writing",
        PresetSource::Hotkey {
            trigger: "ctrl+alt+w".into(),
        },
    );

    assert!(report.applied());
    assert!(report.persisted());
    assert!(!report.pushed());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].step, ApplyStep::Push);
    assert!(matches!(report.failures[0].error, PedalError::NotFound { .. }));

    // Steps 2, 3 and 5 happened
    assert_eq!(s.display.current(), writing_preset());
    assert_eq!(read_config(&s.data_dir.join("config.json")).unwrap(), writing_preset());
    assert_eq!(s.coordinator.state().active_preset.as_deref(), Some("writing"));
    assert!(s.display.notices().iter().any(|n| n.level == Severity::Warning));
}

#[test]
fn test_apply_with_device_writes_both_copies() {
    let mut s = setup();
    let drive_root = s.mounts.join("CIRCUITPY");
    fs::create_dir_all(&drive_root).unwrap();
    PresetDirectory::new(s.data_dir.join("presets"))
        .save("writing", &writing_preset())
        .unwrap();

    let report = s.coordinator.apply("writing", PresetSource::Ui);
    assert!(report.failures.is_empty());
    assert_eq!(report.device_path, Some(drive_root.join("config.json")));

    let local = fs::read(s.data_dir.join("config.json")).unwrap();
    let device = fs::read(drive_root.join("config.json")).unwrap();
    assert_eq!(local, device);
}

#[test]
fn test_unknown_preset_leaves_files_alone() {
    let mut s = setup();
    s.coordinator.load_local().unwrap();

    let report = s.coordinator.apply("missing", PresetSource::Ui);
    assert!(!report.applied());
    assert!(!s.data_dir.join("config.json").exists());
    assert_eq!(s.display.current(), PedalConfig::default());
}

#[test]
fn test_download_then_restart() {
    let mut s = setup();
    let drive_root = s.mounts.join("CIRCUITPY");
    fs::create_dir_all(&drive_root).unwrap();
    fs::write(
        drive_root.join("config.json"),
        include_str!("../fixtures/firmware_config.json"),
    )
    .unwrap();

    s.coordinator.download().unwrap();
    let downloaded = s.display.current();
    assert_eq!(downloaded.len(), 5);

    // A fresh coordinator sees the downloaded configuration
    let display = LogDisplay::new();
    let mut restarted = coordinator_for(&s.data_dir, &s.mounts, &display);
    restarted.load_local().unwrap();
    assert_eq!(display.current(), downloaded);
}

#[test]
fn test_edit_save_and_preset_roundtrip() {
    let mut s = setup();
    s.coordinator.load_local().unwrap();

    let mut edited = s.display.current();
    edited.add_pin().unwrap();
    edited.set(PinBinding::from_display("GP2", ActionKind::Combo, "ALT+F4").unwrap());
    s.display.render(&edited);

    assert_eq!(s.coordinator.save_active().unwrap(), None);
    assert_eq!(s.coordinator.save_preset_as("quit-app").unwrap(), "quit-app");
    assert_eq!(s.coordinator.list_presets().unwrap(), vec!["quit-app".to_string()]);

    s.coordinator.delete_preset("quit-app").unwrap();
    assert!(s.coordinator.list_presets().unwrap().is_empty());
    assert_eq!(read_config(&s.data_dir.join("config.json")).unwrap(), edited);
}
