//! Key translation against real firmware documents

use pedal_deck::keymap::{to_device, to_display, KeyValue};
use pedal_deck::pedal::storage::to_pretty_json;
use pedal_deck::{ActionKind, PedalConfig, PinBinding};

const FIRMWARE_CONFIG: &str = include_str!("../fixtures/firmware_config.json");

fn chord(tokens: &[&str]) -> KeyValue {
    KeyValue::Chord(tokens.iter().map(|t| t.to_string()).collect())
}

#[test]
fn test_firmware_document_display_values() {
    let config: PedalConfig = serde_json::from_str(FIRMWARE_CONFIG).unwrap();
    let shown: Vec<String> = config.iter().map(PinBinding::display_value).collect();

    assert_eq!(
        shown,
        vec!["C", "WINDOWS+TAB", "VOLUME_INCREMENT", "CTRL+SHIFT+ESC", "PAGEDOWN"]
    );
}

#[test]
fn test_firmware_document_is_rewritten_byte_for_byte() {
    let config: PedalConfig = serde_json::from_str(FIRMWARE_CONFIG).unwrap();
    let written = to_pretty_json(&config).unwrap();
    assert_eq!(String::from_utf8(written).unwrap(), FIRMWARE_CONFIG);
}

#[test]
fn test_editing_round_trip() {
    let config: PedalConfig = serde_json::from_str(FIRMWARE_CONFIG).unwrap();

    // What the editor shows, typed back in, yields the same document
    let retyped = PedalConfig::new(
        config
            .iter()
            .map(|b| PinBinding::from_display(b.pin.clone(), b.action_kind, &b.display_value()).unwrap())
            .collect(),
    );
    assert_eq!(retyped, config);
}

#[test]
fn test_documented_examples() {
    assert_eq!(
        to_device(&KeyValue::from("CTRL+ALT+A")).unwrap(),
        chord(&["CONTROL", "ALT", "A"])
    );
    assert_eq!(
        to_display(&chord(&["CONTROL", "ALT", "ENTER"])).unwrap(),
        chord(&["CTRL", "ALT", "RETURN"])
    );
}

#[test]
fn test_unknown_tokens_pass_through() {
    assert_eq!(
        to_device(&KeyValue::from("mute")).unwrap(),
        KeyValue::Single("MUTE".into())
    );
    let binding = PinBinding::from_display("GP5", ActionKind::Combo, "ctrl+é").unwrap();
    assert_eq!(binding.value, chord(&["CONTROL", "É"]));
}

#[test]
fn test_translation_is_thread_safe() {
    let handles: Vec<_> = (0..8)
        .map(|_| {
            std::thread::spawn(|| {
                for _ in 0..200 {
                    let device = to_device(&KeyValue::from("CTRL+SHIFT+PAGEUP")).unwrap();
                    assert_eq!(
                        to_display(&device).unwrap(),
                        chord(&["CTRL", "SHIFT", "PAGEUP"])
                    );
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_keypad_plus_round_trips() {
    let shown = to_display(&KeyValue::Single("KEYPAD_PLUS".into())).unwrap();
    assert_eq!(shown, KeyValue::Single("NUMPAD+".into()));
    assert_eq!(to_device(&shown).unwrap(), KeyValue::Single("KEYPAD_PLUS".into()));

    let config: PedalConfig =
        serde_json::from_str(r#"[["GP0","cmb",["CONTROL","KEYPAD_PLUS","A"]]]"#).unwrap();
    let binding = &config.bindings[0];
    assert_eq!(binding.display_value(), "CTRL+NUMPAD++A");
    assert_eq!(
        PinBinding::from_display("GP0", ActionKind::Combo, &binding.display_value()).unwrap(),
        *binding
    );
}
