//! Hotkey table edits: validate, persist, then rebind

use crate::core::error::Result;
use crate::hotkey::{validate_bindings, GlobalHotkeyListener, HotkeyBackend, HotkeyRegistry};
use tracing::info;

/// Replace the hotkey table with editor `rows` of `(trigger, preset)`.
///
/// Duplicates are rejected before anything is written. Once saved, the
/// listener is reloaded from the new snapshot; a `PartialInstallFailure`
/// from that reload means the table was saved but some hotkeys are inactive.
pub fn update_hotkeys<B, I, T, P>(
    registry: &mut HotkeyRegistry,
    listener: &mut GlobalHotkeyListener<B>,
    rows: I,
) -> Result<()>
where
    B: HotkeyBackend,
    I: IntoIterator<Item = (T, P)>,
    T: AsRef<str>,
    P: AsRef<str>,
{
    let map = validate_bindings(rows)?;
    let count = map.len();
    registry.save(map)?;
    info!("Hotkey table updated with {} binding(s)", count);
    listener.reload(registry.snapshot())
}
