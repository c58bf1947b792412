//! Persisted hotkey -> preset mapping
//!
//! The registry is a plain store. Duplicate detection and trigger
//! normalization happen at the editing boundary in [`validate_bindings`]
//! before `save` is called; `save` persists whatever mapping it is given.

use super::combo::{normalize_trigger, parse_hotkey};
use crate::core::error::{PedalError, Result};
use crate::pedal::storage::write_atomic;
use crate::pedal::PresetId;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Normalized trigger -> preset name
pub type HotkeyMap = BTreeMap<String, PresetId>;

/// Turn editor rows `(trigger, preset)` into a mapping ready for `save`.
///
/// Empty triggers are skipped; triggers are normalized; a trigger that appears
/// twice rejects the whole set, as does one that names the same key
/// combination as an earlier row (`ctrl+return` and `control+enter`).
/// Triggers that do not parse are kept and reported when hooks are installed.
pub fn validate_bindings<I, T, P>(rows: I) -> Result<HotkeyMap>
where
    I: IntoIterator<Item = (T, P)>,
    T: AsRef<str>,
    P: AsRef<str>,
{
    let mut map = HotkeyMap::new();
    let mut seen = HashSet::new();
    let mut combos: HashMap<u32, String> = HashMap::new();

    for (trigger, preset) in rows {
        let trigger = normalize_trigger(trigger.as_ref());
        if trigger.is_empty() {
            debug!("Skipped empty hotkey entry");
            continue;
        }
        if !seen.insert(trigger.clone()) {
            return Err(PedalError::DuplicateBinding { trigger });
        }
        if let Ok(hotkey) = parse_hotkey(&trigger) {
            if let Some(earlier) = combos.insert(hotkey.id(), trigger.clone()) {
                debug!("Hotkey '{}' repeats '{}'", trigger, earlier);
                return Err(PedalError::DuplicateBinding { trigger });
            }
        }
        map.insert(trigger, preset.as_ref().trim().to_string());
    }

    Ok(map)
}

/// Store for the hotkey mapping, with an immutable in-memory snapshot
#[derive(Debug)]
pub struct HotkeyRegistry {
    path: PathBuf,
    snapshot: Arc<HotkeyMap>,
}

impl HotkeyRegistry {
    /// Open the registry at `path`, loading whatever is persisted there
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut registry = Self {
            path: path.into(),
            snapshot: Arc::new(HotkeyMap::new()),
        };
        registry.snapshot = Arc::new(registry.load()?);
        Ok(registry)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted mapping. A missing file is an empty mapping.
    pub fn load(&self) -> Result<HotkeyMap> {
        if !self.path.exists() {
            return Ok(HotkeyMap::new());
        }
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| PedalError::io(&self.path, e))?;
        toml::from_str(&content).map_err(|e| PedalError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Re-read the file into the snapshot
    pub fn reload(&mut self) -> Result<Arc<HotkeyMap>> {
        self.snapshot = Arc::new(self.load()?);
        Ok(self.snapshot())
    }

    /// Persist `map` atomically, then publish it as the new snapshot.
    ///
    /// On failure the snapshot is left untouched.
    pub fn save(&mut self, map: HotkeyMap) -> Result<()> {
        let content = toml::to_string_pretty(&map).map_err(|e| PedalError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        write_atomic(&self.path, content.as_bytes())?;
        info!("Saved {} hotkey(s) to {:?}", map.len(), self.path);
        self.snapshot = Arc::new(map);
        Ok(())
    }

    /// Current mapping; cheap to clone and safe to hand to other threads
    pub fn snapshot(&self) -> Arc<HotkeyMap> {
        Arc::clone(&self.snapshot)
    }
}
