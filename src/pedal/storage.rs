//! Local persistence for the active configuration and presets
//!
//! All writes go through [`write_atomic`]: the document is written to a
//! temporary file in the target directory, flushed to disk, then renamed over
//! the destination, so a crash mid-write leaves the previous document intact.

use super::binding::PedalConfig;
use crate::core::error::{PedalError, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Preset identifier (its file stem)
pub type PresetId = String;

const PRESET_EXTENSION: &str = "json";

/// Named configurations saved by the operator
pub trait PresetStore {
    /// Preset names, sorted
    fn list(&self) -> Result<Vec<PresetId>>;
    fn load(&self, id: &str) -> Result<PedalConfig>;
    fn save(&self, id: &str, config: &PedalConfig) -> Result<()>;
    /// Deleting a missing preset is not an error
    fn delete(&self, id: &str) -> Result<()>;
}

/// The single active configuration kept on this machine
pub trait ConfigStore {
    fn load(&self) -> Result<PedalConfig>;
    fn save(&self, config: &PedalConfig) -> Result<()>;
}

/// Write `contents` to `path` via temp file + rename
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| PedalError::io(parent, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| PedalError::io(parent, e))?;
    tmp.write_all(contents).map_err(|e| PedalError::io(path, e))?;
    tmp.as_file().sync_all().map_err(|e| PedalError::io(path, e))?;
    tmp.persist(path).map_err(|e| PedalError::io(path, e.error))?;

    debug!("Wrote {} bytes to {:?}", contents.len(), path);
    Ok(())
}

/// Serialize as JSON indented with four spaces, the layout the firmware ships with
pub fn to_pretty_json<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Read a `[pin, kind, value]` document
pub fn read_config(path: &Path) -> Result<PedalConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PedalError::not_found("file", path.display().to_string())
        } else {
            PedalError::io(path, e)
        }
    })?;
    serde_json::from_str(&content).map_err(|e| PedalError::Corrupt {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Atomically write a `[pin, kind, value]` document
pub fn write_config(path: &Path, config: &PedalConfig) -> Result<()> {
    let bytes = to_pretty_json(config).map_err(|e| PedalError::Corrupt {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    write_atomic(path, &bytes)
}

/// Reject names that would escape the preset directory
pub fn validate_preset_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(PedalError::invalid("preset name must not be empty"));
    }
    if trimmed.starts_with('.') || trimmed.contains(['/', '\\', ':']) {
        return Err(PedalError::invalid(format!(
            "'{}' is not a valid preset name",
            trimmed
        )));
    }
    Ok(trimmed)
}

/// `config.json` in the data directory
#[derive(Debug, Clone)]
pub struct LocalConfigFile {
    path: PathBuf,
}

impl LocalConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for LocalConfigFile {
    /// Missing file yields the built-in default
    fn load(&self) -> Result<PedalConfig> {
        if !self.path.exists() {
            info!("No local config at {:?}, using defaults", self.path);
            return Ok(PedalConfig::default());
        }
        read_config(&self.path)
    }

    fn save(&self, config: &PedalConfig) -> Result<()> {
        write_config(&self.path, config)
    }
}

/// One `<name>.json` per preset
#[derive(Debug, Clone)]
pub struct PresetDirectory {
    dir: PathBuf,
}

impl PresetDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn preset_path(&self, id: &str) -> Result<PathBuf> {
        let name = validate_preset_name(id)?;
        Ok(self.dir.join(format!("{}.{}", name, PRESET_EXTENSION)))
    }
}

impl PresetStore for PresetDirectory {
    fn list(&self) -> Result<Vec<PresetId>> {
        fs::create_dir_all(&self.dir).map_err(|e| PedalError::io(&self.dir, e))?;
        let entries = fs::read_dir(&self.dir).map_err(|e| PedalError::io(&self.dir, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| PedalError::io(&self.dir, e))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(PRESET_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn load(&self, id: &str) -> Result<PedalConfig> {
        let path = self.preset_path(id)?;
        if !path.exists() {
            return Err(PedalError::not_found("preset", id.trim()));
        }
        read_config(&path)
    }

    fn save(&self, id: &str, config: &PedalConfig) -> Result<()> {
        let path = self.preset_path(id)?;
        write_config(&path, config)?;
        info!("Saved preset '{}' to {:?}", id.trim(), path);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let path = self.preset_path(id)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted preset '{}'", id.trim());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PedalError::io(path, e)),
        }
    }
}
