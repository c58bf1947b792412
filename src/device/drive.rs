//! Removable-drive transport
//!
//! The pedal firmware mounts as a small USB drive and reads its action table
//! from `config.json` in the drive root. Pushing a configuration is an atomic
//! file replace on that drive; pulling is a plain read.

use crate::core::config::DeviceConfig;
use crate::core::error::{PedalError, Result};
use crate::pedal::storage::{read_config, write_config};
use crate::pedal::PedalConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File the firmware writes at boot
const BOOT_INFO_FILE: &str = "boot_out.txt";

/// Transport moving configurations to and from the device
pub trait DeviceTransport {
    /// Write `config` to the device, returning where it was written
    fn push(&self, config: &PedalConfig) -> Result<PathBuf>;
    /// Read the configuration currently on the device
    fn pull(&self) -> Result<PedalConfig>;
}

/// The CircuitPython drive of the pedal
#[derive(Debug, Clone)]
pub struct CircuitPyDrive {
    config: DeviceConfig,
    /// Overrides the platform mount locations when set
    search_roots: Option<Vec<PathBuf>>,
}

impl CircuitPyDrive {
    pub fn new(config: DeviceConfig) -> Self {
        Self {
            config,
            search_roots: None,
        }
    }

    /// Search only the given directories for the drive
    pub fn with_search_roots(config: DeviceConfig, roots: Vec<PathBuf>) -> Self {
        Self {
            config,
            search_roots: Some(roots),
        }
    }

    /// Mount point of the connected drive, if any
    pub fn find_drive(&self) -> Option<PathBuf> {
        if !self.config.mount_point.is_empty() {
            let fixed = PathBuf::from(&self.config.mount_point);
            return fixed.is_dir().then_some(fixed);
        }

        let roots = match &self.search_roots {
            Some(roots) => roots.clone(),
            None => candidate_roots(),
        };
        let found = roots.into_iter().find(|root| self.is_device_root(root));
        match &found {
            Some(root) => debug!("Found device drive at {:?}", root),
            None => debug!("No {} drive mounted", self.config.volume_label),
        }
        found
    }

    fn is_device_root(&self, root: &Path) -> bool {
        if !root.is_dir() {
            return false;
        }

        let label = &self.config.volume_label;
        if !label.is_empty() && root.to_string_lossy().contains(label.as_str()) {
            return true;
        }

        match fs::read(root.join(BOOT_INFO_FILE)) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).contains(self.config.boot_marker.as_str()),
            Err(_) => false,
        }
    }

    fn config_path(&self) -> Result<PathBuf> {
        self.find_drive()
            .map(|root| root.join(&self.config.config_filename))
            .ok_or_else(|| PedalError::not_found("device drive", self.config.volume_label.clone()))
    }
}

impl DeviceTransport for CircuitPyDrive {
    fn push(&self, config: &PedalConfig) -> Result<PathBuf> {
        let path = self.config_path()?;
        write_config(&path, config)?;
        info!("Pushed {} pin binding(s) to {:?}", config.len(), path);
        Ok(path)
    }

    fn pull(&self) -> Result<PedalConfig> {
        let path = self.config_path()?;
        if !path.exists() {
            return Err(PedalError::not_found(
                "file on device",
                self.config.config_filename.clone(),
            ));
        }
        let config = read_config(&path)?;
        info!("Pulled {} pin binding(s) from {:?}", config.len(), path);
        Ok(config)
    }
}

/// Directories where removable drives get mounted on this platform
#[cfg(target_os = "windows")]
fn candidate_roots() -> Vec<PathBuf> {
    // Skip A: and B:, probing empty floppy slots can stall
    (b'C'..=b'Z')
        .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
        .filter(|root| root.exists())
        .collect()
}

#[cfg(target_os = "macos")]
fn candidate_roots() -> Vec<PathBuf> {
    subdirectories(Path::new("/Volumes"))
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn candidate_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Ok(user) = std::env::var("USER") {
        roots.extend(subdirectories(&Path::new("/media").join(&user)));
        roots.extend(subdirectories(&Path::new("/run/media").join(&user)));
    }
    roots.extend(subdirectories(Path::new("/media")));
    roots.extend(subdirectories(Path::new("/mnt")));
    roots
}

#[cfg(not(target_os = "windows"))]
fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.is_dir())
                .collect()
        })
        .unwrap_or_default()
}
