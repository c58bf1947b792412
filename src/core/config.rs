//! Configuration management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where local documents live
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding config.json, presets/ and hotkeys.toml.
    /// Empty means the platform data directory.
    #[serde(default)]
    pub data_dir: String,
}

/// Removable-drive device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Fixed mount point of the device drive; empty = auto-discover
    #[serde(default)]
    pub mount_point: String,
    /// Volume label the firmware mounts as
    #[serde(default = "default_volume_label")]
    pub volume_label: String,
    /// Name of the configuration document on the drive
    #[serde(default = "default_config_filename")]
    pub config_filename: String,
    /// Text identifying the firmware in boot_out.txt
    #[serde(default = "default_boot_marker")]
    pub boot_marker: String,
}

fn default_volume_label() -> String {
    "CIRCUITPY".to_string()
}
fn default_config_filename() -> String {
    "config.json".to_string()
}
fn default_boot_marker() -> String {
    "Adafruit CircuitPython".to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            mount_point: String::new(),
            volume_label: default_volume_label(),
            config_filename: default_config_filename(),
            boot_marker: default_boot_marker(),
        }
    }
}

/// Device serial log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Whether to read the device log at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Serial device path (USB CDC port of the pedal)
    #[serde(default = "default_serial_port")]
    pub port: String,
    /// Line rate requested when opening the port
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Upper bound on a single blocking read, in milliseconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,
    /// How often the event loop drains the line queue, in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_true() -> bool {
    true
}
fn default_serial_port() -> String {
    if cfg!(target_os = "windows") {
        "COM3".to_string()
    } else {
        "/dev/ttyACM0".to_string()
    }
}
fn default_baud_rate() -> u32 {
    115_200
}
fn default_read_timeout() -> u64 {
    1000
}
fn default_poll_interval() -> u64 {
    100
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            read_timeout_ms: default_read_timeout(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

/// Global hotkey configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotkeyConfig {
    /// Whether preset hotkeys are registered with the OS
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Keep-alive loop wake interval in milliseconds
    #[serde(default = "default_keepalive")]
    pub keepalive_ms: u64,
    /// Upper bound on waiting for the listener thread at shutdown
    #[serde(default = "default_stop_timeout")]
    pub stop_timeout_ms: u64,
}

fn default_keepalive() -> u64 {
    200
}
fn default_stop_timeout() -> u64 {
    500
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            keepalive_ms: default_keepalive(),
            stop_timeout_ms: default_stop_timeout(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub hotkeys: HotkeyConfig,
}

impl AppConfig {
    /// Load configuration from the platform config file
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`; a missing file yields the embedded
    /// defaults. Never writes.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = if path.exists() {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?
        } else {
            Self::default_config_str().to_string()
        };
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory for config.json, presets and hotkeys
    pub fn data_dir(&self) -> Result<PathBuf> {
        if !self.storage.data_dir.trim().is_empty() {
            return Ok(PathBuf::from(self.storage.data_dir.trim()));
        }
        Ok(project_dirs()?.data_dir().to_path_buf())
    }

    pub fn active_config_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("config.json"))
    }

    pub fn presets_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("presets"))
    }

    pub fn hotkeys_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("hotkeys.toml"))
    }

    /// Get the default configuration embedded in the binary
    pub fn default_config_str() -> &'static str {
        include_str!("../../config/default.toml")
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "pedaldeck", "PedalDeck").context("Failed to determine config directory")
}
