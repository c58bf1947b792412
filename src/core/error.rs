//! Error types shared by the configurator core

use std::path::PathBuf;
use thiserror::Error;

/// How loudly a failure should be surfaced to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational - nothing went wrong
    Info,
    /// Recoverable - local state is intact (e.g. device push failed)
    Warning,
    /// The requested operation did not happen
    Error,
}

/// Errors produced by the configurator core
#[derive(Debug, Error)]
pub enum PedalError {
    /// A preset, document or device is absent
    #[error("{what} not found: {name}")]
    NotFound { what: &'static str, name: String },

    /// Disk or transport failure
    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted document exists but cannot be parsed
    #[error("corrupt document {}: {message}", path.display())]
    Corrupt { path: PathBuf, message: String },

    /// Two hotkeys share the same trigger
    #[error("the shortcut '{trigger}' is used more than once")]
    DuplicateBinding { trigger: String },

    /// Malformed combo string, preset name or pin edit
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// One or more hotkey hooks failed to register
    #[error("failed to install {} hotkey(s): {}", failed.len(), failed.join(", "))]
    PartialInstallFailure { failed: Vec<String> },
}

impl PedalError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn not_found(what: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            name: name.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::NotFound { .. } => Severity::Error,
            Self::Io { .. } => Severity::Error,
            Self::Corrupt { .. } => Severity::Error,
            Self::DuplicateBinding { .. } => Severity::Warning,
            Self::InvalidInput(_) => Severity::Warning,
            Self::PartialInstallFailure { .. } => Severity::Warning,
        }
    }

    /// Short line suitable for a status bar or log pane
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { what, name } => format!("No {} '{}' was found", what, name),
            Self::Io { source, .. } => format!("Could not read or write file: {}", source),
            Self::Corrupt { path, .. } => format!("File {} is damaged", path.display()),
            Self::DuplicateBinding { trigger } => {
                format!("The shortcut '{}' is used more than once", trigger)
            }
            Self::InvalidInput(msg) => msg.clone(),
            Self::PartialInstallFailure { failed } => {
                format!("Some hotkeys are inactive: {}", failed.join(", "))
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PedalError>;
