//! Error types for polyconf-core

use std::path::PathBuf;
use std::time::Duration;

use crate::context::Context;

/// Result type for polyconf-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the resolution engine.
///
/// Discovery and selection errors are raised before any plugin runs.
/// Runtime failures of ordinary plugins never surface here: they are
/// recorded as layer outcomes instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two plugins declared the same name during one discovery pass
    #[error("Duplicate plugin name: {name}")]
    DuplicatePlugin { name: String },

    /// A selection pattern named a plugin that was never discovered
    #[error("Unknown plugin: {name}")]
    UnknownPlugin { name: String },

    /// A plugin declared fatal failed and aborted the pipeline
    ///
    /// The partially resolved context (status `Failed`) is carried along
    /// so callers can still inspect the layers recorded so far.
    #[error("Fatal plugin {plugin} failed: {reason}")]
    FatalPlugin {
        plugin: String,
        reason: String,
        context: Box<Context>,
    },

    /// A dotted key-path could not be parsed
    #[error("Invalid key path: {path:?}")]
    InvalidKeyPath { path: String },

    /// An explicitly named settings file does not exist
    #[error("Settings file not found: {}", path.display())]
    SettingsNotFound { path: PathBuf },

    /// Resolver settings could not be parsed
    #[error("Invalid settings: {0}")]
    Settings(#[from] toml::de::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The partial context of a fatal abort, if this is one.
    pub fn partial_context(&self) -> Option<&Context> {
        match self {
            Error::FatalPlugin { context, .. } => Some(context),
            _ => None,
        }
    }
}

/// Failure reported by a plugin's `apply`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluginError {
    /// The source could not produce values (missing file, parse error, ...)
    #[error("{reason}")]
    Execution { reason: String },

    /// The plugin did not finish within its time bound
    #[error("timed out after {}ms", after.as_millis())]
    Timeout { after: Duration },
}

impl PluginError {
    /// Create an execution error with the given reason
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::Execution {
            reason: reason.into(),
        }
    }
}
