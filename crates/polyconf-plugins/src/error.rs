//! Error types for polyconf-plugins

use std::path::PathBuf;

use polyconf_core::PluginError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No configuration file found for {app_name} (searched {searched})")]
    NoConfigFile { app_name: String, searched: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("{path} does not contain a mapping at the top level")]
    NotAMapping { path: PathBuf },

    #[error("Invalid variable {name}: {message}")]
    InvalidVariable { name: String, message: String },
}

impl From<Error> for PluginError {
    fn from(err: Error) -> Self {
        PluginError::execution(err.to_string())
    }
}
