//! Resolver settings
//!
//! Loaded from a small TOML file; every key is optional. Callers without a
//! settings file use [`Settings::default`].
//!
//! ```toml
//! plugin_timeout_ms = 2000
//! default_select = ["defaults", "file"]
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::registry::ALL_PLUGINS;
use crate::{Error, Result};

fn default_plugin_timeout_ms() -> u64 {
    5_000
}

fn default_select() -> Vec<String> {
    vec![ALL_PLUGINS.to_string()]
}

/// Tuning knobs for a resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Upper bound for a single plugin's `apply`, in milliseconds
    #[serde(default = "default_plugin_timeout_ms")]
    pub plugin_timeout_ms: u64,

    /// Selection patterns used when the caller gives none
    #[serde(default = "default_select")]
    pub default_select: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            plugin_timeout_ms: default_plugin_timeout_ms(),
            default_select: default_select(),
        }
    }
}

impl Settings {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from `path`.
    ///
    /// The file must exist; a missing, unreadable or malformed file is an
    /// error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::SettingsNotFound {
                path: path.to_path_buf(),
            });
        }
        tracing::debug!(?path, "Loading settings");
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn plugin_timeout(&self) -> Duration {
        Duration::from_millis(self.plugin_timeout_ms)
    }

    pub fn with_plugin_timeout(mut self, timeout: Duration) -> Self {
        self.plugin_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.plugin_timeout(), Duration::from_secs(5));
        assert_eq!(settings.default_select, vec!["ALL"]);
    }

    #[test]
    fn test_parse_overrides() {
        let settings = Settings::parse(
            r#"
plugin_timeout_ms = 250
default_select = ["file", "env"]
"#,
        )
        .unwrap();
        assert_eq!(settings.plugin_timeout(), Duration::from_millis(250));
        assert_eq!(settings.default_select, vec!["file", "env"]);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(Settings::parse("plugin_timeout = 3").is_err());
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("polyconf.toml");
        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, Error::SettingsNotFound { path: ref missing } if *missing == path));
    }

    #[test]
    fn test_load_directory_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(Settings::load(temp.path()).is_err());
    }

    #[test]
    fn test_load_reads_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("polyconf.toml");
        std::fs::write(&path, "plugin_timeout_ms = 42\n").unwrap();
        assert_eq!(Settings::load(&path).unwrap().plugin_timeout_ms, 42);
    }
}
