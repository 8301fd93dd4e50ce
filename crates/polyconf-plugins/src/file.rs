//! FilePlugin: configuration files named after the application
//!
//! For an application `widget`, every search directory is checked for
//! `widget.toml`, `widget.yaml`, `widget.yml` and `widget.json`. All files
//! found are deep-merged in search order, so later directories override
//! earlier ones.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use polyconf_core::merge::deep_merge;
use polyconf_core::{Context, LayerValues, Plugin, PluginError};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Default name of the file plugin.
pub const FILE_PLUGIN: &str = "file";

/// Recognised extensions, in lookup order.
const EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Yaml,
    Json,
}

impl Format {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(Format::Toml),
            "yaml" | "yml" => Some(Format::Yaml),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

/// Reads `<app_name>.{toml,yaml,yml,json}` from a list of directories.
#[derive(Debug, Clone)]
pub struct FilePlugin {
    search_dirs: Vec<PathBuf>,
}

impl FilePlugin {
    /// Search `<config_dir>/<app_name>/` (resolved per context), then the
    /// current working directory.
    pub fn new() -> Self {
        Self {
            search_dirs: Vec::new(),
        }
    }

    /// Search exactly `dirs`, in order.
    pub fn with_search_dirs(dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs: dirs }
    }

    fn search_dirs_for(&self, app_name: &str) -> Vec<PathBuf> {
        if !self.search_dirs.is_empty() {
            return self.search_dirs.clone();
        }
        let mut search = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            search.push(config_dir.join(app_name));
        }
        if let Ok(cwd) = std::env::current_dir() {
            search.push(cwd);
        }
        search
    }

    /// Candidate files for `app_name` that exist, in precedence order.
    pub async fn candidates(&self, app_name: &str) -> Vec<PathBuf> {
        let mut found = Vec::new();
        for dir in self.search_dirs_for(app_name) {
            for ext in EXTENSIONS {
                let path = dir.join(format!("{app_name}.{ext}"));
                let is_file = tokio::fs::metadata(&path)
                    .await
                    .is_ok_and(|meta| meta.is_file());
                if is_file {
                    found.push(path);
                }
            }
        }
        found
    }

    async fn load(&self, app_name: &str) -> Result<LayerValues> {
        let found = self.candidates(app_name).await;
        if found.is_empty() {
            let searched = self
                .search_dirs_for(app_name)
                .iter()
                .map(|dir| dir.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(Error::NoConfigFile {
                app_name: app_name.to_string(),
                searched,
            });
        }

        let mut merged = Map::new();
        for path in found {
            tracing::debug!(?path, "Loading configuration file");
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| Error::Read {
                    path: path.clone(),
                    source,
                })?;
            let map = parse_file(&path, &content)?;
            deep_merge(&mut merged, &map);
        }
        Ok(LayerValues::from(merged))
    }
}

impl Default for FilePlugin {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `content` according to the extension of `path`.
pub fn parse_file(path: &Path, content: &str) -> Result<Map<String, Value>> {
    let parse_err = |message: String| Error::Parse {
        path: path.to_path_buf(),
        message,
    };

    let value: Value = match Format::from_path(path) {
        Some(Format::Toml) => {
            let table: toml::Table =
                toml::from_str(content).map_err(|e| parse_err(e.to_string()))?;
            toml_to_json(toml::Value::Table(table))
        }
        // An empty or comment-only document is an empty mapping.
        Some(Format::Yaml) if content.trim().is_empty() => Value::Object(Map::new()),
        Some(Format::Yaml) => match serde_yaml::from_str(content) {
            Ok(Value::Null) => Value::Object(Map::new()),
            Ok(value) => value,
            Err(e) => return Err(parse_err(e.to_string())),
        },
        Some(Format::Json) => {
            serde_json::from_str(content).map_err(|e| parse_err(e.to_string()))?
        }
        None => return Err(parse_err("unsupported file extension".to_string())),
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::NotAMapping {
            path: path.to_path_buf(),
        }),
    }
}

/// TOML datetimes become strings; non-finite floats become null.
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}

#[async_trait]
impl Plugin for FilePlugin {
    fn name(&self) -> &str {
        FILE_PLUGIN
    }

    fn priority(&self) -> i32 {
        10
    }

    async fn apply(&self, context: &Context) -> std::result::Result<LayerValues, PluginError> {
        Ok(self.load(context.app_name()).await?)
    }
}
