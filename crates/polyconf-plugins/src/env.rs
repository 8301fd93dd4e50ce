//! EnvPlugin: environment variables under the application prefix
//!
//! With prefix `WIDGET`, `WIDGET_TIMEOUT=30` becomes `timeout = 30` and
//! `WIDGET_DB__HOST=prod` becomes `db.host = "prod"`. Values are read as
//! JSON when they parse as JSON, as plain strings otherwise.

use async_trait::async_trait;
use polyconf_core::{Context, KeyPath, LayerValues, Plugin, PluginError};
use serde_json::Value;

use crate::error::{Error, Result};

/// Default name of the environment plugin.
pub const ENV_PLUGIN: &str = "env";

/// Separator between nesting levels in variable names.
const NESTING: &str = "__";

/// Where variables come from
#[derive(Debug, Clone)]
enum VarSource {
    Process,
    Fixed(Vec<(String, String)>),
}

/// Reads `<APP_PREFIX>_*` variables.
///
/// Only applicable when the context carries a non-empty `app_prefix`.
#[derive(Debug, Clone)]
pub struct EnvPlugin {
    source: VarSource,
}

impl EnvPlugin {
    /// Read from the process environment.
    pub fn new() -> Self {
        Self {
            source: VarSource::Process,
        }
    }

    /// Read from a fixed set of variables instead of the process environment.
    pub fn with_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            source: VarSource::Fixed(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn vars(&self) -> Vec<(String, String)> {
        match &self.source {
            // Non-UTF-8 variables cannot name configuration keys.
            VarSource::Process => std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
            VarSource::Fixed(vars) => vars.clone(),
        }
    }

    /// Collect every variable under `prefix` into layer values.
    pub fn collect(&self, prefix: &str) -> Result<LayerValues> {
        let marker = format!("{}_", prefix.to_uppercase());
        let mut matched: Vec<(String, String)> = self
            .vars()
            .into_iter()
            .filter(|(name, _)| {
                name.get(..marker.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(&marker))
            })
            .collect();
        // Sort for a stable outcome when two spellings map to one key.
        matched.sort();

        let mut values = LayerValues::new();
        for (name, raw) in matched {
            let path = key_path_for(&name[marker.len()..]).map_err(|message| {
                Error::InvalidVariable {
                    name: name.clone(),
                    message,
                }
            })?;
            tracing::trace!(variable = %name, %path, "Mapped environment variable");
            values.insert(&path, parse_value(&raw));
        }
        Ok(values)
    }
}

impl Default for EnvPlugin {
    fn default() -> Self {
        Self::new()
    }
}

fn key_path_for(rest: &str) -> std::result::Result<KeyPath, String> {
    let segments: Vec<String> = rest
        .split(NESTING)
        .map(|segment| segment.to_lowercase())
        .collect();
    KeyPath::from_segments(segments).map_err(|_| format!("cannot map {rest:?} to a key path"))
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[async_trait]
impl Plugin for EnvPlugin {
    fn name(&self) -> &str {
        ENV_PLUGIN
    }

    fn priority(&self) -> i32 {
        20
    }

    fn applicable(&self, context: &Context) -> bool {
        !context.app_prefix().is_empty()
    }

    async fn apply(&self, context: &Context) -> std::result::Result<LayerValues, PluginError> {
        Ok(self.collect(context.app_prefix())?)
    }
}
