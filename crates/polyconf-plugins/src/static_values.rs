//! StaticPlugin: a fixed mapping, typically application defaults

use async_trait::async_trait;
use polyconf_core::{Context, LayerValues, Plugin, PluginError};
use serde_json::Value;

/// Default name of the defaults plugin.
pub const DEFAULTS_PLUGIN: &str = "defaults";

/// Contributes the same values on every resolution.
///
/// Runs first by default so every other source overrides it.
#[derive(Debug, Clone)]
pub struct StaticPlugin {
    name: String,
    priority: i32,
    values: LayerValues,
}

impl StaticPlugin {
    pub fn new(name: impl Into<String>, values: LayerValues) -> Self {
        Self {
            name: name.into(),
            priority: -100,
            values,
        }
    }

    /// A `defaults` plugin with the given values.
    pub fn defaults(values: LayerValues) -> Self {
        Self::new(DEFAULTS_PLUGIN, values)
    }

    /// Build from dotted key-path pairs.
    pub fn from_flat<I, K>(name: impl Into<String>, pairs: I) -> polyconf_core::Result<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        Ok(Self::new(name, LayerValues::from_flat(pairs)?))
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

#[async_trait]
impl Plugin for StaticPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn apply(&self, _context: &Context) -> Result<LayerValues, PluginError> {
        Ok(self.values.clone())
    }
}
