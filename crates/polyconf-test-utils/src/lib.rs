//! Shared test fixtures for the polyconf workspace.
//!
//! This crate provides scripted plugins so core, plugin and CLI test
//! suites can drive the resolver without touching files or the
//! environment. It is a dev-dependency only, never published.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use polyconf_core::{Context, LayerValues, Plugin, PluginError, Registry, Settings};
use serde_json::Value;

/// What a [`FixturePlugin`] does when applied
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Contribute these values
    Values(LayerValues),
    /// Fail with this reason
    Fail(String),
    /// Sleep, then contribute the values
    Slow(Duration, LayerValues),
    /// Block the worker thread, then contribute the values
    Blocking(Duration, LayerValues),
}

/// A plugin whose behavior is fixed up front.
#[derive(Debug, Clone)]
pub struct FixturePlugin {
    name: String,
    priority: i32,
    fatal: bool,
    applicable: bool,
    behavior: Behavior,
}

impl FixturePlugin {
    fn new(name: &str, behavior: Behavior) -> Self {
        Self {
            name: name.to_string(),
            priority: 0,
            fatal: false,
            applicable: true,
            behavior,
        }
    }

    /// Contributes `values`, which must be a JSON object.
    pub fn values(name: &str, values: Value) -> Self {
        Self::new(name, Behavior::Values(to_layer(values)))
    }

    /// Fails with `reason`.
    pub fn failing(name: &str, reason: &str) -> Self {
        Self::new(name, Behavior::Fail(reason.to_string()))
    }

    /// Contributes `values` after `delay`.
    pub fn slow(name: &str, delay: Duration, values: Value) -> Self {
        Self::new(name, Behavior::Slow(delay, to_layer(values)))
    }

    /// Blocks its thread for `delay` without yielding, then contributes
    /// `values`.
    pub fn blocking(name: &str, delay: Duration, values: Value) -> Self {
        Self::new(name, Behavior::Blocking(delay, to_layer(values)))
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn fatal(mut self) -> Self {
        self.fatal = true;
        self
    }

    pub fn not_applicable(mut self) -> Self {
        self.applicable = false;
        self
    }

    pub fn into_arc(self) -> Arc<dyn Plugin> {
        Arc::new(self)
    }
}

fn to_layer(values: Value) -> LayerValues {
    LayerValues::try_from(values).unwrap_or_else(|other| {
        panic!("fixture values must be a JSON object, got {other}")
    })
}

#[async_trait]
impl Plugin for FixturePlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn applicable(&self, _context: &Context) -> bool {
        self.applicable
    }

    fn fatal(&self) -> bool {
        self.fatal
    }

    async fn apply(&self, _context: &Context) -> Result<LayerValues, PluginError> {
        match &self.behavior {
            Behavior::Values(values) => Ok(values.clone()),
            Behavior::Fail(reason) => Err(PluginError::execution(reason.clone())),
            Behavior::Slow(delay, values) => {
                tokio::time::sleep(*delay).await;
                Ok(values.clone())
            }
            Behavior::Blocking(delay, values) => {
                std::thread::sleep(*delay);
                Ok(values.clone())
            }
        }
    }
}

/// Records how many layers it saw when applied; contributes nothing.
#[derive(Debug, Default)]
pub struct RecordingPlugin {
    name: String,
    seen: Mutex<Vec<usize>>,
}

impl RecordingPlugin {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            seen: Mutex::new(Vec::new()),
        })
    }

    /// Layer counts observed, one entry per `apply`.
    pub fn seen(&self) -> Vec<usize> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Plugin for RecordingPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(&self, context: &Context) -> Result<LayerValues, PluginError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(context.layers().len());
        }
        Ok(LayerValues::new())
    }
}

/// Registry of the given fixtures, panicking on duplicate names.
pub fn registry_of(plugins: Vec<FixturePlugin>) -> Registry {
    Registry::with_plugins(plugins.into_iter().map(FixturePlugin::into_arc))
        .expect("fixture plugin names must be unique")
}

/// Settings with a short plugin timeout, for timeout tests.
pub fn fast_settings(timeout: Duration) -> Settings {
    Settings::default().with_plugin_timeout(timeout)
}
