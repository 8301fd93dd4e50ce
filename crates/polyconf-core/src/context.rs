//! Per-resolution accumulator

use serde_json::Value;

use crate::key_path::KeyPath;
use crate::layer::{Layer, LayerValues};
use crate::merge::MergedTree;
use crate::result::{Provenance, RawResult, ResolvedResult};
use crate::status::{Status, StatusTracker};
use crate::Result;

/// Everything one resolution reads and accumulates.
///
/// Built with [`Context::builder`]. Plugins only ever see `&Context`; the
/// pipeline executor is the only writer.
#[derive(Debug, Clone)]
pub struct Context {
    app_name: String,
    app_prefix: String,
    given: LayerValues,
    layers: Vec<Layer>,
    status: Status,
    tracker: StatusTracker,
    /// Ok layers folded in order, without the overrides
    layered: MergedTree,
    result: ResolvedResult,
}

impl Context {
    /// Start building a context for `app_name`.
    ///
    /// ```
    /// use polyconf_core::{Context, Status};
    /// use serde_json::json;
    ///
    /// let context = Context::builder("widget")
    ///     .app_prefix("WIDGET")
    ///     .given("timeout", json!(99))
    ///     .unwrap()
    ///     .build();
    ///
    /// assert_eq!(context.status(), Status::Init);
    /// assert_eq!(context.result().as_native_value(), json!({"timeout": 99}));
    /// ```
    pub fn builder(app_name: impl Into<String>) -> ContextBuilder {
        ContextBuilder {
            app_name: app_name.into(),
            app_prefix: String::new(),
            given: LayerValues::new(),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn app_prefix(&self) -> &str {
        &self.app_prefix
    }

    pub fn given(&self) -> &LayerValues {
        &self.given
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn result(&self) -> &ResolvedResult {
        &self.result
    }

    /// Provenance view of the current result.
    pub fn raw(&self) -> RawResult {
        self.result.raw(&self.layers, self.status)
    }

    /// Layer appended by `source`, if any.
    pub fn layer(&self, source: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.source() == source)
    }

    pub(crate) fn begin(&mut self) {
        if self.status == Status::Init {
            self.status = Status::Running;
        }
    }

    /// Append a layer and fold its values into the running result.
    ///
    /// Only the new layer's keys are folded into the layer tree; the
    /// overrides are then applied last, on a copy, so they keep winning and
    /// their keys keep the position a full fold would give them.
    pub(crate) fn append_layer(&mut self, layer: Layer) {
        self.tracker.observe(layer.outcome());
        if layer.outcome().is_ok() {
            let origin = Provenance::Layer {
                source: layer.source().to_string(),
                rank: self.layers.len(),
            };
            self.layered.fold(layer.values().as_map(), &origin);
            self.result = with_given(&self.layered, &self.given);
        }
        self.layers.push(layer);
    }

    /// Abort with a fatal failure. `Failed` is sticky from here on.
    pub(crate) fn fail(&mut self) {
        self.tracker.mark_fatal();
        self.status = Status::Failed;
    }

    /// Settle the terminal status once the pipeline has finished.
    pub(crate) fn finalize(&mut self) {
        self.status = self.tracker.terminal();
    }

    /// Fold every layer from scratch, then the overrides.
    ///
    /// The incremental path in [`append_layer`](Self::append_layer) must
    /// always agree with this.
    pub fn recompute(&self) -> ResolvedResult {
        let mut tree = MergedTree::new();
        for (rank, layer) in self.layers.iter().enumerate() {
            if layer.outcome().is_ok() {
                tree.fold(
                    layer.values().as_map(),
                    &Provenance::Layer {
                        source: layer.source().to_string(),
                        rank,
                    },
                );
            }
        }
        tree.fold(self.given.as_map(), &Provenance::Given);
        ResolvedResult::from_tree(tree)
    }
}

fn with_given(layered: &MergedTree, given: &LayerValues) -> ResolvedResult {
    let mut tree = layered.clone();
    tree.fold(given.as_map(), &Provenance::Given);
    ResolvedResult::from_tree(tree)
}

/// Builder for [`Context`]
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    app_name: String,
    app_prefix: String,
    given: LayerValues,
}

impl ContextBuilder {
    /// Namespacing hint for environment and secret style plugins.
    pub fn app_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.app_prefix = prefix.into();
        self
    }

    /// Add an explicit override. Later overrides of the same path win.
    pub fn given(mut self, path: &str, value: Value) -> Result<Self> {
        let path = KeyPath::parse(path)?;
        self.given.insert(&path, value);
        Ok(self)
    }

    /// Add several overrides at once.
    pub fn given_all<I, K>(mut self, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        for (path, value) in pairs {
            let path = KeyPath::parse(path.as_ref())?;
            self.given.insert(&path, value);
        }
        Ok(self)
    }

    pub fn build(self) -> Context {
        let layered = MergedTree::new();
        let result = with_given(&layered, &self.given);
        Context {
            app_name: self.app_name,
            app_prefix: self.app_prefix,
            given: self.given,
            layers: Vec::new(),
            status: Status::Init,
            tracker: StatusTracker::default(),
            layered,
            result,
        }
    }
}
