//! Resolved result and its read-only views
//!
//! Three projections of the same merged tree, none derived from another:
//!
//! - [`ResolvedResult::as_native_value`]: plain value, merge insertion order
//! - [`ResolvedResult::serialize`]: canonical text, keys sorted at every level
//! - [`ResolvedResult::raw`]: per-path provenance and per-layer outcomes

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::key_path::KeyPath;
use crate::layer::{Layer, Outcome};
use crate::merge::MergedTree;
use crate::status::Status;

/// Source name reported for values supplied by explicit overrides.
pub const GIVEN_SOURCE: &str = "given";

/// Where the winning value of a key-path came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "lowercase")]
pub enum Provenance {
    /// A plugin layer, by pipeline position
    Layer { source: String, rank: usize },
    /// The caller's explicit override
    Given,
}

impl Provenance {
    pub fn source(&self) -> &str {
        match self {
            Provenance::Layer { source, .. } => source,
            Provenance::Given => GIVEN_SOURCE,
        }
    }

    /// Precedence rank; overrides rank one above the last layer.
    pub fn rank(&self, layer_count: usize) -> usize {
        match self {
            Provenance::Layer { rank, .. } => *rank,
            Provenance::Given => layer_count,
        }
    }
}

/// The merged configuration of one resolution.
///
/// Only ever updated by the owning [`Context`](crate::Context).
#[derive(Debug, Clone, Default)]
pub struct ResolvedResult {
    tree: MergedTree,
}

impl ResolvedResult {
    pub(crate) fn from_tree(tree: MergedTree) -> Self {
        Self { tree }
    }

    /// Plain nested value without provenance.
    pub fn as_native_value(&self) -> Value {
        Value::Object(self.tree.values().clone())
    }

    /// Canonical text form: pretty JSON, keys sorted at every nesting
    /// level, trailing newline.
    pub fn serialize(&self) -> String {
        let sorted = sort_keys(&Value::Object(self.tree.values().clone()));
        let mut text = serde_json::to_string_pretty(&sorted)
            .unwrap_or_else(|_| String::from("{}"));
        text.push('\n');
        text
    }

    /// Provenance-annotated view.
    ///
    /// `layers` and `status` come from the owning context, since layer
    /// outcomes are part of the "why" of a result.
    pub fn raw(&self, layers: &[Layer], status: Status) -> RawResult {
        let layer_count = layers.len();
        let values = self
            .tree
            .provenance()
            .iter()
            .filter_map(|(path, provenance)| {
                let value = crate::layer::lookup(self.tree.values(), path)?;
                Some((
                    path.to_string(),
                    RawValue {
                        value: value.clone(),
                        source: provenance.source().to_string(),
                        rank: provenance.rank(layer_count),
                    },
                ))
            })
            .collect();

        RawResult {
            status,
            layers: layers
                .iter()
                .enumerate()
                .map(|(rank, layer)| LayerReport {
                    source: layer.source().to_string(),
                    rank,
                    outcome: layer.outcome().clone(),
                })
                .collect(),
            values,
        }
    }

    /// Value at `path`, if present.
    pub fn get(&self, path: &KeyPath) -> Option<&Value> {
        crate::layer::lookup(self.tree.values(), path)
    }

    /// Provenance of `path`, or of every leaf beneath it.
    pub fn explain(&self, path: &KeyPath) -> Vec<(KeyPath, Provenance)> {
        self.tree
            .provenance()
            .range(path.clone()..)
            .take_while(|(candidate, _)| candidate.starts_with(path))
            .map(|(candidate, provenance)| (candidate.clone(), provenance.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.values().is_empty()
    }
}

/// One leaf of the raw view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawValue {
    pub value: Value,
    pub source: String,
    pub rank: usize,
}

/// A layer as reported in the raw view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerReport {
    pub source: String,
    pub rank: usize,
    pub outcome: Outcome,
}

/// Full provenance dump of a resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    pub status: Status,
    pub layers: Vec<LayerReport>,
    /// Leaf key-paths in sorted order
    pub values: BTreeMap<String, RawValue>,
}

impl RawResult {
    pub fn layer(&self, source: &str) -> Option<&LayerReport> {
        self.layers.iter().find(|layer| layer.source == source)
    }
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), sort_keys(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
