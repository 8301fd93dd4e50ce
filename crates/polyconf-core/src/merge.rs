//! Layer merge engine
//!
//! Folding rules, applied per key-path:
//!
//! - both sides mappings: recurse key-by-key (deep merge)
//! - otherwise: the overlay replaces the base wholesale; sequences are
//!   never concatenated
//!
//! [`MergedTree`] applies these rules while tracking which origin
//! supplied every leaf. A leaf is a scalar, a sequence or an empty
//! mapping.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::key_path::KeyPath;
use crate::result::Provenance;

/// Deep merge `overlay` into `base`, overlay winning.
pub fn deep_merge(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, overlay_value) in overlay {
        match (base.get_mut(key), overlay_value) {
            (Some(Value::Object(base_map)), Value::Object(overlay_map)) => {
                deep_merge(base_map, overlay_map);
            }
            _ => {
                base.insert(key.clone(), overlay_value.clone());
            }
        }
    }
}

/// A merged value tree plus per-leaf provenance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedTree {
    values: Map<String, Value>,
    provenance: BTreeMap<KeyPath, Provenance>,
}

impl MergedTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `overlay` into the tree, attributing new leaves to `origin`.
    pub fn fold(&mut self, overlay: &Map<String, Value>, origin: &Provenance) {
        fold_map(
            &mut self.values,
            overlay,
            None,
            origin,
            &mut self.provenance,
        );
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn provenance(&self) -> &BTreeMap<KeyPath, Provenance> {
        &self.provenance
    }
}

fn fold_map(
    base: &mut Map<String, Value>,
    overlay: &Map<String, Value>,
    prefix: Option<&KeyPath>,
    origin: &Provenance,
    provenance: &mut BTreeMap<KeyPath, Provenance>,
) {
    for (key, overlay_value) in overlay {
        let path = match prefix {
            Some(prefix) => prefix.child(key),
            None => KeyPath::root_child(key),
        };
        match (base.get_mut(key), overlay_value) {
            (Some(Value::Object(base_map)), Value::Object(overlay_map))
                if !overlay_map.is_empty() =>
            {
                if base_map.is_empty() {
                    // The empty mapping was a leaf; it now gains children.
                    provenance.remove(&path);
                }
                fold_map(base_map, overlay_map, Some(&path), origin, provenance);
            }
            (Some(Value::Object(_)), Value::Object(_)) => {
                // Empty overlay mapping onto a mapping adds nothing.
            }
            (existing, _) => {
                if existing.is_some() {
                    clear_subtree(provenance, &path);
                }
                base.insert(key.clone(), overlay_value.clone());
                record_leaves(provenance, &path, overlay_value, origin);
            }
        }
    }
}

/// Drop provenance for `path` and everything beneath it.
fn clear_subtree(provenance: &mut BTreeMap<KeyPath, Provenance>, path: &KeyPath) {
    let doomed: Vec<KeyPath> = provenance
        .range(path.clone()..)
        .take_while(|(candidate, _)| candidate.starts_with(path))
        .map(|(candidate, _)| candidate.clone())
        .collect();
    for candidate in doomed {
        provenance.remove(&candidate);
    }
}

fn record_leaves(
    provenance: &mut BTreeMap<KeyPath, Provenance>,
    path: &KeyPath,
    value: &Value,
    origin: &Provenance,
) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                record_leaves(provenance, &path.child(key), child, origin);
            }
        }
        _ => {
            provenance.insert(path.clone(), origin.clone());
        }
    }
}
