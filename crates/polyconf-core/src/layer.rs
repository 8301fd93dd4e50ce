//! Layers: one plugin's contribution and its execution outcome

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::key_path::KeyPath;
use crate::merge::deep_merge;
use crate::{Error, Result};

/// The nested mapping a plugin contributes.
///
/// Always a mapping at the top level; nested mappings, sequences and
/// scalars below it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerValues(Map<String, Value>);

impl LayerValues {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build values from a list of dotted key-paths.
    ///
    /// Later pairs win on conflicting paths, with the same semantics as
    /// merging two layers.
    ///
    /// ```
    /// use polyconf_core::LayerValues;
    /// use serde_json::json;
    ///
    /// let values =
    ///     LayerValues::from_flat([("db.host", json!("localhost")), ("db.port", json!(5432))])
    ///         .unwrap();
    /// assert_eq!(values.into_value(), json!({"db": {"host": "localhost", "port": 5432}}));
    /// ```
    pub fn from_flat<I, K>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let mut values = Self::new();
        for (path, value) in pairs {
            let path = KeyPath::parse(path.as_ref())?;
            values.insert(&path, value);
        }
        Ok(values)
    }

    /// Set the value at `path`, creating intermediate mappings.
    pub fn insert(&mut self, path: &KeyPath, value: Value) {
        let mut overlay = value;
        for segment in path.segments().iter().rev() {
            let mut map = Map::new();
            map.insert(segment.clone(), overlay);
            overlay = Value::Object(map);
        }
        if let Value::Object(map) = overlay {
            deep_merge(&mut self.0, &map);
        }
    }

    /// Check that every key, at every depth, is a valid path segment.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidKeyPath`] for an empty key or a key containing `.`,
    /// which could not be told apart from a nested path in dotted form.
    pub fn validate(&self) -> Result<()> {
        validate_keys(&self.0, &mut Vec::new())
    }

    /// Look up the value at `path`.
    pub fn get(&self, path: &KeyPath) -> Option<&Value> {
        lookup(&self.0, path)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for LayerValues {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for LayerValues {
    type Error = Value;

    /// Accepts a mapping; hands back any other value unchanged.
    fn try_from(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

fn validate_keys<'a>(map: &'a Map<String, Value>, prefix: &mut Vec<&'a str>) -> Result<()> {
    for (key, value) in map {
        prefix.push(key);
        if key.is_empty() || key.contains('.') {
            return Err(Error::InvalidKeyPath {
                path: prefix.join("."),
            });
        }
        if let Value::Object(child) = value {
            validate_keys(child, prefix)?;
        }
        prefix.pop();
    }
    Ok(())
}

pub(crate) fn lookup<'a>(map: &'a Map<String, Value>, path: &KeyPath) -> Option<&'a Value> {
    let (first, rest) = path.segments().split_first()?;
    let mut current = map.get(first)?;
    for segment in rest {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// How a plugin's execution ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Outcome {
    Ok,
    Skipped { reason: String },
    Error { reason: String },
}

impl Outcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error {
            reason: reason.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok)
    }
}

/// One plugin's contribution plus its outcome. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    source: String,
    values: LayerValues,
    outcome: Outcome,
}

impl Layer {
    pub fn ok(source: impl Into<String>, values: LayerValues) -> Self {
        Self {
            source: source.into(),
            values,
            outcome: Outcome::Ok,
        }
    }

    /// A layer that contributed nothing. `outcome` must not be `Ok`.
    pub fn failed(source: impl Into<String>, outcome: Outcome) -> Self {
        debug_assert!(!outcome.is_ok(), "failed layer built with ok outcome");
        Self {
            source: source.into(),
            values: LayerValues::new(),
            outcome,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn values(&self) -> &LayerValues {
        &self.values
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }
}
