//! Dotted key-paths addressing nested configuration values

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// A path into a nested mapping, written as dotted text (`db.pool.size`).
///
/// Segments are never empty. Ordering is lexicographic by segment, so a
/// parent always sorts directly before its descendants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Parse a dotted path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKeyPath`] for an empty path or a path with
    /// an empty segment (`a..b`, `.a`, `a.`).
    ///
    /// # Example
    ///
    /// ```
    /// use polyconf_core::KeyPath;
    ///
    /// let path = KeyPath::parse("db.pool.size").unwrap();
    /// assert_eq!(path.segments(), ["db", "pool", "size"]);
    /// assert!(KeyPath::parse("db..size").is_err());
    /// ```
    pub fn parse(path: &str) -> Result<Self> {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(Error::InvalidKeyPath {
                path: path.to_string(),
            });
        }
        Ok(Self { segments })
    }

    /// Build a path from pre-split segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() || segments.iter().any(String::is_empty) {
            return Err(Error::InvalidKeyPath {
                path: segments.join("."),
            });
        }
        Ok(Self { segments })
    }

    pub(crate) fn root_child(key: &str) -> Self {
        Self {
            segments: vec![key.to_string()],
        }
    }

    pub(crate) fn child(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether `self` equals `other` or lies beneath it.
    pub fn starts_with(&self, other: &KeyPath) -> bool {
        self.segments.starts_with(&other.segments)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for KeyPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for KeyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeyPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        KeyPath::parse(&raw).map_err(serde::de::Error::custom)
    }
}
