//! Field paths and store identifiers
//!
//! A `FieldPath` is an ordered sequence of name segments rendered with
//! dots (`facebook.wallPosts`). Leaf paths are the unit of routing:
//! every leaf is bound to exactly one store, container paths never are.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Dotted path addressing one field of a model
///
/// Paths are ordered and hashable so they can key the per-instance
/// value map and the dirty set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    /// Build a path from pre-split segments
    ///
    /// Empty segments are rejected by `SchemaRegistry` at compile time,
    /// not here; this constructor just joins.
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Self {
        Self(
            segments
                .iter()
                .map(|s| s.as_ref())
                .collect::<Vec<_>>()
                .join("."),
        )
    }

    /// The dotted representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate the path's segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// The final segment, used for short-name resolution
    pub fn short_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Whether the textual form contains a dot (full path vs short name)
    pub fn is_qualified(&self) -> bool {
        self.0.contains('.')
    }

    /// Extend this path with a child segment
    pub fn child(&self, segment: &str) -> Self {
        if self.0.is_empty() {
            Self(segment.to_string())
        } else {
            Self(format!("{}.{}", self.0, segment))
        }
    }

    /// The empty root path (container of the whole schema)
    pub fn root() -> Self {
        Self(String::new())
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FieldPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one backing store within a model definition
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(String);

impl StoreId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StoreId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for StoreId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for StoreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Leaf path → value mapping, the partial-record currency of the engine
///
/// Ordered so merged records and reports render deterministically.
pub type FieldValues = BTreeMap<FieldPath, serde_json::Value>;
