//! Opaque primary keys
//!
//! The engine never assumes anything about a record's primary key: not
//! its name (it is never called "id" by convention), not its type, and
//! not how any particular store represents it internally. A `Key` is an
//! opaque JSON value handed to adapters verbatim; each adapter owns its
//! own key translation (`"1"` may become `"/Users/1"` inside a
//! key-value store).

use serde::{Deserialize, Serialize};

/// Opaque primary key of one federated record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(serde_json::Value);

impl Key {
    /// Wrap an arbitrary JSON value as a key
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// The underlying value, for adapters to translate
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Self(serde_json::Value::from(n))
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self(serde_json::Value::from(s))
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self(serde_json::Value::from(s))
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            serde_json::Value::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other),
        }
    }
}
