//! Field selectors for find/where calls
//!
//! Three forms, matching the call surface of the model API:
//!
//! - absent / `Default` — the default-fetch set (every leaf with
//!   `include != false`)
//! - `["id", "penName"]` — only the named fields
//! - `{ "omit": ["penName"] }` — the default-fetch set minus the named
//!   fields
//!
//! Names may be short; resolution (including ambiguity) happens against
//! the registry before any store call.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::path::FieldPath;
use crate::registry::SchemaRegistry;

/// Which fields a find/where call should fetch
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSelector {
    /// Fetch the default set
    #[default]
    Default,
    /// Fetch only these fields (short or full names)
    Include(Vec<String>),
    /// Fetch the default set minus these fields
    Omit { omit: Vec<String> },
}

impl FieldSelector {
    /// Convenience constructor for an explicit include list
    pub fn include<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        FieldSelector::Include(names.into_iter().map(Into::into).collect())
    }

    /// Convenience constructor for an omit list
    pub fn omit<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        FieldSelector::Omit {
            omit: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Expand to the concrete leaf set under a registry
    ///
    /// # Errors
    ///
    /// `UnknownField` / `AmbiguousField` for any listed name; selector
    /// errors always surface before a single store is contacted.
    pub fn expand(&self, registry: &SchemaRegistry) -> Result<BTreeSet<FieldPath>> {
        match self {
            FieldSelector::Default => Ok(registry.default_fetch_set().clone()),
            FieldSelector::Include(names) => {
                let mut set = BTreeSet::new();
                for name in names {
                    set.insert(registry.resolve(name)?.path.clone());
                }
                Ok(set)
            }
            FieldSelector::Omit { omit } => {
                let mut set = registry.default_fetch_set().clone();
                for name in omit {
                    set.remove(&registry.resolve(name)?.path);
                }
                Ok(set)
            }
        }
    }
}
