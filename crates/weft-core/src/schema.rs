//! Model schema declarations
//!
//! A schema is a nested tree of field declarations, written the way a
//! model author would declare it:
//!
//! ```json
//! {
//!   "name": { "db": "sql", "length": 40, "null": false },
//!   "penName": { "db": "mongo" },
//!   "posts": { "db": "mongo", "type": "collection", "schema": ["title", "content"] },
//!   "twitter": {
//!     "userName": { "db": "mongo" },
//!     "tweets": { "db": "twitter", "include": false }
//!   },
//!   "facebook.wallPosts": { "db": "facebook" }
//! }
//! ```
//!
//! Dotted keys flatten exactly like nested maps. No naming convention
//! is assumed between field paths and anything inside a store: the
//! `db` binding is the only routing information.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, WeftError};
use crate::path::{FieldPath, StoreId};

/// Declared type tag of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Scalar,
    Object,
    Array,
    Collection,
}

/// Advisory, store-specific constraints carried on a leaf
///
/// The engine never enforces these; they travel with the compiled spec
/// so adapters can honour them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldConstraints {
    /// Whether the store should accept null (None = unspecified)
    #[serde(rename = "null", skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    /// Maximum length hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
}

impl FieldConstraints {
    pub fn is_empty(&self) -> bool {
        self.nullable.is_none() && self.length.is_none()
    }
}

/// Item schema of a `collection`/`object` field
///
/// Either a positional list of item field names (`["title", "content"]`)
/// or a nested declaration map. In both forms the collection itself is
/// one leaf owned by one store; the item schema is advisory metadata
/// for that store's adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemSchema {
    Names(Vec<String>),
    Nested(BTreeMap<String, FieldDecl>),
}

impl ItemSchema {
    /// The item field names in declaration order
    pub fn names(&self) -> Vec<&str> {
        match self {
            ItemSchema::Names(names) => names.iter().map(|n| n.as_str()).collect(),
            ItemSchema::Nested(map) => map.keys().map(|k| k.as_str()).collect(),
        }
    }
}

/// Declaration of one store-bound field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDecl {
    /// Owning store identifier
    pub db: StoreId,
    /// Declared type tag; defaults to `scalar`
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    /// Fetched by default; `false` makes the field opt-in
    #[serde(default = "default_include")]
    pub include: bool,
    /// Item schema for `collection`/`object` fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<ItemSchema>,
    /// Advisory nullability hint
    #[serde(rename = "null", default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    /// Advisory length hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
}

fn default_include() -> bool {
    true
}

impl FieldDecl {
    /// A plain scalar field bound to `store`
    pub fn scalar(store: &str) -> Self {
        Self {
            db: store.into(),
            kind: FieldKind::Scalar,
            include: true,
            schema: None,
            nullable: None,
            length: None,
        }
    }

    /// The advisory constraints carried by this declaration
    pub fn constraints(&self) -> FieldConstraints {
        FieldConstraints {
            nullable: self.nullable,
            length: self.length,
        }
    }

    /// Mark the field as opt-in (not fetched by default)
    pub fn opt_in(mut self) -> Self {
        self.include = false;
        self
    }

    /// Set the declared type tag
    pub fn kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }
}

/// One node of the declaration tree: a bound field or a nested group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaNode {
    /// A leaf bound to a store
    Field(FieldDecl),
    /// A container of further nodes; never store-bound itself
    Group(BTreeMap<String, SchemaNode>),
}

/// Root of a model's field declaration tree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelSchema {
    pub fields: BTreeMap<String, SchemaNode>,
}

impl ModelSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a node at `name` (which may be a dotted path)
    pub fn field(mut self, name: &str, decl: FieldDecl) -> Self {
        self.fields.insert(name.to_string(), SchemaNode::Field(decl));
        self
    }

    /// Declare a nested group at `name`
    pub fn group(mut self, name: &str, group: ModelSchema) -> Self {
        self.fields
            .insert(name.to_string(), SchemaNode::Group(group.fields));
        self
    }

    /// Flatten the tree into `(path, decl)` leaves
    ///
    /// Dotted declaration keys contribute multiple segments. Duplicate
    /// leaf paths (e.g. a dotted key colliding with a nested map) are a
    /// compile error.
    pub fn flatten(&self) -> Result<Vec<(FieldPath, FieldDecl)>> {
        let mut leaves = Vec::new();
        flatten_into(&FieldPath::root(), &self.fields, &mut leaves)?;
        // Sorted so the compiled registry is deterministic regardless of
        // declaration order.
        leaves.sort_by(|(a, _), (b, _)| a.cmp(b));
        for pair in leaves.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(WeftError::DuplicateLeaf {
                    path: pair[0].0.clone(),
                });
            }
        }
        Ok(leaves)
    }
}

fn flatten_into(
    prefix: &FieldPath,
    nodes: &BTreeMap<String, SchemaNode>,
    out: &mut Vec<(FieldPath, FieldDecl)>,
) -> Result<()> {
    for (name, node) in nodes {
        let mut path = prefix.clone();
        for segment in name.split('.') {
            if segment.is_empty() {
                return Err(WeftError::Internal {
                    message: format!("empty path segment in schema key '{}'", name),
                });
            }
            path = path.child(segment);
        }
        match node {
            SchemaNode::Field(decl) => out.push((path, decl.clone())),
            SchemaNode::Group(children) => flatten_into(&path, children, out)?,
        }
    }
    Ok(())
}
