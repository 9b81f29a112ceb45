//! SchemaRegistry - compiled field routing for one model
//!
//! The registry is built once at model-compile time from a
//! `ModelSchema` declaration. It answers three questions at call time:
//!
//! - which leaf does a (possibly short) field name refer to?
//! - which store owns each requested leaf?
//! - which leaves are fetched when the caller names none?
//!
//! Short-name ambiguity is a compile-detectable property of the schema:
//! the short-name index is built here, not scanned per call.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::errors::{Result, WeftError};
use crate::path::{FieldPath, StoreId};
use crate::schema::{FieldConstraints, FieldKind, ModelSchema};

/// Compiled specification of one leaf field
#[derive(Debug, Clone, PartialEq)]
pub struct LeafSpec {
    /// Full dotted path of the leaf
    pub path: FieldPath,
    /// Owning store
    pub store: StoreId,
    /// Declared type tag
    pub kind: FieldKind,
    /// Fetched by default
    pub include: bool,
    /// Advisory constraints for the owning store
    pub constraints: FieldConstraints,
    /// Item field names for `collection`/`object` leaves
    pub item_fields: Vec<String>,
}

/// Compiled leaf-path → store routing table with short-name index
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    /// Every leaf of the model, keyed by full path
    leaves: BTreeMap<FieldPath, LeafSpec>,
    /// Final path segment → all full paths ending in it
    short_names: HashMap<String, Vec<FieldPath>>,
    /// Leaves with include != false, precomputed
    default_fetch: BTreeSet<FieldPath>,
}

impl SchemaRegistry {
    /// Compile a declaration tree against the model's declared stores
    ///
    /// # Errors
    ///
    /// - `DuplicateLeaf` if two declarations flatten to the same path
    /// - `UnknownStore` if a leaf is bound to an undeclared store
    pub fn compile(schema: &ModelSchema, stores: &BTreeSet<StoreId>) -> Result<Self> {
        let mut leaves = BTreeMap::new();
        let mut short_names: HashMap<String, Vec<FieldPath>> = HashMap::new();
        let mut default_fetch = BTreeSet::new();

        for (path, decl) in schema.flatten()? {
            if !stores.contains(&decl.db) {
                return Err(WeftError::UnknownStore {
                    store: decl.db.clone(),
                    reference: path.to_string(),
                });
            }
            short_names
                .entry(path.short_name().to_string())
                .or_default()
                .push(path.clone());
            if decl.include {
                default_fetch.insert(path.clone());
            }
            let spec = LeafSpec {
                path: path.clone(),
                store: decl.db.clone(),
                kind: decl.kind,
                include: decl.include,
                constraints: decl.constraints(),
                item_fields: decl
                    .schema
                    .as_ref()
                    .map(|s| s.names().iter().map(|n| n.to_string()).collect())
                    .unwrap_or_default(),
            };
            leaves.insert(path, spec);
        }

        Ok(Self {
            leaves,
            short_names,
            default_fetch,
        })
    }

    /// Resolve a field name to its leaf spec
    ///
    /// Full dotted paths resolve directly and are never ambiguous, even
    /// when their final segment duplicates another leaf's. A short name
    /// resolves through the index: zero matches is `UnknownField`, one
    /// match resolves, two or more is `AmbiguousField` naming every
    /// competing full path.
    pub fn resolve(&self, name: &str) -> Result<&LeafSpec> {
        if name.contains('.') {
            let path = FieldPath::from(name);
            return self.leaves.get(&path).ok_or_else(|| WeftError::UnknownField {
                name: name.to_string(),
            });
        }

        // An unqualified name may still be a top-level leaf; it competes
        // with every nested leaf sharing the same final segment.
        match self.short_names.get(name).map(|c| c.as_slice()) {
            None | Some([]) => Err(WeftError::UnknownField {
                name: name.to_string(),
            }),
            Some([only]) => Ok(&self.leaves[only]),
            Some(candidates) => {
                let mut candidates = candidates.to_vec();
                candidates.sort();
                Err(WeftError::AmbiguousField {
                    name: name.to_string(),
                    candidates,
                })
            }
        }
    }

    /// Look up a known-full path without short-name resolution
    pub fn leaf(&self, path: &FieldPath) -> Result<&LeafSpec> {
        self.leaves.get(path).ok_or_else(|| WeftError::UnknownField {
            name: path.to_string(),
        })
    }

    /// Whether `path` is a leaf of this model
    pub fn contains(&self, path: &FieldPath) -> bool {
        self.leaves.contains_key(path)
    }

    /// All leaves of the model in path order
    pub fn leaves(&self) -> impl Iterator<Item = &LeafSpec> {
        self.leaves.values()
    }

    /// Every store that owns at least one leaf
    pub fn stores(&self) -> BTreeSet<StoreId> {
        self.leaves.values().map(|spec| spec.store.clone()).collect()
    }

    /// Partition a path set by owning store
    ///
    /// # Errors
    ///
    /// `UnknownField` if any path is not a leaf of the model.
    pub fn fields_by_store<'a, I>(&self, paths: I) -> Result<BTreeMap<StoreId, Vec<FieldPath>>>
    where
        I: IntoIterator<Item = &'a FieldPath>,
    {
        let mut by_store: BTreeMap<StoreId, Vec<FieldPath>> = BTreeMap::new();
        for path in paths {
            let spec = self.leaf(path)?;
            by_store.entry(spec.store.clone()).or_default().push(path.clone());
        }
        Ok(by_store)
    }

    /// Leaves fetched when the caller supplies no selector
    pub fn default_fetch_set(&self) -> &BTreeSet<FieldPath> {
        &self.default_fetch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::WeftErrorKind;

    fn registry() -> SchemaRegistry {
        let schema: ModelSchema = serde_json::from_value(serde_json::json!({
            "name": { "db": "sql" },
            "penName": { "db": "mongo" },
            "twitter": {
                "userName": { "db": "mongo" },
                "tweets": { "db": "twitter", "include": false }
            },
            "facebook": {
                "userName": { "db": "sql" }
            },
            "facebook.wallPosts": { "db": "facebook" }
        }))
        .unwrap();
        let stores: BTreeSet<StoreId> = ["sql", "mongo", "twitter", "facebook"]
            .into_iter()
            .map(StoreId::from)
            .collect();
        SchemaRegistry::compile(&schema, &stores).unwrap()
    }

    #[test]
    fn test_full_path_resolves_directly() {
        let reg = registry();
        let spec = reg.resolve("twitter.userName").unwrap();
        assert_eq!(spec.store, "mongo".into());
    }

    #[test]
    fn test_full_path_never_ambiguous_despite_shared_segment() {
        // Both twitter.userName and facebook.userName end in userName;
        // the dotted form must not consult the short-name index.
        let reg = registry();
        assert!(reg.resolve("facebook.userName").is_ok());
        assert!(reg.resolve("twitter.userName").is_ok());
    }

    #[test]
    fn test_unique_short_name_resolves() {
        let reg = registry();
        let spec = reg.resolve("penName").unwrap();
        assert_eq!(spec.path, "penName".into());
    }

    #[test]
    fn test_short_name_reaches_nested_leaf() {
        // `tweets` only exists at twitter.tweets; short access finds it.
        let reg = registry();
        let spec = reg.resolve("tweets").unwrap();
        assert_eq!(spec.path, "twitter.tweets".into());
    }

    #[test]
    fn test_ambiguous_short_name_lists_exact_candidates() {
        let reg = registry();
        let err = reg.resolve("userName").unwrap_err();
        match err {
            WeftError::AmbiguousField { name, candidates } => {
                assert_eq!(name, "userName");
                assert_eq!(
                    candidates,
                    vec![
                        FieldPath::from("facebook.userName"),
                        FieldPath::from("twitter.userName")
                    ]
                );
            }
            other => panic!("expected AmbiguousField, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_names_fail() {
        let reg = registry();
        assert_eq!(
            reg.resolve("shoeSize").unwrap_err().kind(),
            WeftErrorKind::UnknownField
        );
        assert_eq!(
            reg.resolve("twitter.shoeSize").unwrap_err().kind(),
            WeftErrorKind::UnknownField
        );
    }

    #[test]
    fn test_default_fetch_excludes_opt_in() {
        let reg = registry();
        let defaults = reg.default_fetch_set();
        assert!(defaults.contains(&"name".into()));
        assert!(!defaults.contains(&"twitter.tweets".into()));
    }

    #[test]
    fn test_fields_by_store_partitions() {
        let reg = registry();
        let paths: Vec<FieldPath> = vec![
            "name".into(),
            "penName".into(),
            "twitter.userName".into(),
            "facebook.userName".into(),
        ];
        let by_store = reg.fields_by_store(&paths).unwrap();
        assert_eq!(
            by_store[&StoreId::from("sql")],
            vec![FieldPath::from("name"), FieldPath::from("facebook.userName")]
        );
        assert_eq!(
            by_store[&StoreId::from("mongo")],
            vec![
                FieldPath::from("penName"),
                FieldPath::from("twitter.userName")
            ]
        );
        assert!(!by_store.contains_key(&StoreId::from("twitter")));
    }

    #[test]
    fn test_undeclared_store_is_compile_error() {
        let schema: ModelSchema = serde_json::from_value(serde_json::json!({
            "name": { "db": "sql" }
        }))
        .unwrap();
        let stores: BTreeSet<StoreId> = [StoreId::from("mongo")].into_iter().collect();
        let err = SchemaRegistry::compile(&schema, &stores).unwrap_err();
        assert_eq!(err.kind(), WeftErrorKind::UnknownStore);
    }

    #[test]
    fn test_stores_lists_every_owner() {
        let reg = registry();
        let stores = reg.stores();
        assert_eq!(stores.len(), 4);
        assert!(stores.contains(&"facebook".into()));
    }
}
