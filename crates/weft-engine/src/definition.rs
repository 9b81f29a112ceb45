//! ModelDefinition - the declarative surface a model is built from
//!
//! A definition collects the schema tree, the adapter per declared
//! store, creation prerequisites, and the optional primary store, then
//! compiles the lot into a `Model`. Every definition-level error
//! (duplicate leaf, undeclared store, invalid or cyclic prerequisite)
//! surfaces from `compile`; a compiled model never discovers one at
//! call time.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use weft_core::{
    DependencyResolver, FieldPath, ModelSchema, Result, SchemaRegistry, StoreId, WeftError,
};
use weft_core_types::TraceId;
use weft_store::StoreAdapter;

use crate::model::{Model, ModelInner};

pub struct ModelDefinition {
    name: String,
    stores: BTreeMap<StoreId, Arc<dyn StoreAdapter>>,
    schema: ModelSchema,
    create_prerequisites: Vec<(String, Vec<String>)>,
    primary_store: Option<StoreId>,
}

impl ModelDefinition {
    pub fn new(name: &str, schema: ModelSchema) -> Self {
        Self {
            name: name.to_string(),
            stores: BTreeMap::new(),
            schema,
            create_prerequisites: Vec::new(),
            primary_store: None,
        }
    }

    /// Declare a store and supply its adapter
    pub fn store(mut self, id: &str, adapter: Arc<dyn StoreAdapter>) -> Self {
        self.stores.insert(StoreId::from(id), adapter);
        self
    }

    /// Declare that `field` may only be created after `prereqs`
    ///
    /// Names may be short or full; repeats are tolerated.
    pub fn create_prerequisite(mut self, field: &str, prereqs: &[&str]) -> Self {
        self.create_prerequisites.push((
            field.to_string(),
            prereqs.iter().map(|p| p.to_string()).collect(),
        ));
        self
    }

    /// Declare the store whose create assigns the record's primary key
    ///
    /// Without one, the engine mints an opaque key itself and every
    /// store receives it as a hint.
    pub fn primary_store(mut self, id: &str) -> Self {
        self.primary_store = Some(StoreId::from(id));
        self
    }

    /// Compile the definition into a callable model
    ///
    /// # Errors
    ///
    /// - `DuplicateLeaf` / `UnknownStore` from schema compilation
    /// - `UnknownStore` if the primary store is not declared
    /// - `AmbiguousField` if a prerequisite short name is ambiguous
    /// - `InvalidPrerequisite` / `DependencyCycle` from the graph
    pub fn compile(self) -> Result<Model> {
        let store_ids: BTreeSet<StoreId> = self.stores.keys().cloned().collect();
        let registry = SchemaRegistry::compile(&self.schema, &store_ids)?;

        if let Some(primary) = &self.primary_store {
            if !self.stores.contains_key(primary) {
                return Err(WeftError::UnknownStore {
                    store: primary.clone(),
                    reference: "primary store declaration".to_string(),
                });
            }
        }

        let mut edges: BTreeMap<FieldPath, Vec<FieldPath>> = BTreeMap::new();
        for (field, prereqs) in &self.create_prerequisites {
            let entry = edges.entry(resolve_edge_name(&registry, field)?).or_default();
            for prereq in prereqs {
                entry.push(resolve_edge_name(&registry, prereq)?);
            }
        }
        let resolver = DependencyResolver::compile(&edges, &registry)?;

        Ok(Model::new(ModelInner {
            name: self.name,
            stores: self.stores,
            registry,
            resolver,
            primary_store: self.primary_store,
            trace: TraceId::new(),
        }))
    }
}

/// Resolve a prerequisite edge endpoint
///
/// Unknown names pass through unresolved so the graph compiler can
/// reject them as `InvalidPrerequisite` with the edge in the message;
/// ambiguity is still fatal here.
fn resolve_edge_name(registry: &SchemaRegistry, name: &str) -> Result<FieldPath> {
    match registry.resolve(name) {
        Ok(spec) => Ok(spec.path.clone()),
        Err(WeftError::UnknownField { .. }) => Ok(FieldPath::from(name)),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::WeftErrorKind;
    use weft_store::MemoryStore;

    fn schema() -> ModelSchema {
        serde_json::from_value(serde_json::json!({
            "name": { "db": "sql" },
            "twitter": {
                "userName": { "db": "mongo" },
                "tweets": { "db": "twitter", "include": false }
            },
            "facebook": {
                "userName": { "db": "sql" }
            }
        }))
        .unwrap()
    }

    fn definition() -> ModelDefinition {
        ModelDefinition::new("Author", schema())
            .store("sql", Arc::new(MemoryStore::new("sql")))
            .store("mongo", Arc::new(MemoryStore::new("mongo")))
            .store("twitter", Arc::new(MemoryStore::new("twitter")))
    }

    #[test]
    fn test_compile_succeeds_with_short_name_prerequisite() {
        let model = definition()
            .create_prerequisite("tweets", &["twitter.userName"])
            .compile()
            .unwrap();
        assert_eq!(model.name(), "Author");
    }

    #[test]
    fn test_undeclared_primary_store_fails_at_compile() {
        let err = definition().primary_store("redis").compile().unwrap_err();
        assert_eq!(err.kind(), WeftErrorKind::UnknownStore);
    }

    #[test]
    fn test_ambiguous_prerequisite_name_fails_at_compile() {
        let err = definition()
            .create_prerequisite("tweets", &["userName"])
            .compile()
            .unwrap_err();
        assert_eq!(err.kind(), WeftErrorKind::AmbiguousField);
    }

    #[test]
    fn test_unknown_prerequisite_name_fails_at_compile() {
        let err = definition()
            .create_prerequisite("tweets", &["shoeSize"])
            .compile()
            .unwrap_err();
        assert_eq!(err.kind(), WeftErrorKind::InvalidPrerequisite);
    }

    #[test]
    fn test_cyclic_prerequisites_fail_at_compile() {
        let err = definition()
            .create_prerequisite("tweets", &["twitter.userName"])
            .create_prerequisite("twitter.userName", &["tweets"])
            .compile()
            .unwrap_err();
        assert_eq!(err.kind(), WeftErrorKind::DependencyCycle);
    }

    #[test]
    fn test_leaf_bound_to_undeclared_store_fails_at_compile() {
        let err = ModelDefinition::new("Author", schema())
            .store("sql", Arc::new(MemoryStore::new("sql")))
            .compile()
            .unwrap_err();
        assert_eq!(err.kind(), WeftErrorKind::UnknownStore);
    }
}
