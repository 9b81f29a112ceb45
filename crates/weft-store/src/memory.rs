//! MemoryStore - HashMap-backed reference adapter
//!
//! Used by tests and demos, and as a worked example for adapter
//! authors. It exercises every corner of the contract:
//! - its own key translation (logical keys are canonicalized to JSON
//!   text internally)
//! - key assignment on create when no key is adopted yet (UUIDv7)
//! - per-operation declines, so a read-only store can be simulated
//! - an opaque filter dialect for `where_query` (a JSON object of
//!   leaf path → required value, matched by equality)

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use weft_core::{FieldPath, FieldValues, Key};

use crate::adapter::{CreateReceipt, StoreAdapter};
use crate::errors::{AdapterError, AdapterResult};

/// In-memory store adapter
///
/// Safe for concurrent invocation: all state sits behind one mutex,
/// held only across map access, never across an await point.
pub struct MemoryStore {
    name: String,
    /// internal key text → (logical key, this store's fields)
    records: Mutex<HashMap<String, (Key, FieldValues)>>,
    /// operations this store declines ("update", "delete", ...)
    declined: BTreeSet<String>,
}

impl MemoryStore {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            records: Mutex::new(HashMap::new()),
            declined: BTreeSet::new(),
        }
    }

    /// Decline an operation by name, simulating a store that stubs it
    pub fn decline(mut self, op: &str) -> Self {
        self.declined.insert(op.to_string());
        self
    }

    /// This store's key translation: canonical JSON text
    fn internal_key(key: &Key) -> String {
        key.as_value().to_string()
    }

    fn check_supported(&self, op: &str) -> AdapterResult<()> {
        if self.declined.contains(op) {
            Err(AdapterError::unsupported(op))
        } else {
            Ok(())
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, (Key, FieldValues)>> {
        // Lock poisoning only happens if a panic occurred mid-access;
        // tests want the panic surfaced, not masked.
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Number of records currently held (test helper)
    pub fn record_count(&self) -> usize {
        self.lock().len()
    }
}

#[async_trait]
impl StoreAdapter for MemoryStore {
    async fn find(&self, key: &Key, fields: &[FieldPath]) -> AdapterResult<Option<FieldValues>> {
        self.check_supported("find")?;
        let records = self.lock();
        let Some((_, stored)) = records.get(&Self::internal_key(key)) else {
            return Ok(None);
        };
        let mut out = FieldValues::new();
        for path in fields {
            if let Some(value) = stored.get(path) {
                out.insert(path.clone(), value.clone());
            }
        }
        Ok(Some(out))
    }

    async fn create(
        &self,
        key_hint: Option<&Key>,
        values: FieldValues,
    ) -> AdapterResult<CreateReceipt> {
        self.check_supported("create")?;
        let (logical, assigned) = match key_hint {
            Some(key) => (key.clone(), None),
            None => {
                let key = Key::from(Uuid::now_v7().to_string());
                (key.clone(), Some(key))
            }
        };
        tracing::debug!(
            store = %self.name,
            key = %logical,
            assigned = assigned.is_some(),
            field_count = values.len(),
            "memory create"
        );
        let mut records = self.lock();
        let entry = records
            .entry(Self::internal_key(&logical))
            .or_insert_with(|| (logical.clone(), FieldValues::new()));
        // A later stage may extend this store's portion of the record.
        entry.1.extend(values.clone());
        Ok(CreateReceipt {
            key: assigned,
            values,
        })
    }

    async fn update(&self, key: &Key, values: FieldValues) -> AdapterResult<()> {
        self.check_supported("update")?;
        let mut records = self.lock();
        match records.get_mut(&Self::internal_key(key)) {
            Some((_, stored)) => {
                stored.extend(values);
                Ok(())
            }
            None => Err(AdapterError::NotFound),
        }
    }

    async fn delete(&self, key: &Key) -> AdapterResult<()> {
        self.check_supported("delete")?;
        // Deleting an absent record is a no-op confirmation, matching
        // stores whose delete is idempotent.
        self.lock().remove(&Self::internal_key(key));
        Ok(())
    }

    async fn where_query(
        &self,
        filter: &serde_json::Value,
        fields: &[FieldPath],
    ) -> AdapterResult<Vec<(Key, FieldValues)>> {
        self.check_supported("where")?;
        let Some(conditions) = filter.as_object() else {
            return Err(AdapterError::Backend {
                message: format!("memory store filter must be an object, got {}", filter),
            });
        };

        let records = self.lock();
        let mut matches = Vec::new();
        for (_, (logical, stored)) in records.iter() {
            let hit = conditions.iter().all(|(path, expected)| {
                stored.get(&FieldPath::from(path.as_str())) == Some(expected)
            });
            if hit {
                let mut out = FieldValues::new();
                for path in fields {
                    if let Some(value) = stored.get(path) {
                        out.insert(path.clone(), value.clone());
                    }
                }
                matches.push((logical.clone(), out));
            }
        }
        // Deterministic result order for tests and merging.
        matches.sort_by(|(a, _), (b, _)| a.as_value().to_string().cmp(&b.as_value().to_string()));
        tracing::debug!(store = %self.name, matched = matches.len(), "memory where");
        Ok(matches)
    }

    fn adapter_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, serde_json::Value)]) -> FieldValues {
        pairs
            .iter()
            .map(|(path, value)| (FieldPath::from(*path), value.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_create_with_hint_stores_under_logical_key() {
        let store = MemoryStore::new("kv");
        let key = Key::from(1);
        let receipt = store
            .create(Some(&key), values(&[("name", "bob".into())]))
            .await
            .unwrap();
        assert!(receipt.key.is_none(), "hinted create must not assign");

        let found = store
            .find(&key, &["name".into()])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found[&FieldPath::from("name")], serde_json::json!("bob"));
    }

    #[tokio::test]
    async fn test_create_without_hint_assigns_a_key() {
        let store = MemoryStore::new("kv");
        let receipt = store
            .create(None, values(&[("name", "bob".into())]))
            .await
            .unwrap();
        let key = receipt.key.expect("unhinted create assigns a key");
        assert!(store.find(&key, &["name".into()]).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_find_missing_key_is_none_not_error() {
        let store = MemoryStore::new("kv");
        let found = store.find(&Key::from(404), &["name".into()]).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_find_returns_only_requested_present_fields() {
        let store = MemoryStore::new("kv");
        let key = Key::from(1);
        store
            .create(
                Some(&key),
                values(&[("name", "bob".into()), ("penName", "x".into())]),
            )
            .await
            .unwrap();

        let found = store
            .find(&key, &["name".into(), "shoppingCart".into()])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found.contains_key(&FieldPath::from("name")));
    }

    #[tokio::test]
    async fn test_update_merges_and_missing_record_fails() {
        let store = MemoryStore::new("kv");
        let key = Key::from(1);
        store
            .create(Some(&key), values(&[("name", "bob".into())]))
            .await
            .unwrap();

        store
            .update(&key, values(&[("name", "fred".into())]))
            .await
            .unwrap();
        let found = store.find(&key, &["name".into()]).await.unwrap().unwrap();
        assert_eq!(found[&FieldPath::from("name")], serde_json::json!("fred"));

        let err = store
            .update(&Key::from(404), values(&[("name", "x".into())]))
            .await
            .unwrap_err();
        assert_eq!(err, AdapterError::NotFound);
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_is_idempotent() {
        let store = MemoryStore::new("kv");
        let key = Key::from(1);
        store
            .create(Some(&key), values(&[("name", "bob".into())]))
            .await
            .unwrap();

        store.delete(&key).await.unwrap();
        assert!(store.find(&key, &["name".into()]).await.unwrap().is_none());
        store.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_declined_operation_returns_unsupported() {
        let store = MemoryStore::new("analytics").decline("update").decline("delete");
        let key = Key::from(1);
        store
            .create(Some(&key), values(&[("views", 7.into())]))
            .await
            .unwrap();

        let err = store
            .update(&key, values(&[("views", 8.into())]))
            .await
            .unwrap_err();
        assert!(err.is_declined());
        assert!(store.delete(&key).await.unwrap_err().is_declined());
    }

    #[tokio::test]
    async fn test_where_matches_by_equality() {
        let store = MemoryStore::new("sql");
        store
            .create(Some(&Key::from(1)), values(&[("name", "bob".into())]))
            .await
            .unwrap();
        store
            .create(Some(&Key::from(2)), values(&[("name", "fred".into())]))
            .await
            .unwrap();

        let hits = store
            .where_query(&serde_json::json!({"name": "bob"}), &["name".into()])
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, Key::from(1));
    }

    #[tokio::test]
    async fn test_where_default_impl_declines() {
        // A minimal adapter without where_query support.
        struct FindOnly;

        #[async_trait]
        impl StoreAdapter for FindOnly {
            async fn find(
                &self,
                _key: &Key,
                _fields: &[FieldPath],
            ) -> AdapterResult<Option<FieldValues>> {
                Ok(None)
            }
            async fn create(
                &self,
                _key_hint: Option<&Key>,
                values: FieldValues,
            ) -> AdapterResult<CreateReceipt> {
                Ok(CreateReceipt { key: None, values })
            }
            async fn update(&self, _key: &Key, _values: FieldValues) -> AdapterResult<()> {
                Ok(())
            }
            async fn delete(&self, _key: &Key) -> AdapterResult<()> {
                Ok(())
            }
            fn adapter_name(&self) -> &str {
                "find-only"
            }
        }

        let err = FindOnly
            .where_query(&serde_json::json!({}), &[])
            .await
            .unwrap_err();
        assert!(err.is_declined());
    }

    #[tokio::test]
    async fn test_distinct_key_types_do_not_collide() {
        let store = MemoryStore::new("kv");
        store
            .create(Some(&Key::from(1)), values(&[("name", "int".into())]))
            .await
            .unwrap();
        store
            .create(Some(&Key::from("1")), values(&[("name", "text".into())]))
            .await
            .unwrap();
        assert_eq!(store.record_count(), 2);
    }
}
