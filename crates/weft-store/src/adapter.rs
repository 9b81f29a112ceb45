//! StoreAdapter - the uniform capability contract for backing stores
//!
//! Every datastore behind a federated model implements this trait.
//! The engine promises:
//! - field paths arriving here are leaves the store owns, in the
//!   model's dotted naming — the adapter maps them to its own schema
//!   (no naming convention between the two is assumed)
//! - keys and filters are passed through opaquely
//! - one adapter instance may be invoked concurrently from multiple
//!   in-flight operations; implementations must be `Send + Sync` and
//!   internally safe for that
//!
//! The adapter promises:
//! - operations it cannot meaningfully perform return
//!   `AdapterError::Unsupported` (the engine records a success no-op)
//! - `find` returns `Ok(None)` when the key has no record in this
//!   store, which is not an error

use async_trait::async_trait;

use weft_core::{FieldPath, FieldValues, Key};

use crate::errors::AdapterResult;

/// What a store reports back from a successful `create`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateReceipt {
    /// Key the store assigned, if it assigns keys
    ///
    /// At most one store's assignment becomes the record's primary key
    /// (the model's primary store, when one is declared); other
    /// stores' internal keys stay internal.
    pub key: Option<Key>,
    /// Values as stored, for stores that normalize on write
    pub values: FieldValues,
}

/// Uniform async capability interface for one backing store
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    /// Fetch the requested leaves of the record at `key`
    ///
    /// Returns `Ok(None)` when this store has no record for the key.
    /// A returned record may be partial; absent paths contribute no
    /// fields to the merged instance.
    async fn find(&self, key: &Key, fields: &[FieldPath]) -> AdapterResult<Option<FieldValues>>;

    /// Create this store's portion of a new record
    ///
    /// `key_hint` is the primary key adopted so far, when one exists;
    /// stage-0 creates may receive `None`. The adapter may assign and
    /// return its own key via the receipt.
    async fn create(&self, key_hint: Option<&Key>, values: FieldValues)
        -> AdapterResult<CreateReceipt>;

    /// Update the given leaves of the record at `key`
    async fn update(&self, key: &Key, values: FieldValues) -> AdapterResult<()>;

    /// Delete this store's portion of the record at `key`
    async fn delete(&self, key: &Key) -> AdapterResult<()>;

    /// Query by opaque filter, returning matched keys with the
    /// requested leaves
    ///
    /// Optional: the filter is written in this store's own dialect and
    /// never inspected by the engine. The default declines.
    async fn where_query(
        &self,
        filter: &serde_json::Value,
        fields: &[FieldPath],
    ) -> AdapterResult<Vec<(Key, FieldValues)>> {
        let _ = (filter, fields);
        Err(crate::errors::AdapterError::unsupported("where"))
    }

    /// The adapter's name for logging and failure reports
    fn adapter_name(&self) -> &str;
}
