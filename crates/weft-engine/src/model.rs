//! Model - compiled handle over routing, staging, and adapters
//!
//! The handle is cheap to clone (one Arc) and shared by every instance
//! it produces. All aggregate operations log start/end/error events at
//! this boundary with a fresh request id plus the handle's trace id, so
//! one record's read-modify-write cycle correlates across operations.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use weft_core::{
    log_op_end, log_op_error, log_op_start, DependencyResolver, FieldSelector, Key, Result,
    SchemaRegistry, StoreId, WeftError,
};
use weft_core_types::{RequestId, TraceId};
use weft_store::StoreAdapter;

use crate::instance::Instance;
use crate::ops;

/// Caller-facing values keyed by short or full field name
pub type NamedValues = BTreeMap<String, Value>;

/// Compiled model state shared behind the handle
pub(crate) struct ModelInner {
    pub(crate) name: String,
    pub(crate) stores: BTreeMap<StoreId, Arc<dyn StoreAdapter>>,
    pub(crate) registry: SchemaRegistry,
    pub(crate) resolver: DependencyResolver,
    pub(crate) primary_store: Option<StoreId>,
    /// Shared by every operation on this handle (and its clones)
    pub(crate) trace: TraceId,
}

impl ModelInner {
    /// Adapter for a declared store
    pub(crate) fn adapter(&self, store: &StoreId) -> Result<Arc<dyn StoreAdapter>> {
        self.stores
            .get(store)
            .map(Arc::clone)
            .ok_or_else(|| WeftError::UnknownStore {
                store: store.clone(),
                reference: "adapter lookup".to_string(),
            })
    }
}

/// Compiled, callable federated model
#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.inner.name)
            .finish_non_exhaustive()
    }
}

impl Model {
    pub(crate) fn new(inner: ModelInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub(crate) fn inner(&self) -> &ModelInner {
        &self.inner
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The compiled routing table, for field resolution
    pub fn registry(&self) -> &SchemaRegistry {
        &self.inner.registry
    }

    /// Fetch one record by primary key
    ///
    /// `Ok(None)` when no queried store holds the key. Per-store
    /// failures yield a `PartialFailure` carrying whatever merged data
    /// the other stores returned.
    pub async fn find(&self, key: &Key, selector: &FieldSelector) -> Result<Option<Instance>> {
        self.run_op("find", ops::find::find(self, key, selector)).await
    }

    /// Query by per-store filters
    ///
    /// Each entry targets one store's `where_query` in that store's own
    /// filter dialect; stores without an entry are not queried. Rows are
    /// assembled per matched primary key.
    pub async fn find_where(
        &self,
        filters: &BTreeMap<StoreId, Value>,
        selector: &FieldSelector,
    ) -> Result<Vec<Instance>> {
        self.run_op("where", ops::find::find_where(self, filters, selector))
            .await
    }

    /// Create a record across every store owning a supplied field
    ///
    /// Fields are staged by their creation prerequisites; each stage
    /// fans out in parallel and is awaited before the next. A failed
    /// field aborts only its transitive dependents.
    pub async fn create(&self, values: &NamedValues) -> Result<Instance> {
        self.run_op("create", ops::create::create(self, values)).await
    }

    /// Update the supplied fields in a single parallel stage
    pub async fn update(&self, key: &Key, values: &NamedValues) -> Result<Instance> {
        self.run_op("update", ops::write::update(self, key, values))
            .await
    }

    /// Delete the record from every store owning at least one field
    pub async fn delete(&self, key: &Key) -> Result<()> {
        self.run_op("delete", ops::write::delete(self, key)).await
    }

    /// Boundary wrapper: correlation ids, timing, start/end/error events
    pub(crate) async fn run_op<T>(
        &self,
        op: &'static str,
        fut: impl std::future::Future<Output = Result<T>>,
    ) -> Result<T> {
        let request_id = RequestId::new();
        let started = Instant::now();
        log_op_start!(
            op,
            model = self.inner.name.as_str(),
            request_id = request_id.as_str(),
            trace_id = self.inner.trace.as_str()
        );
        let result = fut.await;
        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => log_op_end!(
                op,
                duration_ms = duration_ms,
                model = self.inner.name.as_str(),
                request_id = request_id.as_str(),
                trace_id = self.inner.trace.as_str()
            ),
            Err(err) => log_op_error!(
                op,
                *err,
                duration_ms = duration_ms,
                model = self.inner.name.as_str(),
                request_id = request_id.as_str(),
                trace_id = self.inner.trace.as_str()
            ),
        }
        result
    }
}
