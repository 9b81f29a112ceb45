//! Read-side operations: find by key, query by per-store filter

use std::collections::BTreeMap;

use futures::future;
use serde_json::Value;

use weft_core::{
    FieldPath, FieldSelector, FieldValues, Key, PartialFailureReport, Result, StoreId, WeftError,
};

use crate::instance::Instance;
use crate::model::Model;
use crate::ops::store_failure;

/// Parallel per-store find, merged by leaf path
pub(crate) async fn find(
    model: &Model,
    key: &Key,
    selector: &FieldSelector,
) -> Result<Option<Instance>> {
    let inner = model.inner();
    let paths = selector.expand(&inner.registry)?;
    let by_store = inner.registry.fields_by_store(&paths)?;
    tracing::debug!(store_count = by_store.len(), "find fan-out");

    let mut calls = Vec::new();
    for (store_id, fields) in &by_store {
        let adapter = inner.adapter(store_id)?;
        calls.push(async move { (store_id, fields, adapter.find(key, fields).await) });
    }

    let mut merged = FieldValues::new();
    let mut failures = Vec::new();
    let mut hit = false;
    for (store_id, fields, result) in future::join_all(calls).await {
        match result {
            Ok(Some(values)) => {
                hit = true;
                merged.extend(values);
            }
            Ok(None) => {}
            Err(err) if err.is_declined() => {}
            Err(err) => failures.push(store_failure(store_id, "find", &err, fields)),
        }
    }

    if !failures.is_empty() {
        return Err(WeftError::partial(PartialFailureReport {
            op: "find".to_string(),
            failures,
            skipped: Vec::new(),
            partial: merged,
            rows: Vec::new(),
            key: Some(key.clone()),
        }));
    }
    if !hit {
        return Ok(None);
    }
    Ok(Some(Instance::assembled(model.clone(), key.clone(), merged)))
}

/// Per-store where queries, rows assembled by matched primary key
///
/// A key matched by more than one listed store contributes one row with
/// the stores' partial records merged.
pub(crate) async fn find_where(
    model: &Model,
    filters: &BTreeMap<StoreId, Value>,
    selector: &FieldSelector,
) -> Result<Vec<Instance>> {
    let inner = model.inner();
    let paths = selector.expand(&inner.registry)?;
    let by_store = inner.registry.fields_by_store(&paths)?;

    let mut calls = Vec::new();
    for (store_id, filter) in filters {
        if !inner.stores.contains_key(store_id) {
            return Err(WeftError::UnknownStore {
                store: store_id.clone(),
                reference: "where filter".to_string(),
            });
        }
        let adapter = inner.adapter(store_id)?;
        let fields: Vec<FieldPath> = by_store.get(store_id).cloned().unwrap_or_default();
        calls.push(async move {
            let result = adapter.where_query(filter, &fields).await;
            (store_id, fields, result)
        });
    }

    // keyed by canonical key text so identical keys merge across stores
    let mut rows: BTreeMap<String, (Key, FieldValues)> = BTreeMap::new();
    let mut failures = Vec::new();
    for (store_id, fields, result) in future::join_all(calls).await {
        match result {
            Ok(matches) => {
                for (key, values) in matches {
                    let entry = rows
                        .entry(key.as_value().to_string())
                        .or_insert_with(|| (key, FieldValues::new()));
                    entry.1.extend(values);
                }
            }
            Err(err) if err.is_declined() => {}
            Err(err) => failures.push(store_failure(store_id, "where", &err, &fields)),
        }
    }

    if !failures.is_empty() {
        // The healthy stores' matches travel with the report so the
        // caller can still use them.
        return Err(WeftError::partial(PartialFailureReport {
            op: "where".to_string(),
            failures,
            skipped: Vec::new(),
            partial: FieldValues::new(),
            rows: rows.into_values().collect(),
            key: None,
        }));
    }
    Ok(rows
        .into_values()
        .map(|(key, values)| Instance::assembled(model.clone(), key, values))
        .collect())
}
