//! Write-side single-stage operations: update, delete, save

use std::collections::BTreeSet;

use futures::future;

use weft_core::{FieldPath, FieldValues, Key, PartialFailureReport, Result, WeftError};

use crate::instance::Instance;
use crate::model::{Model, NamedValues};
use crate::ops::{portion, resolve_values, store_failure};

/// Parallel per-store update of the supplied fields
pub(crate) async fn update(model: &Model, key: &Key, values: &NamedValues) -> Result<Instance> {
    let inner = model.inner();
    let resolved = resolve_values(&inner.registry, values)?;
    let paths: BTreeSet<FieldPath> = resolved.keys().cloned().collect();
    let by_store = inner.registry.fields_by_store(&paths)?;
    tracing::debug!(store_count = by_store.len(), "update fan-out");

    let mut calls = Vec::new();
    for (store_id, fields) in &by_store {
        let adapter = inner.adapter(store_id)?;
        let store_values = portion(&resolved, fields);
        calls.push(async move { (store_id, fields, adapter.update(key, store_values).await) });
    }

    let mut written = FieldValues::new();
    let mut failures = Vec::new();
    for (store_id, fields, result) in future::join_all(calls).await {
        match result {
            Ok(()) => written.extend(portion(&resolved, fields)),
            Err(err) if err.is_declined() => written.extend(portion(&resolved, fields)),
            Err(err) => failures.push(store_failure(store_id, "update", &err, fields)),
        }
    }

    if !failures.is_empty() {
        return Err(WeftError::partial(PartialFailureReport {
            op: "update".to_string(),
            failures,
            skipped: Vec::new(),
            partial: written,
            rows: Vec::new(),
            key: Some(key.clone()),
        }));
    }
    Ok(Instance::assembled(model.clone(), key.clone(), written))
}

/// Parallel delete across every store owning at least one field
pub(crate) async fn delete(model: &Model, key: &Key) -> Result<()> {
    let inner = model.inner();
    let stores = inner.registry.stores();

    let mut calls = Vec::new();
    for store_id in &stores {
        let adapter = inner.adapter(store_id)?;
        calls.push(async move { (store_id, adapter.delete(key).await) });
    }

    let mut failures = Vec::new();
    for (store_id, result) in future::join_all(calls).await {
        match result {
            Ok(()) => {}
            Err(err) if err.is_declined() => {}
            Err(err) => {
                let owned: Vec<FieldPath> = inner
                    .registry
                    .leaves()
                    .filter(|spec| &spec.store == store_id)
                    .map(|spec| spec.path.clone())
                    .collect();
                failures.push(store_failure(store_id, "delete", &err, &owned));
            }
        }
    }

    if !failures.is_empty() {
        return Err(WeftError::partial(PartialFailureReport {
            op: "delete".to_string(),
            failures,
            skipped: Vec::new(),
            partial: FieldValues::new(),
            rows: Vec::new(),
            key: Some(key.clone()),
        }));
    }
    Ok(())
}

/// What a save attempt confirmed and, possibly, how it partially failed
pub(crate) struct SaveOutcome {
    /// Paths whose owning store confirmed persistence (or declined)
    pub(crate) confirmed: Vec<FieldPath>,
    pub(crate) report: Option<PartialFailureReport>,
}

/// Dirty-scoped update; only stores owning at least one dirty field are
/// contacted
pub(crate) async fn save(
    model: &Model,
    key: &Key,
    values: &FieldValues,
    dirty: BTreeSet<FieldPath>,
) -> Result<SaveOutcome> {
    if dirty.is_empty() {
        return Ok(SaveOutcome {
            confirmed: Vec::new(),
            report: None,
        });
    }
    let inner = model.inner();
    let by_store = inner.registry.fields_by_store(&dirty)?;
    tracing::debug!(
        store_count = by_store.len(),
        dirty_count = dirty.len(),
        "save fan-out"
    );

    let mut calls = Vec::new();
    for (store_id, fields) in &by_store {
        let adapter = inner.adapter(store_id)?;
        let store_values = portion(values, fields);
        calls.push(async move { (store_id, fields, adapter.update(key, store_values).await) });
    }

    let mut confirmed = Vec::new();
    let mut written = FieldValues::new();
    let mut failures = Vec::new();
    for (store_id, fields, result) in future::join_all(calls).await {
        match result {
            Ok(()) => {
                confirmed.extend(fields.iter().cloned());
                written.extend(portion(values, fields));
            }
            Err(err) if err.is_declined() => {
                confirmed.extend(fields.iter().cloned());
                written.extend(portion(values, fields));
            }
            Err(err) => failures.push(store_failure(store_id, "save", &err, fields)),
        }
    }

    let report = if failures.is_empty() {
        None
    } else {
        Some(PartialFailureReport {
            op: "save".to_string(),
            failures,
            skipped: Vec::new(),
            partial: written,
            rows: Vec::new(),
            key: Some(key.clone()),
        })
    };
    Ok(SaveOutcome { confirmed, report })
}
