//! CREATE - staged, prerequisite-ordered record creation
//!
//! The only operation with ordering semantics. The requested fields are
//! closed over their transitive prerequisites and sliced into stages;
//! each stage fans out per store in parallel and is fully awaited
//! before the next starts. A failed store call fails the fields it
//! carried and skips their transitive dependents; everything else
//! proceeds.
//!
//! Key adoption: when the model declares a primary store, that store's
//! create runs first (alone) and its assigned key becomes the record's
//! primary key. Otherwise the engine mints an opaque key up front. In
//! both cases every subsequent create receives the key as a hint, so
//! the record is addressable by one key across all stores.

use std::collections::BTreeSet;

use futures::future;
use uuid::Uuid;

use weft_core::{FieldPath, FieldValues, Key, PartialFailureReport, Result, WeftError};

use crate::instance::Instance;
use crate::model::{Model, NamedValues};
use crate::ops::{portion, resolve_values, store_failure};

fn mint_key() -> Key {
    Key::from(Uuid::now_v7().to_string())
}

pub(crate) async fn create(model: &Model, values: &NamedValues) -> Result<Instance> {
    let inner = model.inner();
    let resolved = resolve_values(&inner.registry, values)?;
    let requested: BTreeSet<FieldPath> = resolved.keys().cloned().collect();
    let stages = inner.resolver.order(&requested);
    let staged: BTreeSet<FieldPath> = stages.iter().flatten().cloned().collect();
    tracing::debug!(
        stage_count = stages.len(),
        field_count = staged.len(),
        "create plan staged"
    );

    let mut failures = Vec::new();
    let mut skipped: BTreeSet<FieldPath> = BTreeSet::new();
    let mut written = FieldValues::new();

    // Fields already handled by the primary store's up-front create.
    let mut primary_done: Vec<FieldPath> = Vec::new();
    let key = match &inner.primary_store {
        None => mint_key(),
        Some(primary) => {
            let fields: Vec<FieldPath> = match stages.first() {
                Some(stage) => inner
                    .registry
                    .fields_by_store(stage)?
                    .remove(primary)
                    .unwrap_or_default(),
                None => Vec::new(),
            };
            let adapter = inner.adapter(primary)?;
            match adapter.create(None, portion(&resolved, &fields)).await {
                Ok(receipt) => {
                    written.extend(portion(&resolved, &fields));
                    primary_done = fields;
                    receipt.key.unwrap_or_else(mint_key)
                }
                Err(err) if err.is_declined() => {
                    written.extend(portion(&resolved, &fields));
                    primary_done = fields;
                    mint_key()
                }
                Err(err) => {
                    skip_dependents(model, &fields, &staged, &mut skipped);
                    failures.push(store_failure(primary, "create", &err, &fields));
                    primary_done = fields;
                    mint_key()
                }
            }
        }
    };

    for stage in &stages {
        let live: BTreeSet<FieldPath> = stage
            .iter()
            .filter(|field| !skipped.contains(*field) && !primary_done.contains(*field))
            .cloned()
            .collect();
        if live.is_empty() {
            continue;
        }
        let by_store = inner.registry.fields_by_store(&live)?;

        let mut calls = Vec::new();
        for (store_id, fields) in &by_store {
            let adapter = inner.adapter(store_id)?;
            let store_values = portion(&resolved, fields);
            let hint = key.clone();
            calls.push(async move {
                (
                    store_id,
                    fields,
                    adapter.create(Some(&hint), store_values).await,
                )
            });
        }

        for (store_id, fields, result) in future::join_all(calls).await {
            match result {
                // Non-primary key assignments stay internal to their store.
                Ok(_receipt) => written.extend(portion(&resolved, fields)),
                Err(err) if err.is_declined() => written.extend(portion(&resolved, fields)),
                Err(err) => {
                    skip_dependents(model, fields, &staged, &mut skipped);
                    failures.push(store_failure(store_id, "create", &err, fields));
                }
            }
        }
    }

    if !failures.is_empty() {
        return Err(WeftError::partial(PartialFailureReport {
            op: "create".to_string(),
            failures,
            skipped: skipped.into_iter().collect(),
            partial: written,
            rows: Vec::new(),
            key: Some(key),
        }));
    }
    Ok(Instance::assembled(model.clone(), key, written))
}

/// Mark the transitive dependents of failed fields as skipped
///
/// Only fields that were actually scheduled count; a dependent outside
/// the requested closure was never going to be created.
fn skip_dependents(
    model: &Model,
    failed: &[FieldPath],
    staged: &BTreeSet<FieldPath>,
    skipped: &mut BTreeSet<FieldPath>,
) {
    for path in failed {
        for dependent in model.inner().resolver.transitive_dependents(path) {
            if staged.contains(&dependent) {
                skipped.insert(dependent);
            }
        }
    }
}
