//! Aggregate operation implementations
//!
//! Each module implements one family of operations against a compiled
//! model; the `Model` handle wraps them with boundary logging. Shared
//! here: name resolution of caller-supplied values and the flattening
//! of adapter errors into report form.

pub(crate) mod create;
pub(crate) mod find;
pub(crate) mod write;

use weft_core::{FieldPath, FieldValues, Result, SchemaRegistry, StoreFailure, StoreId};
use weft_store::AdapterError;

use crate::model::NamedValues;

/// Flatten one failed adapter call into report form
pub(crate) fn store_failure(
    store: &StoreId,
    op: &str,
    err: &AdapterError,
    paths: &[FieldPath],
) -> StoreFailure {
    StoreFailure {
        store: store.clone(),
        op: op.to_string(),
        code: err.code().to_string(),
        message: err.to_string(),
        paths: paths.to_vec(),
    }
}

/// Resolve caller-facing names (possibly short) to leaf-path values
///
/// Resolution errors surface before any store is contacted.
pub(crate) fn resolve_values(registry: &SchemaRegistry, values: &NamedValues) -> Result<FieldValues> {
    values
        .iter()
        .map(|(name, value)| Ok((registry.resolve(name)?.path.clone(), value.clone())))
        .collect()
}

/// The subset of `values` covered by `paths`
pub(crate) fn portion(values: &FieldValues, paths: &[FieldPath]) -> FieldValues {
    paths
        .iter()
        .filter_map(|path| values.get(path).map(|value| (path.clone(), value.clone())))
        .collect()
}
