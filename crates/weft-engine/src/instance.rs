//! Instance - one federated record in memory
//!
//! An instance is what find/where/create/update hand back: the record's
//! primary key, the leaf values fetched or written, and a dirty set.
//! Field access goes through registry resolution, so short names work
//! wherever they are unambiguous; `set` marks the leaf dirty and `save`
//! writes exactly the dirty set back.

use std::collections::BTreeSet;
use std::time::Instant;

use serde_json::Value;

use weft_core::{
    log_op_end, log_op_error, log_op_start, DirtyTracker, FieldPath, FieldValues, Key, Result,
    WeftError,
};
use weft_core_types::RequestId;

use crate::model::Model;
use crate::ops;

pub struct Instance {
    model: Model,
    key: Key,
    values: FieldValues,
    dirty: DirtyTracker,
}

impl Instance {
    /// A freshly loaded or freshly created instance; dirty starts empty
    pub(crate) fn assembled(model: Model, key: Key, values: FieldValues) -> Self {
        Self {
            model,
            key,
            values,
            dirty: DirtyTracker::new(),
        }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    /// All leaf values currently held, by full path
    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    /// Read a field by short or full name
    ///
    /// `Ok(None)` when the field is valid but not loaded or not set.
    ///
    /// # Errors
    ///
    /// `UnknownField` / `AmbiguousField` from resolution.
    pub fn get(&self, name: &str) -> Result<Option<&Value>> {
        let spec = self.model.registry().resolve(name)?;
        Ok(self.values.get(&spec.path))
    }

    /// Write a field by short or full name, marking it dirty
    ///
    /// # Errors
    ///
    /// `UnknownField` / `AmbiguousField` from resolution.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        let path = self.model.registry().resolve(name)?.path.clone();
        self.values.insert(path.clone(), value);
        self.dirty.mark(path);
        Ok(())
    }

    /// Leaves written since load or last successful save
    pub fn dirty_fields(&self) -> &BTreeSet<FieldPath> {
        self.dirty.dirty_set()
    }

    /// Persist the dirty fields to their owning stores
    ///
    /// Stores with no dirty field are not contacted; an empty dirty set
    /// issues zero calls. Fields whose store confirmed (or declined) are
    /// cleared; fields whose store failed stay dirty, so a retried save
    /// resubmits only what failed.
    pub async fn save(&mut self) -> Result<()> {
        let model = self.model.clone();
        let request_id = RequestId::new();
        let trace = model.inner().trace.clone();
        let started = Instant::now();
        log_op_start!(
            "save",
            model = model.name(),
            request_id = request_id.as_str(),
            trace_id = trace.as_str(),
            dirty_count = self.dirty.len() as u64
        );

        let outcome =
            ops::write::save(&model, &self.key, &self.values, self.dirty.dirty_set().clone())
                .await;
        let duration_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(outcome) => {
                self.dirty.clear(outcome.confirmed.iter());
                match outcome.report {
                    None => {
                        log_op_end!(
                            "save",
                            duration_ms = duration_ms,
                            model = model.name(),
                            request_id = request_id.as_str(),
                            trace_id = trace.as_str()
                        );
                        Ok(())
                    }
                    Some(report) => {
                        let err = WeftError::partial(report);
                        log_op_error!(
                            "save",
                            err,
                            duration_ms = duration_ms,
                            model = model.name(),
                            request_id = request_id.as_str(),
                            trace_id = trace.as_str()
                        );
                        Err(err)
                    }
                }
            }
            Err(err) => {
                log_op_error!(
                    "save",
                    err,
                    duration_ms = duration_ms,
                    model = model.name(),
                    request_id = request_id.as_str(),
                    trace_id = trace.as_str()
                );
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("model", &self.model.name())
            .field("key", &self.key)
            .field("values", &self.values)
            .field("dirty", &self.dirty.dirty_set())
            .finish()
    }
}
