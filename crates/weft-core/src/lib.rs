//! Weft Core - schema compilation and bookkeeping for field federation
//!
//! This crate provides the synchronous building blocks of the Weft
//! federation engine:
//! - Field paths, store identifiers, and opaque primary keys
//! - Schema declarations (nested field trees) and their compiled form
//! - SchemaRegistry: leaf routing and short-name resolution
//! - DependencyResolver: staged creation order over prerequisite edges
//! - DirtyTracker: per-instance record of mutated fields
//! - Field selectors (explicit include list, omit list, default fetch)
//! - Error taxonomy and partial-failure reporting
//!
//! Nothing in this crate performs I/O or touches an async runtime; the
//! orchestration layer lives in `weft-engine`.

pub mod deps;
pub mod dirty;
pub mod errors;
pub mod key;
pub mod logging_facility;
pub mod path;
pub mod registry;
pub mod schema;
pub mod selector;

// Re-export commonly used types
pub use deps::{DependencyResolver, Stage};
pub use dirty::DirtyTracker;
pub use errors::{PartialFailureReport, Result, StoreFailure, WeftError, WeftErrorKind};
pub use key::Key;
pub use path::{FieldPath, FieldValues, StoreId};
pub use registry::{LeafSpec, SchemaRegistry};
pub use schema::{FieldConstraints, FieldDecl, FieldKind, ModelSchema, SchemaNode};
pub use selector::FieldSelector;
