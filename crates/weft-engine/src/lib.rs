//! Weft Engine - aggregate orchestration over federated stores
//!
//! One logical record type whose fields live across several backing
//! stores is declared as a `ModelDefinition` and compiled into a
//! `Model`. The model handle owns the routing table, the creation
//! prerequisite plan, and the adapter set, and exposes the aggregate
//! operations:
//!
//! - `find` / `find_where`: parallel per-store reads merged by leaf path
//! - `create`: staged writes honoring creation prerequisites
//! - `update` / `delete`: single parallel stage across owning stores
//!
//! Reads and writes surface as `Instance` values carrying the record's
//! primary key, its field values, and a dirty set that scopes `save`.

pub mod definition;
pub mod instance;
pub mod model;
pub(crate) mod ops;

pub use definition::ModelDefinition;
pub use instance::Instance;
pub use model::{Model, NamedValues};
