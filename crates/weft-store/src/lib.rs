//! Weft Store - the adapter boundary of the federation engine
//!
//! This crate defines the one contract a backing store must satisfy to
//! participate in a federated model, plus a reference in-memory
//! implementation:
//! - `StoreAdapter`: async CRUD capability interface, keyed by opaque
//!   primary key or opaque filter
//! - `AdapterError`: the adapter-side error taxonomy (including the
//!   `Unsupported` decline that the engine treats as a success no-op)
//! - `MemoryStore`: HashMap-backed adapter used by tests and demos
//!
//! Adapters are supplied to a model definition, never constructed by
//! the engine. Each adapter owns its own key translation and its own
//! filter dialect; the engine passes both through untouched.

pub mod adapter;
pub mod errors;
pub mod memory;

pub use adapter::{CreateReceipt, StoreAdapter};
pub use errors::{AdapterError, AdapterResult};
pub use memory::MemoryStore;
