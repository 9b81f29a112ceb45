use thiserror::Error;

use crate::key::Key;
use crate::path::{FieldPath, FieldValues, StoreId};

/// Result type alias using WeftError
pub type Result<T> = std::result::Result<T, WeftError>;

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable for programmatic
/// handling, testing, and external API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeftErrorKind {
    // Schema / definition (resolved before any store call)
    UnknownField,
    AmbiguousField,
    DuplicateLeaf,
    UnknownStore,
    InvalidPrerequisite,
    DependencyCycle,

    // Aggregate runtime
    PartialFailure,

    // Ambient
    Serialization,
    Internal,
}

impl WeftErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            WeftErrorKind::UnknownField => "ERR_UNKNOWN_FIELD",
            WeftErrorKind::AmbiguousField => "ERR_AMBIGUOUS_FIELD",
            WeftErrorKind::DuplicateLeaf => "ERR_DUPLICATE_LEAF",
            WeftErrorKind::UnknownStore => "ERR_UNKNOWN_STORE",
            WeftErrorKind::InvalidPrerequisite => "ERR_INVALID_PREREQUISITE",
            WeftErrorKind::DependencyCycle => "ERR_DEPENDENCY_CYCLE",
            WeftErrorKind::PartialFailure => "ERR_PARTIAL_FAILURE",
            WeftErrorKind::Serialization => "ERR_SERIALIZATION",
            WeftErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// One failed per-store call inside an aggregate operation
///
/// Adapter errors are flattened to a stable code plus message here so
/// the report stays `Clone`/`PartialEq` and independent of any adapter
/// crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFailure {
    /// Store whose call failed
    pub store: StoreId,
    /// Operation dispatched to the store ("find", "create", ...)
    pub op: String,
    /// Stable adapter error code (e.g. "ERR_ADAPTER_BACKEND")
    pub code: String,
    /// Human-readable detail from the adapter
    pub message: String,
    /// Leaf paths the failed call was responsible for
    pub paths: Vec<FieldPath>,
}

/// Aggregate outcome where some per-store calls failed and others
/// succeeded
///
/// Carries everything the caller needs to decide whether the partial
/// success is usable: every failure, every field skipped because a
/// prerequisite failed, and the data that did come back. No rollback or
/// compensating action is performed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartialFailureReport {
    /// Aggregate operation ("find", "create", "update", "delete", "save")
    pub op: String,
    /// Per-store failures, in store-id order
    pub failures: Vec<StoreFailure>,
    /// Fields never attempted because a transitive prerequisite failed
    /// (CREATE only)
    pub skipped: Vec<FieldPath>,
    /// Field values that were successfully read or written
    /// (single-record operations)
    pub partial: FieldValues,
    /// Rows the healthy stores matched before the failure (WHERE only)
    pub rows: Vec<(Key, FieldValues)>,
    /// Primary key, when one was known or assigned before the failure
    pub key: Option<Key>,
}

impl PartialFailureReport {
    /// Stores that reported a failure, deduplicated, in order
    pub fn failed_stores(&self) -> Vec<&StoreId> {
        let mut stores: Vec<&StoreId> = self.failures.iter().map(|f| &f.store).collect();
        stores.dedup();
        stores
    }

    /// Whether a given leaf path was covered by a failed call
    pub fn path_failed(&self, path: &FieldPath) -> bool {
        self.failures.iter().any(|f| f.paths.contains(path))
    }
}

/// Comprehensive error taxonomy for Weft operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeftError {
    // ===== Schema / definition errors =====
    /// Requested field is not in the model schema
    #[error("Unknown field: {name}")]
    UnknownField { name: String },

    /// Short name matches two or more leaf paths
    #[error("{name} is ambiguous: matches {candidates:?}")]
    AmbiguousField {
        name: String,
        candidates: Vec<FieldPath>,
    },

    /// Two leaves flatten to the same path
    #[error("Duplicate leaf path in schema: {path}")]
    DuplicateLeaf { path: FieldPath },

    /// A store is referenced that the model does not declare
    #[error("Undeclared store {store} (referenced by {reference})")]
    UnknownStore { store: StoreId, reference: String },

    /// A prerequisite edge names a path that is not a leaf of the model
    #[error("Invalid prerequisite for {path}: {reason}")]
    InvalidPrerequisite { path: FieldPath, reason: String },

    /// The prerequisite graph contains a cycle (fatal at model compile)
    #[error("Dependency cycle among fields: {paths:?}")]
    DependencyCycle { paths: Vec<FieldPath> },

    // ===== Aggregate runtime errors =====
    /// One or more per-store calls failed while others succeeded
    #[error("Partial failure in '{op}': {failed} store call(s) failed, {skipped} field(s) skipped",
            op = .0.op, failed = .0.failures.len(), skipped = .0.skipped.len())]
    PartialFailure(Box<PartialFailureReport>),

    // ===== Ambient errors =====
    /// JSON encoding/decoding error
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl WeftError {
    /// Build a PartialFailure from its report
    pub fn partial(report: PartialFailureReport) -> Self {
        WeftError::PartialFailure(Box::new(report))
    }

    /// Get the error kind
    pub fn kind(&self) -> WeftErrorKind {
        match self {
            WeftError::UnknownField { .. } => WeftErrorKind::UnknownField,
            WeftError::AmbiguousField { .. } => WeftErrorKind::AmbiguousField,
            WeftError::DuplicateLeaf { .. } => WeftErrorKind::DuplicateLeaf,
            WeftError::UnknownStore { .. } => WeftErrorKind::UnknownStore,
            WeftError::InvalidPrerequisite { .. } => WeftErrorKind::InvalidPrerequisite,
            WeftError::DependencyCycle { .. } => WeftErrorKind::DependencyCycle,
            WeftError::PartialFailure(_) => WeftErrorKind::PartialFailure,
            WeftError::Serialization { .. } => WeftErrorKind::Serialization,
            WeftError::Internal { .. } => WeftErrorKind::Internal,
        }
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// The partial-failure report, if this is a partial failure
    pub fn partial_report(&self) -> Option<&PartialFailureReport> {
        match self {
            WeftError::PartialFailure(report) => Some(report),
            _ => None,
        }
    }
}

/// Conversion from serde_json::Error to WeftError
impl From<serde_json::Error> for WeftError {
    fn from(err: serde_json::Error) -> Self {
        WeftError::Serialization {
            message: err.to_string(),
        }
    }
}
