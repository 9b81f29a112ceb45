use thiserror::Error;

/// Result type alias for adapter calls
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

/// Errors an adapter may return from any operation
///
/// `Unsupported` is special: the engine treats it as a successful
/// no-op, per the contract that a store which cannot meaningfully
/// perform an operation stubs it rather than failing (a read-only
/// analytics store declining `update`, for example). Every other
/// variant is a real failure and is aggregated into the operation's
/// partial-failure report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// The adapter declines this operation entirely
    #[error("Operation '{op}' is not supported by this store")]
    Unsupported { op: String },

    /// No record for the given key (distinct from an empty partial record)
    #[error("Record not found")]
    NotFound,

    /// The store rejected the write (constraint violation, duplicate key)
    #[error("Store rejected the write: {message}")]
    Conflict { message: String },

    /// Backend-level failure (connection, timeout, internal error)
    #[error("Store backend error: {message}")]
    Backend { message: String },
}

impl AdapterError {
    /// Decline an operation by name
    pub fn unsupported(op: &str) -> Self {
        AdapterError::Unsupported { op: op.to_string() }
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            AdapterError::Unsupported { .. } => "ERR_ADAPTER_UNSUPPORTED",
            AdapterError::NotFound => "ERR_ADAPTER_NOT_FOUND",
            AdapterError::Conflict { .. } => "ERR_ADAPTER_CONFLICT",
            AdapterError::Backend { .. } => "ERR_ADAPTER_BACKEND",
        }
    }

    /// Whether the engine should treat this as a success no-op
    pub fn is_declined(&self) -> bool {
        matches!(self, AdapterError::Unsupported { .. })
    }
}
