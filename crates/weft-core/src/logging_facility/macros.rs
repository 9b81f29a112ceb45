//! Canonical logging macros
//!
//! These macros provide a structured, consistent way to log aggregate
//! operations at the engine boundary.

/// Log the start of an aggregate operation
///
/// # Example
///
/// ```
/// # use weft_core::log_op_start;
/// log_op_start!("find");
/// log_op_start!("find", model = "User");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = weft_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = weft_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an aggregate operation
///
/// # Example
///
/// ```
/// # use weft_core::log_op_end;
/// log_op_end!("find", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = weft_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = weft_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an aggregate operation error
///
/// The error must be a [`crate::WeftError`]; its stable kind and code
/// are attached to the event.
///
/// # Example
///
/// ```
/// # use weft_core::{log_op_error, WeftError};
/// let err = WeftError::UnknownField { name: "shoeSize".to_string() };
/// log_op_error!("find", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let err: &$crate::WeftError = &$err;
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = weft_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?err.kind(),
            err_code = err.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let err: &$crate::WeftError = &$err;
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = weft_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?err.kind(),
            err_code = err.code(),
            $($field)*
        );
    }};
}
