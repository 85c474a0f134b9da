//! Canonical logging macros
//!
//! Callers must depend on `backdrop-core-types` for the event name constants.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use backdrop_core::log_op_start;
/// log_op_start!("add_asset");
/// log_op_start!("delete_asset", asset_id = "1700000000000_abc123");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {{
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = backdrop_core_types::schema::EVENT_START,
        );
    }};
    ($op:expr, $($field:tt)*) => {{
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = backdrop_core_types::schema::EVENT_START,
            $($field)*
        );
    }};
}

/// Log the successful end of an operation
///
/// ```
/// # use backdrop_core::log_op_end;
/// log_op_end!("add_asset", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {{
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = backdrop_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    }};
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = backdrop_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    }};
}

/// Log an operation error
///
/// Accepts anything convertible into [`crate::errors::BdError`]; the error is
/// cloned so the caller can still return it.
///
/// ```
/// # use backdrop_core::log_op_error;
/// # use backdrop_core::errors::CatalogError;
/// let err = CatalogError::AssetNotFound { asset_id: "a1".to_string() };
/// log_op_error!("set_current", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let bd_err: $crate::errors::BdError = $err.clone().into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = backdrop_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?bd_err.kind(),
            err_code = bd_err.code(),
            err = %bd_err,
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let bd_err: $crate::errors::BdError = $err.clone().into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = backdrop_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?bd_err.kind(),
            err_code = bd_err.code(),
            err = %bd_err,
            $($field)*
        );
    }};
}
