//! Structured logging macros.
//!
//! Every record carries a `source` field naming the emitting component
//! (`"RemoteInterface"`, `"Sai"`, `"RedisChannel"`, ...).
//!
//! # Usage
//! ```ignore
//! info_log!("RemoteInterface", switch = %oid, "connected to existing switch");
//! ```

/// Debug-level record: per-request keys and payload sizes.
#[macro_export]
macro_rules! debug_log {
    ($source:expr, $($arg:tt)*) => {
        tracing::debug!(
            source = $source,
            $($arg)*
        )
    };
}

/// Info-level record: mode transitions, view switches, state resets.
#[macro_export]
macro_rules! info_log {
    ($source:expr, $($arg:tt)*) => {
        tracing::info!(
            source = $source,
            $($arg)*
        )
    };
}

/// Warning-level record: deprecated paths and degraded lookups.
#[macro_export]
macro_rules! warn_log {
    ($source:expr, $($arg:tt)*) => {
        tracing::warn!(
            source = $source,
            $($arg)*
        )
    };
}

/// Error-level record: caller errors and remote failures.
#[macro_export]
macro_rules! error_log {
    ($source:expr, $($arg:tt)*) => {
        tracing::error!(
            source = $source,
            $($arg)*
        )
    };
}
