//! Error type constants for metrics and logging.
//!
//! These constants provide consistent error classification across all crates.

/// Usage store failure (connection refused, query error).
pub const ERROR_STORAGE: &str = "storage";
/// Storage call exceeded the configured timeout.
pub const ERROR_TIMEOUT: &str = "timeout";
/// Caller identity missing or malformed.
pub const ERROR_INVALID_CALLER: &str = "invalid_caller";
/// No policy entry for the caller's class.
pub const ERROR_POLICY: &str = "policy";
/// I/O error.
pub const ERROR_IO: &str = "io";
/// Configuration error.
pub const ERROR_CONFIG: &str = "config";
