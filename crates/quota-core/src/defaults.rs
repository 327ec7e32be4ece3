//! Default configuration values.
//!
//! Centralized default constants for use across all crates.

// ============================================================================
// Policy Defaults
// ============================================================================

/// Sentinel allowance meaning "no daily limit".
pub const UNLIMITED_ALLOWANCE: i64 = -1;
/// Default daily allowance for the standard user class.
pub const DEFAULT_STANDARD_DAILY_ALLOWANCE: u32 = 5;
/// Class name for privileged (unlimited) callers.
pub const ADMIN_CLASS: &str = "admin";
/// Class name for regular callers.
pub const STANDARD_CLASS: &str = "standard";

// ============================================================================
// Storage Defaults
// ============================================================================

/// Name of the usage counter table.
pub const USAGE_TABLE: &str = "usage_records";
/// Default bound on a single storage round trip, in milliseconds.
pub const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 2000;
/// Default maximum pooled database connections.
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
/// Default minimum pooled database connections.
pub const DEFAULT_DB_MIN_CONNECTIONS: u32 = 1;
/// Default pool acquire timeout in seconds.
pub const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 30;
/// Default maximum connection lifetime in seconds (30 minutes).
pub const DEFAULT_DB_MAX_LIFETIME_SECS: u64 = 1800;
/// Default idle connection timeout in seconds (10 minutes).
pub const DEFAULT_DB_IDLE_TIMEOUT_SECS: u64 = 600;
/// Create the usage table on startup when it is missing.
pub const DEFAULT_STORAGE_INIT_SCHEMA: bool = true;
/// Maximum accepted length of a user identifier, in bytes.
pub const MAX_USER_ID_LEN: usize = 255;

// ============================================================================
// Server Defaults
// ============================================================================

/// Default HTTP listen address.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";
/// Default graceful shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;
/// Header carrying the authenticated user identifier.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the authenticated user class.
pub const USER_CLASS_HEADER: &str = "x-user-class";

// ============================================================================
// Logging Defaults
// ============================================================================

/// Default log level when neither config nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";
