//! # quota-rs
//!
//! Per-user daily usage quotas for metered AI analysis requests.
//!
//! Each authenticated user gets a daily allowance determined by their class
//! (`admin` unlimited, `standard` five per UTC day by default). Counts live
//! in a shared SQL table and are incremented atomically; when the table is
//! unreachable, requests are let through rather than blocked.
//!
//! ## Crates
//!
//! - [`quota_core`] - Default values and shared constants
//! - [`quota_config`] - Configuration loading and validation
//! - [`quota_limiter`] - Policy table, limiter and usage stores
//! - [`quota_metrics`] - Prometheus-compatible metrics
//! - [`quota_server`] - HTTP service

pub use quota_config as config;
pub use quota_core as core;
pub use quota_limiter as limiter;
pub use quota_metrics as metrics;
pub use quota_server as server;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use quota_config::{Config, load_config, validate_config};
    pub use quota_limiter::sql::{SqlStoreConfig, SqlUsageStore};
    pub use quota_limiter::{
        Allowance, Decision, LimiterError, MemoryUsageStore, PolicyTable, UsageLimiter,
        UsageSnapshot, UsageStore, UserClass, UserId,
    };
    pub use quota_server::{CancellationToken, ServerError, run, run_with_shutdown};
}
