//! Configuration type definitions for server, storage, policy, metrics, and logging.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address, e.g. `0.0.0.0:8080`.
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Seconds to wait for in-flight requests on shutdown.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

/// Usage counter storage.
///
/// Without a `database_url` the service keeps counters in process memory,
/// which is only correct for a single instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database URL (`postgres://`, `mysql://`, `sqlite:`).
    #[serde(default)]
    pub database_url: Option<String>,
    /// Bound on each storage round trip; exceeding it fails open.
    #[serde(default = "default_storage_timeout_ms")]
    pub timeout_ms: u64,
    /// Create the usage table on startup if missing.
    #[serde(default = "default_init_schema")]
    pub init_schema: bool,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_max_lifetime_secs")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            timeout_ms: default_storage_timeout_ms(),
            init_schema: default_init_schema(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_lifetime_secs: default_max_lifetime_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

/// Daily allowance per user class. `-1` means unlimited.
///
/// A configured `classes` table replaces the built-in one entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_policy_classes")]
    pub classes: BTreeMap<String, i64>,
    /// Allowance for classes missing from `classes`. Defaults to the most
    /// restrictive finite allowance in the table.
    #[serde(default)]
    pub unknown_class: Option<i64>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            classes: default_policy_classes(),
            unknown_class: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Prometheus exporter listen address. Disabled when unset.
    #[serde(default)]
    pub listen: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: Option<String>,
    /// Log format: json, pretty, or compact. Default: pretty.
    pub format: Option<String>,
    /// Output target: stdout or stderr. Default: stderr.
    pub output: Option<String>,
    /// Per-module log level filters (e.g., {"quota_limiter": "debug", "sqlx": "warn"}).
    #[serde(default)]
    pub filters: HashMap<String, String>,
}
