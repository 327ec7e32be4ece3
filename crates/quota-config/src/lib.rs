//! Configuration loading and CLI definitions.
//!
//! A configuration file is optional: every section has defaults, so an empty
//! file (or none at all) yields a service on [`DEFAULT_LISTEN`] with the
//! in-memory store and the built-in policy table.
//!
//! [`DEFAULT_LISTEN`]: quota_core::defaults::DEFAULT_LISTEN

mod cli;
mod defaults;
mod loader;
mod types;
mod validate;


use serde::{Deserialize, Serialize};

pub use cli::{CliOverrides, apply_overrides};
pub use loader::{ConfigError, load_config, parse_config};
pub use types::*;
pub use validate::validate_config;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}
