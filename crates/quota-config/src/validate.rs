//! Configuration validation logic.

use std::collections::HashSet;
use std::net::SocketAddr;

use quota_core::defaults::UNLIMITED_ALLOWANCE;

use crate::Config;
use crate::loader::ConfigError;

const DATABASE_SCHEMES: [&str; 5] = ["postgres://", "postgresql://", "mysql://", "mariadb://", "sqlite:"];

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.listen.trim().is_empty() {
        return Err(ConfigError::Validation("server.listen is empty".into()));
    }
    if config.server.listen.parse::<SocketAddr>().is_err() {
        return Err(ConfigError::Validation(format!(
            "server.listen is not a socket address: {}",
            config.server.listen
        )));
    }
    if config.server.shutdown_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "server.shutdown_timeout_secs must be > 0".into(),
        ));
    }

    // Storage
    if let Some(url) = &config.storage.database_url {
        if url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "storage.database_url is empty (omit it for the in-memory store)".into(),
            ));
        }
        if !DATABASE_SCHEMES.iter().any(|s| url.starts_with(s)) {
            return Err(ConfigError::Validation(format!(
                "storage.database_url must start with one of: {:?}",
                DATABASE_SCHEMES
            )));
        }
    }
    if config.storage.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "storage.timeout_ms must be > 0".into(),
        ));
    }
    if config.storage.max_connections == 0 {
        return Err(ConfigError::Validation(
            "storage.max_connections must be > 0".into(),
        ));
    }
    if config.storage.min_connections > config.storage.max_connections {
        return Err(ConfigError::Validation(
            "storage.min_connections cannot exceed storage.max_connections".into(),
        ));
    }

    // Policy
    let mut seen = HashSet::new();
    for (class, &allowance) in &config.policy.classes {
        let name = class.trim().to_ascii_lowercase();
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "policy.classes contains an empty class name".into(),
            ));
        }
        // Class lookup is case-insensitive
        if !seen.insert(name) {
            return Err(ConfigError::Validation(format!(
                "policy.classes.{class} duplicates another class (names are case-insensitive)"
            )));
        }
        if allowance < UNLIMITED_ALLOWANCE {
            return Err(ConfigError::Validation(format!(
                "policy.classes.{class} must be >= 0, or -1 for unlimited"
            )));
        }
    }
    if let Some(allowance) = config.policy.unknown_class
        && allowance < UNLIMITED_ALLOWANCE
    {
        return Err(ConfigError::Validation(
            "policy.unknown_class must be >= 0, or -1 for unlimited".into(),
        ));
    }

    // Metrics
    if let Some(listen) = &config.metrics.listen
        && listen.parse::<SocketAddr>().is_err()
    {
        return Err(ConfigError::Validation(format!(
            "metrics.listen is not a socket address: {listen}"
        )));
    }

    // Logging
    if let Some(format) = &config.logging.format
        && !["json", "pretty", "compact"].contains(&format.as_str())
    {
        return Err(ConfigError::Validation(
            "logging.format must be 'json', 'pretty' or 'compact'".into(),
        ));
    }
    if let Some(output) = &config.logging.output
        && !["stdout", "stderr"].contains(&output.as_str())
    {
        return Err(ConfigError::Validation(
            "logging.output must be 'stdout' or 'stderr'".into(),
        ));
    }
    Ok(())
}
