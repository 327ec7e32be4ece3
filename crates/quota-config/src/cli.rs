//! CLI override definitions and application logic.

use clap::Parser;

use crate::Config;

#[derive(Debug, Clone, Parser, Default)]
pub struct CliOverrides {
    /// Override server listen address, e.g. 0.0.0.0:8080
    #[arg(long)]
    pub listen: Option<String>,
    /// Override database URL (postgres://, mysql://, sqlite:)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
    /// Override storage round-trip timeout (milliseconds)
    #[arg(long)]
    pub storage_timeout_ms: Option<u64>,
    /// Override maximum pooled database connections
    #[arg(long)]
    pub db_max_connections: Option<u32>,
    /// Skip creating the usage table on startup
    #[arg(long)]
    pub no_init_schema: bool,
    /// Set a class allowance, CLASS=N (-1 = unlimited; repeatable or comma-separated)
    #[arg(long = "policy", value_parser = parse_policy_entry, num_args = 1.., value_delimiter = ',')]
    pub policy: Option<Vec<(String, i64)>>,
    /// Override allowance for unknown classes (-1 = unlimited)
    #[arg(long, allow_hyphen_values = true)]
    pub unknown_class_allowance: Option<i64>,
    /// Override metrics listen address
    #[arg(long)]
    pub metrics_listen: Option<String>,
    /// Override log level (trace/debug/info/warn/error)
    #[arg(long)]
    pub log_level: Option<String>,
    /// Override log format (json/pretty/compact)
    #[arg(long)]
    pub log_format: Option<String>,
}

/// Parse `CLASS=N`.
fn parse_policy_entry(s: &str) -> Result<(String, i64), String> {
    let (class, allowance) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CLASS=N, got {s:?}"))?;
    let allowance = allowance
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid allowance for {class:?}: {e}"))?;
    Ok((class.trim().to_string(), allowance))
}

pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) {
    if let Some(v) = &overrides.listen {
        config.server.listen = v.clone();
    }
    if let Some(v) = &overrides.database_url {
        config.storage.database_url = Some(v.clone());
    }
    if let Some(v) = overrides.storage_timeout_ms {
        config.storage.timeout_ms = v;
    }
    if let Some(v) = overrides.db_max_connections {
        config.storage.max_connections = v;
    }
    if overrides.no_init_schema {
        config.storage.init_schema = false;
    }
    // Entries merge into the table rather than replacing it
    if let Some(entries) = &overrides.policy {
        for (class, allowance) in entries {
            config
                .policy
                .classes
                .retain(|k, _| !k.trim().eq_ignore_ascii_case(class));
            config.policy.classes.insert(class.clone(), *allowance);
        }
    }
    if let Some(v) = overrides.unknown_class_allowance {
        config.policy.unknown_class = Some(v);
    }
    if let Some(v) = &overrides.metrics_listen {
        config.metrics.listen = Some(v.clone());
    }
    if let Some(v) = &overrides.log_level {
        config.logging.level = Some(v.clone());
    }
    if let Some(v) = &overrides.log_format {
        config.logging.format = Some(v.clone());
    }
}
