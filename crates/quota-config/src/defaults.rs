//! Default value functions for serde deserialization.
//!
//! These functions forward to constants defined in `quota_core::defaults`.

use std::collections::BTreeMap;

use quota_core::defaults;

/// Generate default value functions that forward to quota_core::defaults constants.
macro_rules! default_fns {
    // For Copy types (integers, bool, etc.)
    ($($fn_name:ident => $const_name:ident : $ty:ty),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> $ty {
                defaults::$const_name
            }
        )*
    };
}

/// Generate default value functions that return String from &str constants.
macro_rules! default_string_fns {
    ($($fn_name:ident => $const_name:ident),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> String {
                defaults::$const_name.to_string()
            }
        )*
    };
}

default_fns! {
    default_shutdown_timeout_secs => DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64,
    default_storage_timeout_ms    => DEFAULT_STORAGE_TIMEOUT_MS: u64,
    default_max_connections       => DEFAULT_DB_MAX_CONNECTIONS: u32,
    default_min_connections       => DEFAULT_DB_MIN_CONNECTIONS: u32,
    default_connect_timeout_secs  => DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64,
    default_max_lifetime_secs     => DEFAULT_DB_MAX_LIFETIME_SECS: u64,
    default_idle_timeout_secs     => DEFAULT_DB_IDLE_TIMEOUT_SECS: u64,
    default_init_schema           => DEFAULT_STORAGE_INIT_SCHEMA: bool,
}

default_string_fns! {
    default_listen => DEFAULT_LISTEN,
}

/// Built-in policy: admin unlimited, standard capped.
pub(crate) fn default_policy_classes() -> BTreeMap<String, i64> {
    BTreeMap::from([
        (defaults::ADMIN_CLASS.to_string(), defaults::UNLIMITED_ALLOWANCE),
        (
            defaults::STANDARD_CLASS.to_string(),
            i64::from(defaults::DEFAULT_STANDARD_DAILY_ALLOWANCE),
        ),
    ])
}
