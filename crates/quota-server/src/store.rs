//! Usage store selection from configuration.

use std::sync::Arc;
use std::time::Duration;

use quota_config::StorageConfig;
use quota_limiter::sql::{SqlStoreConfig, SqlUsageStore};
use quota_limiter::{MemoryUsageStore, UsageStore};
use tracing::{info, warn};

use crate::error::ServerError;

/// Type-erased store shared by the limiter.
pub type SharedStore = Arc<dyn UsageStore>;

/// Connect the configured store.
///
/// With no `database_url` the counters live in process memory; that is
/// only correct for a single instance and is logged as such.
pub async fn build_store(config: &StorageConfig) -> Result<SharedStore, ServerError> {
    let Some(url) = config.database_url.as_deref() else {
        warn!(
            "no storage.database_url configured, counting usage in process memory \
             (not shared between instances, lost on restart)"
        );
        return Ok(Arc::new(MemoryUsageStore::new()));
    };

    let sql_config = SqlStoreConfig::new(url)
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs));

    let store = SqlUsageStore::connect(sql_config).await?;
    if config.init_schema {
        store.init_schema().await?;
    }
    info!(
        db_type = ?store.database_type(),
        max_connections = config.max_connections,
        init_schema = config.init_schema,
        "usage store ready"
    );
    Ok(Arc::new(store))
}
