//! Server startup and graceful shutdown.

use std::net::SocketAddr;
use std::time::Duration;

use quota_config::Config;
use quota_core::defaults;
use quota_limiter::{PolicyTable, UsageLimiter};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::ServerError;
use crate::routes::router;
use crate::state::{AppState, Limiter};
use crate::store::build_store;

/// Default graceful shutdown timeout.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration =
    Duration::from_secs(defaults::DEFAULT_SHUTDOWN_TIMEOUT_SECS);

/// Build the limiter (store, policy table, storage timeout) from configuration.
pub async fn build_limiter(config: &Config) -> Result<Limiter, ServerError> {
    let policy = PolicyTable::from_config(&config.policy.classes, config.policy.unknown_class)
        .map_err(ServerError::Config)?;
    let store = build_store(&config.storage).await?;

    info!(
        classes = policy.len(),
        unknown_class = %policy.unknown_class_allowance(),
        storage_timeout_ms = config.storage.timeout_ms,
        "usage policy loaded"
    );

    Ok(UsageLimiter::new(store, policy)
        .storage_timeout(Duration::from_millis(config.storage.timeout_ms)))
}

/// Run the server with a cancellation token for graceful shutdown.
pub async fn run_with_shutdown(
    config: Config,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    let listen: SocketAddr = config
        .server
        .listen
        .parse()
        .map_err(|_| ServerError::Config("invalid listen address".into()))?;

    let limiter = build_limiter(&config).await?;

    let listener = TcpListener::bind(listen).await?;
    info!(address = %listen, "listening");

    serve(
        listener,
        AppState::new(limiter),
        shutdown,
        Duration::from_secs(config.server.shutdown_timeout_secs),
    )
    .await
}

/// Serve on an already bound listener until `shutdown` is cancelled.
///
/// In-flight requests get `drain_timeout` to finish; whatever is still
/// running after that is aborted.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
    drain_timeout: Duration,
) -> Result<(), ServerError> {
    let app = router(state);
    let stop = shutdown.clone();

    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { stop.cancelled().await })
            .await
    });

    tokio::select! {
        result = &mut server => return flatten(result),
        _ = shutdown.cancelled() => {}
    }

    info!("shutdown signal received, draining in-flight requests");
    match tokio::time::timeout(drain_timeout, &mut server).await {
        Ok(result) => flatten(result)?,
        Err(_) => {
            warn!(
                timeout_secs = drain_timeout.as_secs(),
                "shutdown timeout, aborting in-flight requests"
            );
            server.abort();
        }
    }

    info!("server stopped");
    Ok(())
}

fn flatten(
    result: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), ServerError> {
    match result {
        Ok(served) => Ok(served?),
        Err(e) => Err(ServerError::Io(std::io::Error::other(e))),
    }
}

/// Run the server (blocking until error, no graceful shutdown).
pub async fn run(config: Config) -> Result<(), ServerError> {
    run_with_shutdown(config, CancellationToken::new()).await
}
