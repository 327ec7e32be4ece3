//! Usage quota HTTP service.
//!
//! Exposes the limiter to the request-handling layer of the analysis API:
//!
//! - `POST /v1/usage/check` counts one metered request and answers `200`
//!   (allowed) or `429` (daily quota exhausted)
//! - `GET /v1/usage` reports today's usage without counting
//! - `GET /health`
//!
//! Caller identity arrives in trusted headers set by the upstream
//! authentication proxy (`x-user-id`, `x-user-class`).

pub mod cli;
mod error;
mod routes;
mod server;
mod state;
mod store;

pub use cli::ServerArgs;
pub use error::ServerError;
pub use routes::router;
pub use server::{DEFAULT_SHUTDOWN_TIMEOUT, build_limiter, run, run_with_shutdown, serve};
pub use state::{AppState, Limiter};
pub use store::{SharedStore, build_store};
pub use tokio_util::sync::CancellationToken;
