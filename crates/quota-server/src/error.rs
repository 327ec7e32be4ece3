//! Server error types.

use quota_limiter::LimiterError;
use quota_metrics::{ERROR_CONFIG, ERROR_IO};

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config: {0}")]
    Config(String),
    #[error("limiter: {0}")]
    Limiter(#[from] LimiterError),
}

impl ServerError {
    /// Get the error type string for metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            ServerError::Io(_) => ERROR_IO,
            ServerError::Config(_) => ERROR_CONFIG,
            ServerError::Limiter(e) => e.error_type(),
        }
    }
}
