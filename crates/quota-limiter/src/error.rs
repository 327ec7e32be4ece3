//! Limiter error types.

use std::time::Duration;

/// Usage limiter error.
#[derive(Debug, thiserror::Error)]
pub enum LimiterError {
    /// The usage store failed (connection refused, query error, etc.).
    #[error("storage unavailable: {0}")]
    Storage(String),

    /// A storage round trip did not finish within the configured bound.
    #[error("storage timed out after {0:?}")]
    Timeout(Duration),

    /// No policy entry exists for the given user class.
    #[error("no policy for user class '{0}'")]
    PolicyNotFound(String),

    /// The caller identity is missing or malformed.
    #[error("invalid caller: {0}")]
    InvalidCaller(String),
}

impl LimiterError {
    /// Create a storage error from any error type.
    #[inline]
    pub fn storage<E: std::fmt::Display>(err: E) -> Self {
        Self::Storage(err.to_string())
    }

    /// Whether this error comes from the storage layer and falls under the
    /// fail-open policy.
    #[inline]
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Timeout(_))
    }

    /// Get the error type string for metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Storage(_) => quota_core::ERROR_STORAGE,
            Self::Timeout(_) => quota_core::ERROR_TIMEOUT,
            Self::PolicyNotFound(_) => quota_core::ERROR_POLICY,
            Self::InvalidCaller(_) => quota_core::ERROR_INVALID_CALLER,
        }
    }
}

#[cfg(feature = "sql")]
impl From<sqlx::Error> for LimiterError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            // Pool acquire timeout; the bound is owned by the pool config.
            sqlx::Error::PoolTimedOut => Self::Timeout(Duration::ZERO),
            other => Self::Storage(other.to_string()),
        }
    }
}
