//! Data-access trait for usage stores.

use std::sync::Arc;

use async_trait::async_trait;
use time::Date;

use crate::error::LimiterError;
use crate::user::UserId;

use super::UsageRecord;

/// Storage for per-user daily request counters.
///
/// Implementations must be thread-safe (`Send + Sync`); they are shared by
/// every concurrent request handler, and possibly by several service
/// instances through the same database.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Atomically create the `(user_id, date)` counter at 1 or add 1 to it,
    /// returning the post-increment count.
    ///
    /// Two concurrent calls for the same key must never both observe the
    /// same result: this has to be one atomic storage operation, not a read
    /// followed by a write.
    async fn increment(&self, user_id: &UserId, date: Date) -> Result<u64, LimiterError>;

    /// Point read of the `(user_id, date)` counter. Never creates a record.
    async fn get(&self, user_id: &UserId, date: Date)
    -> Result<Option<UsageRecord>, LimiterError>;

    /// All counters for `date`, ordered by user id.
    async fn list(&self, date: Date) -> Result<Vec<UsageRecord>, LimiterError>;
}

/// Blanket implementation for `Arc<S>` where `S: UsageStore`.
///
/// This allows sharing one store between the limiter and reporting code.
#[async_trait]
impl<S: UsageStore + ?Sized> UsageStore for Arc<S> {
    #[inline]
    async fn increment(&self, user_id: &UserId, date: Date) -> Result<u64, LimiterError> {
        (**self).increment(user_id, date).await
    }

    #[inline]
    async fn get(
        &self,
        user_id: &UserId,
        date: Date,
    ) -> Result<Option<UsageRecord>, LimiterError> {
        (**self).get(user_id, date).await
    }

    #[inline]
    async fn list(&self, date: Date) -> Result<Vec<UsageRecord>, LimiterError> {
        (**self).list(date).await
    }
}

/// Blanket implementation for `Box<S>` where `S: UsageStore`.
#[async_trait]
impl<S: UsageStore + ?Sized> UsageStore for Box<S> {
    #[inline]
    async fn increment(&self, user_id: &UserId, date: Date) -> Result<u64, LimiterError> {
        (**self).increment(user_id, date).await
    }

    #[inline]
    async fn get(
        &self,
        user_id: &UserId,
        date: Date,
    ) -> Result<Option<UsageRecord>, LimiterError> {
        (**self).get(user_id, date).await
    }

    #[inline]
    async fn list(&self, date: Date) -> Result<Vec<UsageRecord>, LimiterError> {
        (**self).list(date).await
    }
}
