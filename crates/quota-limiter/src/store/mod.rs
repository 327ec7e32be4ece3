//! Usage counter storage.
//!
//! This module provides:
//!
//! - [`UsageRecord`] - one (user, UTC day) counter row
//! - [`UsageStore`] - data-access trait (implement this for new backends)
//! - [`MemoryUsageStore`] - process-local store for tests and single-node use
//!
//! The SQL-backed store lives in [`crate::sql`].
//!
//! # Adding a new backend
//!
//! ```ignore
//! use quota_limiter::store::{UsageStore, UsageRecord};
//!
//! struct MyStore { /* ... */ }
//!
//! #[async_trait::async_trait]
//! impl UsageStore for MyStore {
//!     async fn increment(&self, user_id: &UserId, date: Date) -> Result<u64, LimiterError> { todo!() }
//!     async fn get(&self, user_id: &UserId, date: Date) -> Result<Option<UsageRecord>, LimiterError> { todo!() }
//!     async fn list(&self, date: Date) -> Result<Vec<UsageRecord>, LimiterError> { todo!() }
//! }
//! ```

mod memory;
mod record;
mod traits;

pub use memory::MemoryUsageStore;
pub use record::UsageRecord;
pub use traits::UsageStore;
