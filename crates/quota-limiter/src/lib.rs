//! Per-user daily usage limiting.
//!
//! This crate meters an expensive action (AI analysis requests) per user and
//! per UTC calendar day. Counts live in an external store that offers an
//! atomic "insert, or increment if present" primitive; the limiter itself is
//! stateless and fails open when the store is unavailable.
//!
//! # Example
//!
//! ```
//! use quota_limiter::{MemoryUsageStore, PolicyTable, UsageLimiter, UserClass, UserId};
//!
//! # async fn example() -> Result<(), quota_limiter::LimiterError> {
//! let limiter = UsageLimiter::new(MemoryUsageStore::new(), PolicyTable::default());
//!
//! let user = UserId::parse("coach-42")?;
//! let decision = limiter.check_and_record(&user, &UserClass::standard()).await;
//! assert!(decision.is_allowed());
//!
//! let usage = limiter.current_usage(&user, &UserClass::standard()).await?;
//! assert_eq!(usage.current, 1);
//! # Ok(())
//! # }
//! ```

mod clock;
mod decision;
mod error;
mod limiter;
mod policy;
mod user;

pub mod store;

#[cfg(feature = "sql")]
pub mod sql;

#[cfg(feature = "cli")]
pub mod cli;

pub use clock::{Clock, ManualClock, SystemClock, next_utc_midnight};
pub use decision::{Decision, LimitDisplay, UsageBody, UsageSnapshot};
pub use error::LimiterError;
pub use limiter::UsageLimiter;
pub use policy::{Allowance, PolicySource, PolicyTable, Resolved};
pub use store::{MemoryUsageStore, UsageRecord, UsageStore};
pub use user::{UserClass, UserId};

#[cfg(feature = "cli")]
pub use cli::AdminArgs;
