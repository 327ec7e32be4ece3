//! Daily usage limiter.
//!
//! [`UsageLimiter`] wraps any [`UsageStore`] and provides:
//! - Policy resolution (with a distinct fallback for unknown classes)
//! - A storage-free fast path for unlimited classes
//! - Atomic per-day counting through the store's upsert primitive
//! - Fail-open on storage errors and timeouts

use std::future::Future;
use std::time::{Duration, Instant};

use quota_core::defaults::DEFAULT_STORAGE_TIMEOUT_MS;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock, next_utc_midnight};
use crate::decision::{Decision, UsageSnapshot};
use crate::error::LimiterError;
use crate::policy::{Allowance, PolicySource, PolicyTable};
use crate::store::UsageStore;
use crate::user::{UserClass, UserId};

#[cfg(test)]
mod tests;

/// Per-user, per-UTC-day request limiter.
///
/// The limiter keeps no counts in process memory; the store is the single
/// source of truth, so any number of limiter instances may share one store.
///
/// # Type parameters
///
/// - `S` - the counter store (e.g. `SqlUsageStore`, `MemoryUsageStore`)
/// - `C` - the clock, [`SystemClock`] unless overridden for tests
pub struct UsageLimiter<S: UsageStore, C: Clock = SystemClock> {
    store: S,
    policy: PolicyTable,
    clock: C,
    storage_timeout: Duration,
}

impl<S: UsageStore> UsageLimiter<S> {
    /// Create a limiter over `store` using the system clock.
    pub fn new(store: S, policy: PolicyTable) -> Self {
        Self {
            store,
            policy,
            clock: SystemClock,
            storage_timeout: Duration::from_millis(DEFAULT_STORAGE_TIMEOUT_MS),
        }
    }
}

impl<S: UsageStore, C: Clock> UsageLimiter<S, C> {
    /// Replace the clock.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> UsageLimiter<S, C2> {
        UsageLimiter {
            store: self.store,
            policy: self.policy,
            clock,
            storage_timeout: self.storage_timeout,
        }
    }

    /// Builder: bound on each storage round trip.
    pub fn storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    /// Get a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> &PolicyTable {
        &self.policy
    }

    /// Current time according to the limiter's clock.
    #[inline]
    pub fn now_utc(&self) -> OffsetDateTime {
        self.clock.now_utc()
    }

    /// Count one metered request for `user_id` and decide whether to
    /// service it.
    ///
    /// Never fails: storage errors and timeouts are logged and the request
    /// is allowed without usage metadata.
    pub async fn check_and_record(&self, user_id: &UserId, class: &UserClass) -> Decision {
        let started = Instant::now();

        let decision = match self.try_check_and_record(user_id, class).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    class = %class,
                    error = %e,
                    "usage check failed, allowing request"
                );
                quota_metrics::record_storage_error(e.error_type());
                Decision::allowed_degraded()
            }
        };

        if let Decision::Rejected { usage } = &decision {
            debug!(
                user_id = %user_id,
                class = %class,
                current = usage.current,
                limit = %usage.limit,
                "daily quota exceeded"
            );
        }

        quota_metrics::record_check(outcome_label(&decision));
        quota_metrics::record_check_duration(started.elapsed().as_secs_f64());
        decision
    }

    /// Like [`check_and_record`](Self::check_and_record), but returns
    /// storage failures instead of failing open.
    pub async fn try_check_and_record(
        &self,
        user_id: &UserId,
        class: &UserClass,
    ) -> Result<Decision, LimiterError> {
        let allowance = self.resolve(user_id, class);
        let today = self.clock.today();
        let reset_time = next_utc_midnight(today);

        if allowance.is_unlimited() {
            return Ok(Decision::Allowed {
                usage: Some(UsageSnapshot::new(allowance, 0, reset_time)),
            });
        }

        let count = self.bounded(self.store.increment(user_id, today)).await?;
        let usage = UsageSnapshot::new(allowance, count, reset_time);

        if allowance.is_exceeded_by(count) {
            Ok(Decision::Rejected { usage })
        } else {
            Ok(Decision::Allowed { usage: Some(usage) })
        }
    }

    /// Today's usage for `user_id`, without recording anything.
    ///
    /// Unlimited classes report zero without touching storage, since the
    /// unlimited path never writes a counter.
    pub async fn current_usage(
        &self,
        user_id: &UserId,
        class: &UserClass,
    ) -> Result<UsageSnapshot, LimiterError> {
        let allowance = self.resolve(user_id, class);
        let today = self.clock.today();
        let reset_time = next_utc_midnight(today);

        if allowance.is_unlimited() {
            return Ok(UsageSnapshot::new(allowance, 0, reset_time));
        }

        quota_metrics::record_usage_read();
        let current = self
            .bounded(self.store.get(user_id, today))
            .await?
            .map(|r| r.request_count)
            .unwrap_or(0);

        Ok(UsageSnapshot::new(allowance, current, reset_time))
    }

    fn resolve(&self, user_id: &UserId, class: &UserClass) -> Allowance {
        let resolved = self.policy.resolve(class);
        if resolved.source == PolicySource::UnknownClassFallback {
            warn!(
                user_id = %user_id,
                class = %class,
                fallback = %resolved.allowance,
                "no policy for user class, applying fallback allowance"
            );
            quota_metrics::record_policy_fallback();
        }
        resolved.allowance
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, LimiterError>
    where
        F: Future<Output = Result<T, LimiterError>>,
    {
        tokio::time::timeout(self.storage_timeout, fut)
            .await
            .unwrap_or(Err(LimiterError::Timeout(self.storage_timeout)))
    }
}

/// Metrics label for a decision.
fn outcome_label(decision: &Decision) -> &'static str {
    match decision {
        Decision::Rejected { .. } => "rejected",
        Decision::Allowed { usage: None } => "degraded",
        Decision::Allowed { usage: Some(u) } if u.limit.is_unlimited() => "unlimited",
        Decision::Allowed { .. } => "allowed",
    }
}

impl<S, C> std::fmt::Debug for UsageLimiter<S, C>
where
    S: UsageStore + std::fmt::Debug,
    C: Clock,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageLimiter")
            .field("store", &self.store)
            .field("policy_entries", &self.policy.len())
            .field("storage_timeout", &self.storage_timeout)
            .finish_non_exhaustive()
    }
}
