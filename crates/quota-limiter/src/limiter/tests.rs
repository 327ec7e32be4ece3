//! Tests for the usage limiter.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use time::Date;
use time::macros::{date, datetime};

use crate::clock::ManualClock;
use crate::store::{MemoryUsageStore, UsageRecord, UsageStore};
use crate::{Allowance, Decision, LimiterError, PolicyTable, UsageLimiter, UserClass, UserId};

/// Store wrapper that counts calls.
#[derive(Default)]
struct CountingStore {
    inner: MemoryUsageStore,
    increments: AtomicUsize,
    reads: AtomicUsize,
}

#[async_trait]
impl UsageStore for CountingStore {
    async fn increment(&self, user_id: &UserId, date: Date) -> Result<u64, LimiterError> {
        self.increments.fetch_add(1, Ordering::SeqCst);
        self.inner.increment(user_id, date).await
    }

    async fn get(
        &self,
        user_id: &UserId,
        date: Date,
    ) -> Result<Option<UsageRecord>, LimiterError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(user_id, date).await
    }

    async fn list(&self, date: Date) -> Result<Vec<UsageRecord>, LimiterError> {
        self.inner.list(date).await
    }
}

/// Store that always fails.
struct FailingStore;

#[async_trait]
impl UsageStore for FailingStore {
    async fn increment(&self, _user_id: &UserId, _date: Date) -> Result<u64, LimiterError> {
        Err(LimiterError::storage("connection refused"))
    }

    async fn get(
        &self,
        _user_id: &UserId,
        _date: Date,
    ) -> Result<Option<UsageRecord>, LimiterError> {
        Err(LimiterError::storage("connection refused"))
    }

    async fn list(&self, _date: Date) -> Result<Vec<UsageRecord>, LimiterError> {
        Err(LimiterError::storage("connection refused"))
    }
}

/// Store that fails every `every`-th increment before touching the counter.
struct FlakyStore {
    inner: MemoryUsageStore,
    every: usize,
    calls: AtomicUsize,
    faults: AtomicUsize,
}

#[async_trait]
impl UsageStore for FlakyStore {
    async fn increment(&self, user_id: &UserId, date: Date) -> Result<u64, LimiterError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n % self.every == 0 {
            self.faults.fetch_add(1, Ordering::SeqCst);
            return Err(LimiterError::storage("simulated fault"));
        }
        self.inner.increment(user_id, date).await
    }

    async fn get(
        &self,
        user_id: &UserId,
        date: Date,
    ) -> Result<Option<UsageRecord>, LimiterError> {
        self.inner.get(user_id, date).await
    }

    async fn list(&self, date: Date) -> Result<Vec<UsageRecord>, LimiterError> {
        self.inner.list(date).await
    }
}

/// Store whose increments never finish in time.
struct SlowStore;

#[async_trait]
impl UsageStore for SlowStore {
    async fn increment(&self, _user_id: &UserId, _date: Date) -> Result<u64, LimiterError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(1)
    }

    async fn get(
        &self,
        _user_id: &UserId,
        _date: Date,
    ) -> Result<Option<UsageRecord>, LimiterError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(None)
    }

    async fn list(&self, _date: Date) -> Result<Vec<UsageRecord>, LimiterError> {
        Ok(Vec::new())
    }
}

fn user(id: &str) -> UserId {
    UserId::parse(id).unwrap()
}

fn clock() -> ManualClock {
    ManualClock::new(datetime!(2026-10-19 09:30 UTC))
}

fn limiter<S: UsageStore>(store: S) -> UsageLimiter<S, ManualClock> {
    UsageLimiter::new(store, PolicyTable::default()).with_clock(clock())
}

#[tokio::test]
async fn test_standard_user_five_then_rejected() {
    let limiter = limiter(MemoryUsageStore::new());
    let u = user("coach-1");
    let class = UserClass::standard();

    for i in 1..=5u64 {
        let decision = limiter.check_and_record(&u, &class).await;
        let Decision::Allowed { usage: Some(usage) } = decision else {
            panic!("call {i} should be allowed with usage, got {decision:?}");
        };
        assert_eq!(usage.current, i);
        assert_eq!(usage.remaining, Some(5 - i));
        assert_eq!(usage.limit, Allowance::Daily(5));
    }

    let decision = limiter.check_and_record(&u, &class).await;
    let Decision::Rejected { usage } = decision else {
        panic!("sixth call should be rejected, got {decision:?}");
    };
    assert_eq!(usage.current, 6);
    assert_eq!(usage.limit, Allowance::Daily(5));
    assert_eq!(usage.remaining, Some(0));
    assert_eq!(usage.reset_time, datetime!(2026-10-20 00:00 UTC));
}

#[tokio::test]
async fn test_rejected_requests_are_still_counted() {
    let limiter = limiter(MemoryUsageStore::new());
    let u = user("coach-1");
    for _ in 0..8 {
        limiter.check_and_record(&u, &UserClass::standard()).await;
    }
    let record = limiter
        .store()
        .get(&u, date!(2026 - 10 - 19))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.request_count, 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unlimited_class_never_touches_storage() {
    let limiter = Arc::new(limiter(CountingStore::default()));
    let handles: Vec<_> = (0..50)
        .map(|_| {
            let limiter = limiter.clone();
            tokio::spawn(async move {
                limiter
                    .check_and_record(&user("analyst"), &UserClass::admin())
                    .await
            })
        })
        .collect();

    for h in handles {
        let decision = h.await.unwrap();
        assert!(decision.is_allowed());
        assert!(decision.usage().unwrap().limit.is_unlimited());
    }
    assert_eq!(limiter.store().increments.load(Ordering::SeqCst), 0);

    let snapshot = limiter
        .current_usage(&user("analyst"), &UserClass::admin())
        .await
        .unwrap();
    assert_eq!(snapshot.current, 0);
    assert_eq!(snapshot.remaining, None);
    assert_eq!(limiter.store().reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_current_usage_is_read_only() {
    let limiter = limiter(CountingStore::default());
    let u = user("coach-2");
    let class = UserClass::standard();

    let empty = limiter.current_usage(&u, &class).await.unwrap();
    assert_eq!(empty.current, 0);
    assert_eq!(empty.remaining, Some(5));
    assert!(limiter.store().inner.is_empty());

    limiter.check_and_record(&u, &class).await;
    limiter.check_and_record(&u, &class).await;

    let first = limiter.current_usage(&u, &class).await.unwrap();
    let second = limiter.current_usage(&u, &class).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.current, 2);
    assert_eq!(first.remaining, Some(3));
    assert_eq!(limiter.store().increments.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_current_usage_floors_remaining() {
    let limiter = limiter(MemoryUsageStore::from_records([(
        user("coach-3"),
        date!(2026 - 10 - 19),
        11,
    )]));
    let snapshot = limiter
        .current_usage(&user("coach-3"), &UserClass::standard())
        .await
        .unwrap();
    assert_eq!(snapshot.current, 11);
    assert_eq!(snapshot.remaining, Some(0));
}

#[tokio::test]
async fn test_day_rollover_starts_new_counter() {
    let clock = ManualClock::new(datetime!(2026-10-19 23:59:00 UTC));
    let limiter =
        UsageLimiter::new(MemoryUsageStore::new(), PolicyTable::default()).with_clock(clock.clone());
    let u = user("coach-4");
    let class = UserClass::standard();

    for _ in 0..6 {
        limiter.check_and_record(&u, &class).await;
    }
    assert!(!limiter.check_and_record(&u, &class).await.is_allowed());

    clock.advance(time::Duration::minutes(2));

    let decision = limiter.check_and_record(&u, &class).await;
    let Decision::Allowed { usage: Some(usage) } = decision else {
        panic!("expected allowed after rollover, got {decision:?}");
    };
    assert_eq!(usage.current, 1);
    assert_eq!(usage.reset_time, datetime!(2026-10-21 00:00 UTC));

    // Yesterday's record is untouched.
    let old = limiter
        .store()
        .get(&u, date!(2026 - 10 - 19))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(old.request_count, 7);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_checks_count_exactly() {
    let policy = PolicyTable::from_entries([("standard", Allowance::Daily(1000))], None);
    let limiter = Arc::new(
        UsageLimiter::new(MemoryUsageStore::new(), policy).with_clock(clock()),
    );

    let handles: Vec<_> = (0..300)
        .map(|_| {
            let limiter = limiter.clone();
            tokio::spawn(async move {
                limiter
                    .check_and_record(&user("coach-5"), &UserClass::standard())
                    .await
            })
        })
        .collect();

    let mut seen = Vec::new();
    for h in handles {
        let decision = h.await.unwrap();
        seen.push(decision.usage().unwrap().current);
    }
    seen.sort_unstable();
    assert_eq!(seen, (1..=300).collect::<Vec<u64>>());

    let record = limiter
        .store()
        .get(&user("coach-5"), date!(2026 - 10 - 19))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.request_count, 300);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_checks_with_faults_exclude_failed_calls() {
    let store = FlakyStore {
        inner: MemoryUsageStore::new(),
        every: 7,
        calls: AtomicUsize::new(0),
        faults: AtomicUsize::new(0),
    };
    let policy = PolicyTable::from_entries([("standard", Allowance::Daily(10_000))], None);
    let limiter = Arc::new(UsageLimiter::new(store, policy).with_clock(clock()));

    let handles: Vec<_> = (0..140)
        .map(|_| {
            let limiter = limiter.clone();
            tokio::spawn(async move {
                limiter
                    .check_and_record(&user("coach-6"), &UserClass::standard())
                    .await
            })
        })
        .collect();

    let mut degraded = 0u64;
    for h in handles {
        let decision = h.await.unwrap();
        assert!(decision.is_allowed());
        if decision.usage().is_none() {
            degraded += 1;
        }
    }

    let faults = limiter.store().faults.load(Ordering::SeqCst) as u64;
    assert_eq!(faults, 20);
    assert_eq!(degraded, faults);

    let record = limiter
        .store()
        .get(&user("coach-6"), date!(2026 - 10 - 19))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.request_count, 140 - faults);
}

#[tokio::test]
async fn test_storage_failure_fails_open() {
    let limiter = limiter(FailingStore);
    let u = user("coach-7");

    for _ in 0..10 {
        let decision = limiter.check_and_record(&u, &UserClass::standard()).await;
        assert_eq!(decision, Decision::allowed_degraded());
    }

    let strict = limiter
        .try_check_and_record(&u, &UserClass::standard())
        .await;
    assert!(matches!(strict, Err(LimiterError::Storage(_))));

    let read = limiter.current_usage(&u, &UserClass::standard()).await;
    assert!(matches!(read, Err(LimiterError::Storage(_))));
}

#[tokio::test]
async fn test_storage_timeout_fails_open() {
    let limiter = limiter(SlowStore).storage_timeout(Duration::from_millis(20));
    let u = user("coach-8");

    let decision = limiter.check_and_record(&u, &UserClass::standard()).await;
    assert_eq!(decision, Decision::allowed_degraded());

    let strict = limiter
        .try_check_and_record(&u, &UserClass::standard())
        .await;
    assert!(matches!(strict, Err(LimiterError::Timeout(d)) if d == Duration::from_millis(20)));
}

#[tokio::test]
async fn test_unknown_class_applies_fallback() {
    let policy = PolicyTable::from_entries(
        [
            ("admin", Allowance::Unlimited),
            ("standard", Allowance::Daily(5)),
        ],
        Some(Allowance::Daily(1)),
    );
    let limiter = UsageLimiter::new(MemoryUsageStore::new(), policy).with_clock(clock());
    let u = user("scout-1");
    let class = UserClass::new("scout");

    let first = limiter.check_and_record(&u, &class).await;
    assert!(first.is_allowed());
    assert_eq!(first.usage().unwrap().limit, Allowance::Daily(1));

    let second = limiter.check_and_record(&u, &class).await;
    assert!(!second.is_allowed());
}

#[tokio::test]
async fn test_unknown_class_default_fallback_is_not_unlimited() {
    let limiter = limiter(MemoryUsageStore::new());
    let decision = limiter
        .check_and_record(&user("x"), &UserClass::new("superuser"))
        .await;
    assert_eq!(decision.usage().unwrap().limit, Allowance::Daily(5));
}

#[tokio::test]
async fn test_users_do_not_share_counters() {
    let limiter = limiter(MemoryUsageStore::new());
    for _ in 0..5 {
        limiter
            .check_and_record(&user("a"), &UserClass::standard())
            .await;
    }
    let decision = limiter
        .check_and_record(&user("b"), &UserClass::standard())
        .await;
    assert_eq!(decision.usage().unwrap().current, 1);
}

#[tokio::test]
async fn test_zero_allowance_rejects_first_call() {
    let policy = PolicyTable::from_entries([("suspended", Allowance::Daily(0))], None);
    let limiter = UsageLimiter::new(MemoryUsageStore::new(), policy).with_clock(clock());
    let decision = limiter
        .check_and_record(&user("x"), &UserClass::new("suspended"))
        .await;
    let Decision::Rejected { usage } = decision else {
        panic!("expected rejection");
    };
    assert_eq!(usage.current, 1);
}

#[tokio::test]
async fn test_now_utc_reads_injected_clock() {
    let manual = clock();
    let limiter =
        UsageLimiter::new(MemoryUsageStore::new(), PolicyTable::default()).with_clock(manual.clone());
    assert_eq!(limiter.now_utc(), datetime!(2026-10-19 09:30 UTC));

    manual.advance(time::Duration::hours(1));
    assert_eq!(limiter.now_utc(), datetime!(2026-10-19 10:30 UTC));
}
