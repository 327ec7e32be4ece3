//! In-memory usage store.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use time::Date;

use crate::error::LimiterError;
use crate::user::UserId;

use super::{UsageRecord, UsageStore};

/// Process-local usage store.
///
/// Increments are atomic with respect to every task in this process, but
/// the counts are not shared with other instances and are lost on restart.
/// Use [`SqlUsageStore`](crate::sql::SqlUsageStore) when several service
/// instances enforce the same quota.
#[derive(Debug, Default)]
pub struct MemoryUsageStore {
    counters: Mutex<HashMap<(UserId, Date), u64>>,
}

impl MemoryUsageStore {
    /// Create a new empty store.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with `(user, date, count)` rows.
    ///
    /// # Example
    /// ```
    /// use quota_limiter::{MemoryUsageStore, UserId};
    /// use time::macros::date;
    ///
    /// let user = UserId::parse("coach-7").unwrap();
    /// let store = MemoryUsageStore::from_records([(user, date!(2026 - 10 - 19), 4)]);
    /// assert_eq!(store.len(), 1);
    /// ```
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (UserId, Date, u64)>,
    {
        let counters = records
            .into_iter()
            .map(|(user, date, count)| ((user, date), count))
            .collect();
        Self {
            counters: Mutex::new(counters),
        }
    }

    /// Number of stored (user, day) counters.
    #[inline]
    pub fn len(&self) -> usize {
        self.counters.lock().len()
    }

    /// Check if no counters are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counters.lock().is_empty()
    }
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    async fn increment(&self, user_id: &UserId, date: Date) -> Result<u64, LimiterError> {
        let mut counters = self.counters.lock();
        let count = counters.entry((user_id.clone(), date)).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    async fn get(
        &self,
        user_id: &UserId,
        date: Date,
    ) -> Result<Option<UsageRecord>, LimiterError> {
        let counters = self.counters.lock();
        Ok(counters
            .get(&(user_id.clone(), date))
            .map(|&request_count| UsageRecord {
                user_id: user_id.clone(),
                request_date: date,
                request_count,
            }))
    }

    async fn list(&self, date: Date) -> Result<Vec<UsageRecord>, LimiterError> {
        let mut records: Vec<UsageRecord> = self
            .counters
            .lock()
            .iter()
            .filter(|((_, d), _)| *d == date)
            .map(|((user_id, d), &request_count)| UsageRecord {
                user_id: user_id.clone(),
                request_date: *d,
                request_count,
            })
            .collect();
        records.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::date;

    use super::*;

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    #[tokio::test]
    async fn test_increment_creates_then_counts() {
        let store = MemoryUsageStore::new();
        let day = date!(2026 - 10 - 19);
        assert!(store.is_empty());

        assert_eq!(store.increment(&user("u1"), day).await.unwrap(), 1);
        assert_eq!(store.increment(&user("u1"), day).await.unwrap(), 2);
        assert_eq!(store.increment(&user("u2"), day).await.unwrap(), 1);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_get_has_no_side_effect() {
        let store = MemoryUsageStore::new();
        let day = date!(2026 - 10 - 19);

        assert!(store.get(&user("u1"), day).await.unwrap().is_none());
        assert!(store.is_empty());

        store.increment(&user("u1"), day).await.unwrap();
        let record = store.get(&user("u1"), day).await.unwrap().unwrap();
        assert_eq!(record.request_count, 1);
        assert_eq!(record.request_date, day);
    }

    #[tokio::test]
    async fn test_days_are_independent() {
        let store = MemoryUsageStore::from_records([(user("u1"), date!(2026 - 10 - 19), 9)]);
        assert_eq!(
            store.increment(&user("u1"), date!(2026 - 10 - 20)).await.unwrap(),
            1
        );
        let list = store.list(date!(2026 - 10 - 19)).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].request_count, 9);
    }

    #[tokio::test]
    async fn test_list_sorted_by_user() {
        let store = MemoryUsageStore::new();
        let day = date!(2026 - 10 - 19);
        for id in ["zed", "amy", "kim"] {
            store.increment(&user(id), day).await.unwrap();
        }
        let ids: Vec<_> = store
            .list(day)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.user_id.to_string())
            .collect();
        assert_eq!(ids, ["amy", "kim", "zed"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let store = Arc::new(MemoryUsageStore::new());
        let day = date!(2026 - 10 - 19);
        let handles: Vec<_> = (0..200)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.increment(&user("u1"), day).await.unwrap() })
            })
            .collect();
        for h in handles {
            h.await.unwrap();
        }
        let record = store.get(&user("u1"), day).await.unwrap().unwrap();
        assert_eq!(record.request_count, 200);
    }
}
