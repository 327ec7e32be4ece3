//! Usage counter row.

use time::Date;

use crate::user::UserId;

/// Request counter for one user on one UTC calendar day.
///
/// `(user_id, request_date)` is the natural key; a store holds at most one
/// record per pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub user_id: UserId,
    pub request_date: Date,
    pub request_count: u64,
}
