//! Limiter decisions and their caller-facing representation.

use serde::{Serialize, Serializer};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::policy::Allowance;

/// Usage for one user on one UTC day, relative to their allowance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageSnapshot {
    /// Applied allowance.
    pub limit: Allowance,
    /// Requests counted today (including a rejected one).
    pub current: u64,
    /// Requests left today, floored at zero. `None` when unlimited.
    pub remaining: Option<u64>,
    /// Next UTC midnight, when the counter starts over.
    pub reset_time: OffsetDateTime,
}

impl UsageSnapshot {
    pub fn new(limit: Allowance, current: u64, reset_time: OffsetDateTime) -> Self {
        Self {
            limit,
            current,
            remaining: limit.remaining_after(current),
            reset_time,
        }
    }

    /// Whether one more request today would be admitted.
    #[inline]
    pub fn has_remaining(&self) -> bool {
        self.remaining != Some(0)
    }

    /// Serializable body for this snapshot; `allowed` reports
    /// [`has_remaining`](Self::has_remaining).
    pub fn body(&self) -> UsageBody {
        UsageBody::from_snapshot(self.has_remaining(), Some(self))
    }
}

/// Outcome of a metered request check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Service the request.
    ///
    /// `usage` is `None` when the check degraded (storage failed and the
    /// limiter failed open).
    Allowed { usage: Option<UsageSnapshot> },
    /// Refuse the request; the quota for today is exhausted.
    Rejected { usage: UsageSnapshot },
}

impl Decision {
    /// Allowed without usage metadata (fail-open path).
    #[inline]
    pub fn allowed_degraded() -> Self {
        Self::Allowed { usage: None }
    }

    #[inline]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    #[inline]
    pub fn usage(&self) -> Option<&UsageSnapshot> {
        match self {
            Self::Allowed { usage } => usage.as_ref(),
            Self::Rejected { usage } => Some(usage),
        }
    }

    /// Caller-facing body, identical for the allowed and rejected paths.
    pub fn body(&self) -> UsageBody {
        UsageBody::from_snapshot(self.is_allowed(), self.usage())
    }
}

/// Limit as shown to clients: a number, or the string `"unlimited"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitDisplay(pub Allowance);

impl Serialize for LimitDisplay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Allowance::Unlimited => serializer.serialize_str("unlimited"),
            Allowance::Daily(n) => serializer.serialize_u32(n),
        }
    }
}

/// JSON body returned to callers (and attached to HTTP 429 responses).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageBody {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<LimitDisplay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_time: Option<String>,
}

impl UsageBody {
    fn from_snapshot(allowed: bool, usage: Option<&UsageSnapshot>) -> Self {
        let Some(usage) = usage else {
            return Self {
                allowed,
                limit: None,
                current: None,
                remaining: None,
                reset_time: None,
            };
        };

        // Unlimited callers carry no counter, only the limit tag.
        if usage.limit.is_unlimited() {
            return Self {
                allowed,
                limit: Some(LimitDisplay(usage.limit)),
                current: None,
                remaining: None,
                reset_time: None,
            };
        }

        Self {
            allowed,
            limit: Some(LimitDisplay(usage.limit)),
            current: Some(usage.current),
            remaining: usage.remaining,
            reset_time: usage.reset_time.format(&Rfc3339).ok(),
        }
    }
}
