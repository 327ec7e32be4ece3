//! Wall-clock source and UTC day arithmetic.

use std::sync::Arc;

use parking_lot::Mutex;
use time::{Date, Duration, OffsetDateTime, Time};

/// Source of the current UTC time.
///
/// The limiter partitions counters by UTC calendar day, so every "now"
/// goes through this trait.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> OffsetDateTime;

    /// Today's UTC calendar date.
    #[inline]
    fn today(&self) -> Date {
        self.now_utc().date()
    }
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now_utc(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Manually driven clock. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<OffsetDateTime>>,
}

impl ManualClock {
    pub fn new(start: OffsetDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    pub fn set(&self, to: OffsetDateTime) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now_utc(&self) -> OffsetDateTime {
        *self.now.lock()
    }
}

/// Start of the UTC day after `date`, when today's counter stops applying.
pub fn next_utc_midnight(date: Date) -> OffsetDateTime {
    // Date::MAX has no successor; saturate instead of panicking.
    let next = date.next_day().unwrap_or(date);
    next.with_time(Time::MIDNIGHT).assume_utc()
}
