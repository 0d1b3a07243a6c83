//! Clock abstraction for date-dependent ledger logic.
//!
//! Every operation that depends on "today" receives the date through this
//! trait, so callers inject the time source instead of the engine reading
//! the system clock from inside business logic.

use chrono::{NaiveDate, Utc};

/// Source of the current date for the ledger.
pub trait Clock: Send + Sync {
    /// Returns the current date.
    fn today(&self) -> NaiveDate;
}

/// Real-time clock backed by the system UTC time source.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock pinned to a fixed date.
///
/// Used in tests and for replaying ledger operations as of a past date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    date: NaiveDate,
}

impl FixedClock {
    /// Creates a clock that always reports the given date.
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date
    }
}
