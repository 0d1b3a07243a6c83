//! Grant tranche model.
//!
//! A tranche is one fiscal year's grant of paid-leave days with its own
//! two-year validity window. Tranches carry their full accounting state:
//! what was granted, what remains, and what lapsed unused.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One fiscal year's grant of paid-leave days for a single employee.
///
/// Invariant: `remaining_amount + expired_amount <= granted_amount`, and all
/// three are non-negative. A tranche with `remaining_amount == 0` or a past
/// expiry date is inert and excluded from future deduction.
///
/// # Example
///
/// ```
/// use leave_ledger::models::GrantTranche;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let grant_date = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
/// let expiry_date = NaiveDate::from_ymd_opt(2027, 4, 1).unwrap();
/// let tranche = GrantTranche::new(2025, grant_date, expiry_date, Decimal::from(10));
///
/// assert!(tranche.is_open(NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()));
/// assert!(!tranche.is_open(NaiveDate::from_ymd_opt(2027, 4, 2).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantTranche {
    /// Unique identifier for this tranche.
    pub id: Uuid,
    /// The fiscal year the tranche was opened in.
    pub fiscal_year: i32,
    /// The date the days were granted (基準日, typically April 1).
    pub grant_date: NaiveDate,
    /// The date after which unused days lapse (grant date + 2 years).
    pub expiry_date: NaiveDate,
    /// The number of days originally granted.
    pub granted_amount: Decimal,
    /// The number of days still available for deduction.
    pub remaining_amount: Decimal,
    /// The number of days that lapsed unused (expiry sweep or cap trim).
    pub expired_amount: Decimal,
}

impl GrantTranche {
    /// Creates a fresh tranche with its full grant still remaining.
    pub fn new(
        fiscal_year: i32,
        grant_date: NaiveDate,
        expiry_date: NaiveDate,
        granted_amount: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            fiscal_year,
            grant_date,
            expiry_date,
            granted_amount,
            remaining_amount: granted_amount,
            expired_amount: Decimal::ZERO,
        }
    }

    /// Returns true if the tranche is a candidate for deduction as of the
    /// given date: days remain and the validity window has not elapsed.
    pub fn is_open(&self, as_of: NaiveDate) -> bool {
        self.remaining_amount > Decimal::ZERO && as_of <= self.expiry_date
    }

    /// Returns true if the validity window has elapsed as of the given date.
    pub fn has_lapsed(&self, as_of: NaiveDate) -> bool {
        as_of > self.expiry_date
    }

    /// The number of days consumed from this tranche.
    ///
    /// Derived as `granted - remaining - expired`, so the per-tranche
    /// conservation equation holds by construction.
    pub fn used_amount(&self) -> Decimal {
        self.granted_amount - self.remaining_amount - self.expired_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample_tranche() -> GrantTranche {
        GrantTranche::new(
            2025,
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2027, 4, 1).unwrap(),
            dec("10"),
        )
    }

    #[test]
    fn test_new_tranche_has_full_remaining() {
        let tranche = sample_tranche();
        assert_eq!(tranche.granted_amount, dec("10"));
        assert_eq!(tranche.remaining_amount, dec("10"));
        assert_eq!(tranche.expired_amount, Decimal::ZERO);
        assert_eq!(tranche.used_amount(), Decimal::ZERO);
    }

    #[test]
    fn test_is_open_on_expiry_date() {
        let tranche = sample_tranche();
        assert!(tranche.is_open(NaiveDate::from_ymd_opt(2027, 4, 1).unwrap()));
    }

    #[test]
    fn test_is_open_false_after_expiry_date() {
        let tranche = sample_tranche();
        assert!(!tranche.is_open(NaiveDate::from_ymd_opt(2027, 4, 2).unwrap()));
        assert!(tranche.has_lapsed(NaiveDate::from_ymd_opt(2027, 4, 2).unwrap()));
    }

    #[test]
    fn test_is_open_false_when_drained() {
        let mut tranche = sample_tranche();
        tranche.remaining_amount = Decimal::ZERO;
        assert!(!tranche.is_open(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
    }

    #[test]
    fn test_used_amount_accounts_for_expiry() {
        let mut tranche = sample_tranche();
        tranche.remaining_amount = dec("3.5");
        tranche.expired_amount = dec("2");
        assert_eq!(tranche.used_amount(), dec("4.5"));
    }

    #[test]
    fn test_serde_round_trip() {
        let tranche = sample_tranche();
        let json = serde_json::to_string(&tranche).unwrap();
        let deserialized: GrantTranche = serde_json::from_str(&json).unwrap();
        assert_eq!(tranche, deserialized);
    }
}
