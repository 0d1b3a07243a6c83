//! Usage and reversal event models.
//!
//! A usage event records one approved leave deduction together with the
//! tranches it was attributed to. Events are never edited after creation;
//! corrections are booked as compensating reversal events.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One tranche debit within a usage event's attribution list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrancheDebit {
    /// The tranche that was debited.
    pub tranche_id: Uuid,
    /// The number of days taken from that tranche.
    pub amount: Decimal,
}

/// An approved leave deduction and its tranche attribution.
///
/// Created when a leave request is approved. Immutable afterward: a
/// rejected or cancelled request is compensated by a [`ReversalEvent`],
/// never by editing the original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    /// Unique identifier for this event.
    pub id: Uuid,
    /// The employee the leave belongs to.
    pub employee_id: String,
    /// The date the leave was taken (取得日).
    pub use_date: NaiveDate,
    /// The number of days requested (positive, half-day granularity).
    pub amount_requested: Decimal,
    /// Which tranches were debited, and by how much, in deduction order.
    pub debits: Vec<TrancheDebit>,
}

impl UsageEvent {
    /// Total days actually taken across all attributed tranches.
    pub fn total_taken(&self) -> Decimal {
        self.debits.iter().map(|d| d.amount).sum()
    }
}

/// A compensating record that undoes a previously approved deduction.
///
/// Attributed amounts whose tranche was still within its validity window
/// are re-credited; amounts whose tranche had already lapsed are forfeited
/// into an immediately-expired adjustment tranche so reversed days never
/// reappear past their legal window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReversalEvent {
    /// Unique identifier for this reversal.
    pub id: Uuid,
    /// The usage event being compensated.
    pub original_event_id: Uuid,
    /// The employee the reversal belongs to.
    pub employee_id: String,
    /// The date the reversal was booked.
    pub reversal_date: NaiveDate,
    /// Amounts credited back to still-open tranches.
    pub credited: Vec<TrancheDebit>,
    /// Amounts forfeited because their tranche had lapsed.
    pub forfeited: Vec<TrancheDebit>,
}

/// Returns true if the amount lands on the half-day grid.
///
/// Leave is requested in whole or half days; anything finer is rejected
/// before it reaches the tranche store.
///
/// # Examples
///
/// ```
/// use leave_ledger::models::is_half_day_multiple;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert!(is_half_day_multiple(Decimal::from_str("0.5").unwrap()));
/// assert!(is_half_day_multiple(Decimal::from_str("3").unwrap()));
/// assert!(!is_half_day_multiple(Decimal::from_str("0.25").unwrap()));
/// ```
pub fn is_half_day_multiple(amount: Decimal) -> bool {
    (amount * Decimal::TWO).fract().is_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_total_taken_sums_debits() {
        let event = UsageEvent {
            id: Uuid::new_v4(),
            employee_id: "emp_001".to_string(),
            use_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            amount_requested: dec("1.5"),
            debits: vec![
                TrancheDebit {
                    tranche_id: Uuid::new_v4(),
                    amount: dec("1"),
                },
                TrancheDebit {
                    tranche_id: Uuid::new_v4(),
                    amount: dec("0.5"),
                },
            ],
        };
        assert_eq!(event.total_taken(), dec("1.5"));
    }

    #[test]
    fn test_half_day_multiples_accepted() {
        for s in ["0.5", "1", "1.5", "2", "10", "0.50", "19.5"] {
            assert!(is_half_day_multiple(dec(s)), "{s} should be accepted");
        }
    }

    #[test]
    fn test_sub_half_day_amounts_rejected() {
        for s in ["0.25", "0.1", "1.3", "0.75", "2.001"] {
            assert!(!is_half_day_multiple(dec(s)), "{s} should be rejected");
        }
    }

    #[test]
    fn test_usage_event_serde_round_trip() {
        let event = UsageEvent {
            id: Uuid::nil(),
            employee_id: "emp_001".to_string(),
            use_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            amount_requested: dec("1"),
            debits: vec![TrancheDebit {
                tranche_id: Uuid::nil(),
                amount: dec("1"),
            }],
        };
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: UsageEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deserialized);
    }

    #[test]
    fn test_reversal_event_serde_round_trip() {
        let reversal = ReversalEvent {
            id: Uuid::nil(),
            original_event_id: Uuid::nil(),
            employee_id: "emp_001".to_string(),
            reversal_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            credited: vec![],
            forfeited: vec![TrancheDebit {
                tranche_id: Uuid::nil(),
                amount: dec("0.5"),
            }],
        };
        let json = serde_json::to_string(&reversal).unwrap();
        let deserialized: ReversalEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(reversal, deserialized);
    }
}
