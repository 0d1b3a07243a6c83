//! Typed leave policy structures.
//!
//! The policy captures every statutory parameter the engine depends on, so
//! workplace agreements that improve on the statute (a different fiscal-year
//! anchor, a richer grant table) are configuration rather than code.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// One row of the grant table: employees at or above the seniority
/// threshold receive the given number of days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantStep {
    /// Minimum years of continuous service for this row to apply.
    pub min_seniority_years: Decimal,
    /// Days granted at this seniority level.
    pub granted_days: u32,
}

/// Thresholds for the mandatory five-day usage rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompliancePolicy {
    /// The rule applies only to employees granted at least this many days.
    pub applies_from_granted_days: Decimal,
    /// Days that must be used within the fiscal year to be compliant.
    pub required_days: Decimal,
    /// Usage at or above this (but below required) counts as at-risk
    /// rather than non-compliant.
    pub at_risk_threshold_days: Decimal,
}

impl Default for CompliancePolicy {
    fn default() -> Self {
        Self {
            applies_from_granted_days: Decimal::from(10),
            required_days: Decimal::from(5),
            at_risk_threshold_days: Decimal::from(3),
        }
    }
}

/// Windows for the expiration watcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpiryWarningPolicy {
    /// How far ahead to look for expiring tranches when the caller does
    /// not pass a window.
    pub default_window_days: i64,
    /// Tranches within this many days of expiry are critical.
    pub critical_threshold_days: i64,
}

impl Default for ExpiryWarningPolicy {
    fn default() -> Self {
        Self {
            default_window_days: 30,
            critical_threshold_days: 7,
        }
    }
}

/// The complete leave policy for one workplace.
///
/// # Example
///
/// ```
/// use leave_ledger::config::LeavePolicy;
/// use chrono::NaiveDate;
///
/// let policy = LeavePolicy::default();
/// let grant_date = policy.grant_date(2025).unwrap();
/// assert_eq!(grant_date, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
/// assert_eq!(policy.fiscal_year_of(NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()), 2025);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeavePolicy {
    /// The grant table, ordered by ascending seniority threshold.
    pub grant_table: Vec<GrantStep>,
    /// Month the fiscal year starts in (statutory default: April).
    pub fiscal_year_start_month: u32,
    /// Day of month the fiscal year starts on.
    pub fiscal_year_start_day: u32,
    /// Years a tranche stays valid after its grant date.
    pub validity_years: u32,
    /// Ceiling on total open balance across all tranches.
    pub accumulation_cap_days: Decimal,
    /// Five-day-rule thresholds.
    pub compliance: CompliancePolicy,
    /// Expiration watcher windows.
    pub expiry_warning: ExpiryWarningPolicy,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        // Seniority thresholds in tenths of a year: 0.5, 1.5, ... 6.5.
        let steps: [(i64, u32); 7] = [
            (5, 10),
            (15, 11),
            (25, 12),
            (35, 14),
            (45, 16),
            (55, 18),
            (65, 20),
        ];
        Self {
            grant_table: steps
                .iter()
                .map(|(tenths, days)| GrantStep {
                    min_seniority_years: Decimal::new(*tenths, 1),
                    granted_days: *days,
                })
                .collect(),
            fiscal_year_start_month: 4,
            fiscal_year_start_day: 1,
            validity_years: 2,
            accumulation_cap_days: Decimal::from(40),
            compliance: CompliancePolicy::default(),
            expiry_warning: ExpiryWarningPolicy::default(),
        }
    }
}

impl LeavePolicy {
    /// Checks the policy for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPolicy` if the grant table is empty or unordered, or
    /// if the fiscal-year anchor is not a valid date in every year.
    pub fn validate(&self) -> LedgerResult<()> {
        if self.grant_table.is_empty() {
            return Err(LedgerError::InvalidPolicy {
                message: "grant table is empty".to_string(),
            });
        }
        let ordered = self
            .grant_table
            .windows(2)
            .all(|pair| pair[0].min_seniority_years < pair[1].min_seniority_years);
        if !ordered {
            return Err(LedgerError::InvalidPolicy {
                message: "grant table thresholds must be strictly ascending".to_string(),
            });
        }
        // Anchor must exist in leap and non-leap years alike.
        for year in [2025, 2024] {
            if NaiveDate::from_ymd_opt(year, self.fiscal_year_start_month, self.fiscal_year_start_day)
                .is_none()
            {
                return Err(LedgerError::InvalidPolicy {
                    message: format!(
                        "fiscal year start {:02}-{:02} is not a valid date",
                        self.fiscal_year_start_month, self.fiscal_year_start_day
                    ),
                });
            }
        }
        Ok(())
    }

    /// The grant date (基準日) of the given fiscal year.
    pub fn grant_date(&self, fiscal_year: i32) -> LedgerResult<NaiveDate> {
        NaiveDate::from_ymd_opt(
            fiscal_year,
            self.fiscal_year_start_month,
            self.fiscal_year_start_day,
        )
        .ok_or_else(|| LedgerError::InvalidPolicy {
            message: format!(
                "fiscal year start {:02}-{:02} is not a valid date in {fiscal_year}",
                self.fiscal_year_start_month, self.fiscal_year_start_day
            ),
        })
    }

    /// The fiscal year a date falls in.
    pub fn fiscal_year_of(&self, date: NaiveDate) -> i32 {
        let anchor = (self.fiscal_year_start_month, self.fiscal_year_start_day);
        if (date.month(), date.day()) >= anchor {
            date.year()
        } else {
            date.year() - 1
        }
    }

    /// The inclusive date range of the given fiscal year.
    pub fn fiscal_year_range(&self, fiscal_year: i32) -> LedgerResult<(NaiveDate, NaiveDate)> {
        let start = self.grant_date(fiscal_year)?;
        let next_start = self.grant_date(fiscal_year + 1)?;
        Ok((start, next_start.pred_opt().unwrap_or(next_start)))
    }

    /// The expiry date of a tranche granted on the given date.
    pub fn expiry_after(&self, grant_date: NaiveDate) -> LedgerResult<NaiveDate> {
        grant_date
            .checked_add_months(Months::new(12 * self.validity_years))
            .ok_or_else(|| LedgerError::InvalidPolicy {
                message: format!("validity window overflows past {grant_date}"),
            })
    }
}
