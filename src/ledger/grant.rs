//! Statutory grant calculation.
//!
//! This module provides functions for determining how many paid-leave days
//! an employee is granted based on years of continuous service, using the
//! seniority table from the leave policy.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LeavePolicy;

/// Years of continuous service between hire date and the evaluation date.
///
/// Counted in whole elapsed calendar months divided by twelve, so the
/// six-month anniversary evaluates to exactly 0.5. A day-of-month that has
/// not been reached yet does not count as a completed month. Dates at or
/// before the hire date evaluate to zero.
///
/// # Examples
///
/// ```
/// use leave_ledger::ledger::seniority_years;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let hire = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
/// let as_of = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
/// assert_eq!(seniority_years(hire, as_of), Decimal::new(5, 1)); // 0.5
/// ```
pub fn seniority_years(hire_date: NaiveDate, as_of: NaiveDate) -> Decimal {
    if as_of <= hire_date {
        return Decimal::ZERO;
    }

    let mut months = (as_of.year() - hire_date.year()) * 12
        + (as_of.month() as i32 - hire_date.month() as i32);
    if as_of.day() < hire_date.day() {
        months -= 1;
    }
    if months <= 0 {
        return Decimal::ZERO;
    }

    Decimal::from(months) / Decimal::from(12)
}

/// Looks up the statutory granted-day count for the given seniority.
///
/// Walks the policy's grant table and applies the highest row whose
/// threshold the seniority meets or exceeds. Seniority below the first
/// threshold yields 0; seniority beyond the last row stays at that row's
/// amount (20 days under the statutory table).
///
/// Pure and deterministic; there are no error conditions.
///
/// # Examples
///
/// ```
/// use leave_ledger::config::LeavePolicy;
/// use leave_ledger::ledger::granted_days;
/// use rust_decimal::Decimal;
///
/// let policy = LeavePolicy::default();
/// assert_eq!(granted_days(Decimal::new(4, 1), &policy), 0);   // 0.4 years
/// assert_eq!(granted_days(Decimal::new(5, 1), &policy), 10);  // 0.5 years
/// assert_eq!(granted_days(Decimal::from(10), &policy), 20);
/// ```
pub fn granted_days(seniority_years: Decimal, policy: &LeavePolicy) -> u32 {
    // Rows are sorted by ascending threshold, so the last row whose
    // threshold is met is the applicable one.
    policy
        .grant_table
        .iter()
        .rfind(|step| seniority_years >= step.min_seniority_years)
        .map(|step| step.granted_days)
        .unwrap_or(0)
}

/// A grant recommendation for one employee at a base date.
///
/// Produced for the approval workflow so it can display how the
/// recommendation was derived before a tranche is actually opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRecommendation {
    /// The employee the recommendation is for.
    pub employee_id: String,
    /// The fiscal year the grant would belong to.
    pub fiscal_year: i32,
    /// The base date the seniority was evaluated at (基準日).
    pub grant_date: NaiveDate,
    /// The date the granted days would lapse.
    pub expiry_date: NaiveDate,
    /// The evaluated years of continuous service.
    pub seniority_years: Decimal,
    /// The recommended number of days.
    pub granted_days: u32,
}
