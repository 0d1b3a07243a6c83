//! Five-day-rule compliance checking.
//!
//! Japanese statute requires employees granted ten or more days to take at
//! least five within the fiscal year. The classification here is a pure
//! function of `(granted, used)`; there is no persisted state machine, and
//! alerts are returned as values for the caller's notification channel.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{CompliancePolicy, LeavePolicy};
use crate::error::LedgerResult;
use crate::ledger::EmployeeLedger;

/// Compliance status for one employee and fiscal year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    /// No ledger record exists for the employee and year.
    Unknown,
    /// Fewer than ten days granted; the five-day rule does not apply.
    NotApplicable,
    /// Ten or more granted and at least five used.
    Compliant,
    /// Ten or more granted and usage between three and five days.
    AtRisk,
    /// Ten or more granted and fewer than three days used.
    NonCompliant,
}

/// Classifies a `(granted, used)` pair against the policy thresholds.
///
/// Pure and deterministic. `Unknown` is never produced here; it is the
/// caller's answer for a missing cohort.
///
/// # Examples
///
/// ```
/// use leave_ledger::compliance::{ComplianceStatus, classify};
/// use leave_ledger::config::CompliancePolicy;
/// use rust_decimal::Decimal;
///
/// let policy = CompliancePolicy::default();
/// let status = classify(Decimal::from(12), Decimal::from(4), &policy);
/// assert_eq!(status, ComplianceStatus::AtRisk);
/// ```
pub fn classify(granted: Decimal, used: Decimal, policy: &CompliancePolicy) -> ComplianceStatus {
    if granted < policy.applies_from_granted_days {
        return ComplianceStatus::NotApplicable;
    }
    if used >= policy.required_days {
        ComplianceStatus::Compliant
    } else if used >= policy.at_risk_threshold_days {
        ComplianceStatus::AtRisk
    } else {
        ComplianceStatus::NonCompliant
    }
}

/// Derived compliance state for one employee and fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceRecord {
    /// The employee the record covers.
    pub employee_id: String,
    /// The fiscal year the record covers.
    pub fiscal_year: i32,
    /// The derived status.
    pub status: ComplianceStatus,
    /// Days granted in the year's cohort.
    pub granted: Decimal,
    /// Days taken within the fiscal year.
    pub days_used: Decimal,
    /// Days still needed to satisfy the rule (zero once compliant).
    pub days_remaining_to_comply: Decimal,
}

/// Alert emitted for a non-compliant employee, consumed by the external
/// notification collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceAlert {
    /// The employee the alert concerns.
    pub employee_id: String,
    /// The fiscal year the alert concerns.
    pub fiscal_year: i32,
    /// Days taken so far within the fiscal year.
    pub days_used: Decimal,
    /// Days still needed to satisfy the rule.
    pub days_remaining_to_comply: Decimal,
}

/// The full compliance report for a fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// The fiscal year the report covers.
    pub fiscal_year: i32,
    /// One record per employee, ordered by employee id.
    pub records: Vec<ComplianceRecord>,
    /// Alerts for every non-compliant employee.
    pub alerts: Vec<ComplianceAlert>,
}

/// Evaluates one employee's compliance for a fiscal year.
///
/// `granted` comes from the year's tranche cohort; `used` counts
/// non-reversed usage events dated inside the fiscal year, which is what
/// the statute measures. A missing cohort yields `Unknown`.
///
/// Returns the record and, for a non-compliant employee, the alert value.
pub fn evaluate_employee(
    ledger: &EmployeeLedger,
    fiscal_year: i32,
    policy: &LeavePolicy,
) -> LedgerResult<(ComplianceRecord, Option<ComplianceAlert>)> {
    let (year_start, year_end) = policy.fiscal_year_range(fiscal_year)?;
    let employee_id = ledger.employee().id.clone();

    let granted: Decimal = ledger
        .tranches()
        .iter()
        .filter(|t| t.fiscal_year == fiscal_year)
        .map(|t| t.granted_amount)
        .sum();
    let has_cohort = ledger
        .tranches()
        .iter()
        .any(|t| t.fiscal_year == fiscal_year);
    let used = ledger.used_in_range(year_start, year_end);

    let status = if has_cohort {
        classify(granted, used, &policy.compliance)
    } else {
        ComplianceStatus::Unknown
    };
    let days_remaining_to_comply =
        (policy.compliance.required_days - used).max(Decimal::ZERO);

    let record = ComplianceRecord {
        employee_id: employee_id.clone(),
        fiscal_year,
        status,
        granted,
        days_used: used,
        days_remaining_to_comply,
    };

    let alert = if status == ComplianceStatus::NonCompliant {
        warn!(
            %employee_id,
            fiscal_year,
            days_used = %used,
            days_remaining = %days_remaining_to_comply,
            "employee is non-compliant with the five-day rule"
        );
        Some(ComplianceAlert {
            employee_id,
            fiscal_year,
            days_used: used,
            days_remaining_to_comply,
        })
    } else {
        None
    };

    Ok((record, alert))
}
