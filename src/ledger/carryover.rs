//! Fiscal-year rollover processing.
//!
//! Run once per fiscal-year transition: sweeps expired tranches, grants the
//! new year's tranche from the employee's seniority at the new base date,
//! enforces the statutory accumulation ceiling, and emits a balance
//! snapshot for auditing. The batch driver isolates failures per employee
//! so one bad record never rolls back the rest of the workforce.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use chrono::NaiveDate;

use crate::config::LeavePolicy;
use crate::error::LedgerResult;
use crate::models::{BalanceSnapshot, GrantTranche};

use super::grant::{granted_days, seniority_years};
use super::store::{EmployeeLedger, TrancheStore};

/// The audited result of one employee's rollover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloverOutcome {
    /// The employee that was processed.
    pub employee_id: String,
    /// The fiscal year that was opened.
    pub fiscal_year: i32,
    /// Days granted in the new tranche (0 below 0.5 years of service).
    pub granted_days: u32,
    /// Days that lapsed in the expiry sweep.
    pub newly_expired: Decimal,
    /// Days expired by the accumulation-cap trim.
    pub cap_trimmed: Decimal,
    /// Post-rollover accounting for the new cohort.
    pub snapshot: BalanceSnapshot,
}

/// One employee's rollover failure, kept alongside the successes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloverFailure {
    /// The employee that failed.
    pub employee_id: String,
    /// Display form of the error that stopped the employee's rollover.
    pub error: String,
}

/// Batch result of a year-end rollover: per-employee outcomes and
/// failures, never a single boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloverReport {
    /// The fiscal year that was opened.
    pub fiscal_year: i32,
    /// Employees processed successfully.
    pub outcomes: Vec<RolloverOutcome>,
    /// Employees that failed and were skipped.
    pub failures: Vec<RolloverFailure>,
}

impl RolloverReport {
    /// Returns true if at least one employee failed while others succeeded
    /// or the batch otherwise did not complete cleanly.
    pub fn is_partial_failure(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Expires surplus above the accumulation cap, oldest open tranches first.
///
/// Returns the total trimmed. Trimmed days are moved into each tranche's
/// expired total so they stay visible in the ledger report.
pub fn enforce_accumulation_cap(
    ledger: &mut EmployeeLedger,
    as_of: NaiveDate,
    cap: Decimal,
) -> Decimal {
    let mut surplus = ledger.total_open_balance(as_of) - cap;
    if surplus <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let trimmed = surplus;

    // Oldest first: those days are nearest their legal expiry.
    let mut order: Vec<usize> = ledger
        .tranches()
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_open(as_of))
        .map(|(i, _)| i)
        .collect();
    order.sort_by(|a, b| {
        ledger.tranches()[*a]
            .grant_date
            .cmp(&ledger.tranches()[*b].grant_date)
    });

    for index in order {
        if surplus <= Decimal::ZERO {
            break;
        }
        let tranche = &mut ledger.tranches_mut()[index];
        let trim = tranche.remaining_amount.min(surplus);
        tranche.remaining_amount -= trim;
        tranche.expired_amount += trim;
        surplus -= trim;
    }
    trimmed
}

/// Rolls one employee into the given fiscal year.
///
/// Steps: expiry sweep at the new base date, seniority evaluation, new
/// tranche grant, accumulation-cap trim, audit snapshot.
///
/// # Errors
///
/// Propagates policy date errors and tranche invariant violations; the
/// ledger is left as far through the steps as it got, matching the
/// per-employee transaction boundary the caller holds.
pub fn rollover_employee(
    ledger: &mut EmployeeLedger,
    fiscal_year: i32,
    policy: &LeavePolicy,
) -> LedgerResult<RolloverOutcome> {
    let grant_date = policy.grant_date(fiscal_year)?;
    let newly_expired = ledger.apply_expiry(grant_date);

    let seniority = seniority_years(ledger.employee().hire_date, grant_date);
    let days = granted_days(seniority, policy);
    if days > 0 {
        let expiry_date = policy.expiry_after(grant_date)?;
        ledger.add_tranche(GrantTranche::new(
            fiscal_year,
            grant_date,
            expiry_date,
            Decimal::from(days),
        ))?;
    }

    let cap_trimmed =
        enforce_accumulation_cap(ledger, grant_date, policy.accumulation_cap_days);
    let snapshot = ledger.snapshot(fiscal_year, grant_date);

    info!(
        employee_id = %ledger.employee().id,
        fiscal_year,
        granted = days,
        %newly_expired,
        %cap_trimmed,
        balance = %snapshot.balance,
        "rolled employee into new fiscal year"
    );

    Ok(RolloverOutcome {
        employee_id: ledger.employee().id.clone(),
        fiscal_year,
        granted_days: days,
        newly_expired,
        cap_trimmed,
        snapshot,
    })
}

/// Runs the year-end rollover for every registered employee.
///
/// Each employee is processed under its own lock as its own transaction;
/// a failure is logged, recorded in the report, and the batch continues.
pub fn run_rollover(store: &TrancheStore, fiscal_year: i32, policy: &LeavePolicy) -> RolloverReport {
    let mut outcomes = Vec::new();
    let mut failures = Vec::new();

    for employee_id in store.employee_ids() {
        let result =
            store.write_ledger(&employee_id, |ledger| rollover_employee(ledger, fiscal_year, policy));
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(error) => {
                warn!(%employee_id, fiscal_year, %error, "rollover failed for employee");
                failures.push(RolloverFailure {
                    employee_id,
                    error: error.to_string(),
                });
            }
        }
    }

    RolloverReport {
        fiscal_year,
        outcomes,
        failures,
    }
}
