//! The single entry point other subsystems call.
//!
//! [`LedgerFacade`] wires the grant calculator, tranche store, deduction
//! engine, carryover processor, and the compliance observers behind one
//! synchronous surface. Collaborators (leave-request workflow, reporting,
//! notification) construct one facade per process with an injected store,
//! policy, and clock; there is no module-level state.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::clock::Clock;
use crate::compliance::{
    ComplianceReport, ExpiryAlert, evaluate_employee, scan_employee,
};
use crate::config::LeavePolicy;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{
    GrantRecommendation, RolloverReport, TrancheStore, deduct, enforce_accumulation_cap,
    granted_days, reverse, run_rollover, seniority_years, validate_usage_amount,
};
use crate::models::{
    BalanceSnapshot, Employee, GrantTranche, LedgerRow, ReversalEvent, UsageEvent,
};

use chrono::NaiveDate;

/// Synchronous entry point over the leave ledger.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use leave_ledger::clock::FixedClock;
/// use leave_ledger::config::LeavePolicy;
/// use leave_ledger::facade::LedgerFacade;
/// use leave_ledger::ledger::TrancheStore;
/// use leave_ledger::models::Employee;
///
/// let clock = FixedClock::new(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
/// let facade = LedgerFacade::new(
///     Arc::new(TrancheStore::new()),
///     LeavePolicy::default(),
///     Arc::new(clock),
/// );
/// facade
///     .register_employee(Employee::new(
///         "emp_001",
///         "山田 太郎",
///         NaiveDate::from_ymd_opt(2020, 4, 1).unwrap(),
///     ))
///     .unwrap();
/// let report = facade.run_year_end_rollover(2025);
/// assert_eq!(report.outcomes.len(), 1);
/// ```
pub struct LedgerFacade {
    store: Arc<TrancheStore>,
    policy: LeavePolicy,
    clock: Arc<dyn Clock>,
}

impl LedgerFacade {
    /// Creates a facade over the given store, policy, and clock.
    pub fn new(store: Arc<TrancheStore>, policy: LeavePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            policy,
            clock,
        }
    }

    /// The policy the facade operates under.
    pub fn policy(&self) -> &LeavePolicy {
        &self.policy
    }

    /// Registers an employee with an empty ledger.
    pub fn register_employee(&self, employee: Employee) -> LedgerResult<()> {
        info!(employee_id = %employee.id, "registering employee");
        self.store.register_employee(employee)
    }

    /// Recommends the current fiscal year's grant for an employee.
    ///
    /// Seniority is evaluated at the fiscal year's base date; no tranche is
    /// opened. The approval workflow displays this before committing.
    pub fn grant_recommendation(&self, employee_id: &str) -> LedgerResult<GrantRecommendation> {
        let today = self.clock.today();
        let fiscal_year = self.policy.fiscal_year_of(today);
        let grant_date = self.policy.grant_date(fiscal_year)?;
        let expiry_date = self.policy.expiry_after(grant_date)?;

        let hire_date = self
            .store
            .read_ledger(employee_id, |ledger| ledger.employee().hire_date)?;
        let seniority = seniority_years(hire_date, grant_date);
        let days = granted_days(seniority, &self.policy);

        Ok(GrantRecommendation {
            employee_id: employee_id.to_string(),
            fiscal_year,
            grant_date,
            expiry_date,
            seniority_years: seniority,
            granted_days: days,
        })
    }

    /// Opens a grant tranche for one employee outside the batch rollover.
    ///
    /// Used for mid-year hires reaching their individual grant anniversary
    /// (typically 0.5 years of service). Seniority is evaluated at today's
    /// date, and the accumulation cap is enforced afterwards. Returns
    /// `None` when the employee's seniority does not reach the first table
    /// row yet.
    pub fn grant_for_employee(&self, employee_id: &str) -> LedgerResult<Option<GrantTranche>> {
        let today = self.clock.today();
        let fiscal_year = self.policy.fiscal_year_of(today);
        let expiry_date = self.policy.expiry_after(today)?;
        let policy = &self.policy;

        self.store.write_ledger(employee_id, |ledger| {
            let seniority = seniority_years(ledger.employee().hire_date, today);
            let days = granted_days(seniority, policy);
            if days == 0 {
                return Ok(None);
            }

            let tranche = GrantTranche::new(fiscal_year, today, expiry_date, Decimal::from(days));
            let granted = tranche.clone();
            ledger.add_tranche(tranche)?;
            enforce_accumulation_cap(ledger, today, policy.accumulation_cap_days);
            info!(
                %employee_id,
                fiscal_year,
                granted_days = days,
                grant_date = %today,
                "opened individual grant tranche"
            );
            Ok(Some(granted))
        })
    }

    /// Applies an approved leave request against the employee's tranches.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` before any store access for off-grid amounts.
    /// - `EmployeeNotFound` for unknown employees.
    /// - `InsufficientBalance` when open tranches cannot cover the request;
    ///   no tranche is modified in that case.
    pub fn record_approved_leave(
        &self,
        employee_id: &str,
        use_date: NaiveDate,
        amount: Decimal,
    ) -> LedgerResult<UsageEvent> {
        validate_usage_amount(amount)?;
        self.store
            .write_ledger(employee_id, |ledger| deduct(ledger, use_date, amount))
    }

    /// Books a compensating reversal for a recorded usage event.
    pub fn reverse_leave(&self, employee_id: &str, event_id: Uuid) -> LedgerResult<ReversalEvent> {
        let today = self.clock.today();
        let policy = &self.policy;
        self.store
            .write_ledger(employee_id, |ledger| reverse(ledger, event_id, today, policy))
    }

    /// Runs the year-end rollover for every registered employee.
    ///
    /// Each employee is its own transaction; failures are collected in the
    /// report while the batch continues.
    pub fn run_year_end_rollover(&self, fiscal_year: i32) -> RolloverReport {
        info!(fiscal_year, "starting year-end rollover");
        run_rollover(&self.store, fiscal_year, &self.policy)
    }

    /// Derives the compliance report for a fiscal year.
    ///
    /// Records are ordered by employee id; alerts carry every
    /// non-compliant employee for the notification collaborator.
    pub fn compliance_report(&self, fiscal_year: i32) -> LedgerResult<ComplianceReport> {
        let mut records = Vec::new();
        let mut alerts = Vec::new();
        for employee_id in self.store.employee_ids() {
            let (record, alert) = self.store.read_ledger(&employee_id, |ledger| {
                evaluate_employee(ledger, fiscal_year, &self.policy)
            })??;
            records.push(record);
            alerts.extend(alert);
        }
        Ok(ComplianceReport {
            fiscal_year,
            records,
            alerts,
        })
    }

    /// Flags tranches expiring between today and `today + window_days`.
    ///
    /// The fiscal year scopes the report to expiry dates inside that year;
    /// `None` uses the policy's default window. One alert per affected
    /// employee, ordered by employee id.
    pub fn expiring_soon(
        &self,
        fiscal_year: i32,
        window_days: Option<i64>,
    ) -> LedgerResult<Vec<ExpiryAlert>> {
        let today = self.clock.today();
        let window = window_days.unwrap_or(self.policy.expiry_warning.default_window_days);
        let critical = self.policy.expiry_warning.critical_threshold_days;
        let range = self.policy.fiscal_year_range(fiscal_year)?;

        let mut alerts = Vec::new();
        for employee_id in self.store.employee_ids() {
            let alert = self.store.read_ledger(&employee_id, |ledger| {
                scan_employee(ledger, today, window, critical, Some(range))
            })?;
            alerts.extend(alert);
        }
        Ok(alerts)
    }

    /// Produces the statutory annual ledger (年次有給休暇管理簿) rows for a
    /// fiscal year, ordered by employee id.
    ///
    /// Employees with no grant cohort that year are omitted: the statutory
    /// document covers employees who were granted leave.
    pub fn annual_ledger(&self, fiscal_year: i32) -> LedgerResult<Vec<LedgerRow>> {
        let today = self.clock.today();
        let (year_start, year_end) = self.policy.fiscal_year_range(fiscal_year)?;

        let mut rows = Vec::new();
        for employee_id in self.store.employee_ids() {
            let row = self.store.read_ledger(&employee_id, |ledger| {
                let cohort: Vec<&GrantTranche> = ledger
                    .tranches()
                    .iter()
                    .filter(|t| t.fiscal_year == fiscal_year)
                    .collect();
                let first = cohort.first()?;
                Some(LedgerRow {
                    employee_id: ledger.employee().id.clone(),
                    employee_name: ledger.employee().name.clone(),
                    grant_date: first.grant_date,
                    granted_days: cohort.iter().map(|t| t.granted_amount).sum(),
                    acquisition_dates: ledger.acquisition_dates_in_range(year_start, year_end),
                    days_taken: ledger.used_in_range(year_start, year_end),
                    days_remaining: ledger.total_open_balance(today),
                    fiscal_year,
                })
            })?;
            rows.extend(row);
        }
        Ok(rows)
    }

    /// The derived balance snapshot for one employee and fiscal year,
    /// evaluated as of today.
    pub fn balance_snapshot(
        &self,
        employee_id: &str,
        fiscal_year: i32,
    ) -> LedgerResult<BalanceSnapshot> {
        let today = self.clock.today();
        self.store
            .read_ledger(employee_id, |ledger| ledger.snapshot(fiscal_year, today))
    }
}

// Unknown-employee mapping lives here so every facade operation surfaces
// the same not-found error shape.
impl LedgerFacade {
    /// Returns true if the employee is registered.
    pub fn knows_employee(&self, employee_id: &str) -> bool {
        self.store.contains(employee_id)
    }

    /// Looks up an employee id, surfacing `EmployeeNotFound` when absent.
    pub fn require_employee(&self, employee_id: &str) -> LedgerResult<()> {
        if self.knows_employee(employee_id) {
            Ok(())
        } else {
            Err(LedgerError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            })
        }
    }
}
