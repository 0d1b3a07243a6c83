//! Per-employee tranche storage.
//!
//! [`TrancheStore`] is the exclusive owner of tranche, usage, and reversal
//! records. All access goes through closure-scoped read/write methods: each
//! employee sits behind its own mutex, so mutations are exclusive per
//! employee while reads observe a consistent snapshot and operations on
//! different employees proceed concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{BalanceSnapshot, Employee, GrantTranche, ReversalEvent, UsageEvent};

/// One employee's complete ledger state: tranches plus the append-only
/// usage and reversal histories.
#[derive(Debug, Clone)]
pub struct EmployeeLedger {
    employee: Employee,
    tranches: Vec<GrantTranche>,
    usage_events: Vec<UsageEvent>,
    reversals: Vec<ReversalEvent>,
}

impl EmployeeLedger {
    /// Creates an empty ledger for the employee.
    pub fn new(employee: Employee) -> Self {
        Self {
            employee,
            tranches: Vec::new(),
            usage_events: Vec::new(),
            reversals: Vec::new(),
        }
    }

    /// The employee this ledger belongs to.
    pub fn employee(&self) -> &Employee {
        &self.employee
    }

    /// All tranches in insertion (grant) order.
    pub fn tranches(&self) -> &[GrantTranche] {
        &self.tranches
    }

    /// All recorded usage events in insertion order.
    pub fn usage_events(&self) -> &[UsageEvent] {
        &self.usage_events
    }

    /// All recorded reversal events in insertion order.
    pub fn reversals(&self) -> &[ReversalEvent] {
        &self.reversals
    }

    /// Returns the tranches that are candidates for deduction as of the
    /// given date: days remaining and validity window not elapsed.
    pub fn open_tranches(&self, as_of: NaiveDate) -> Vec<&GrantTranche> {
        self.tranches.iter().filter(|t| t.is_open(as_of)).collect()
    }

    /// Appends a tranche after checking its accounting invariants.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTranche` if any amount is negative or the remaining
    /// and expired portions exceed the granted amount.
    pub fn add_tranche(&mut self, tranche: GrantTranche) -> LedgerResult<()> {
        if tranche.granted_amount < Decimal::ZERO {
            return Err(LedgerError::InvalidTranche {
                message: format!("granted amount {} is negative", tranche.granted_amount),
            });
        }
        if tranche.remaining_amount < Decimal::ZERO || tranche.expired_amount < Decimal::ZERO {
            return Err(LedgerError::InvalidTranche {
                message: "remaining and expired amounts must be non-negative".to_string(),
            });
        }
        if tranche.remaining_amount + tranche.expired_amount > tranche.granted_amount {
            return Err(LedgerError::InvalidTranche {
                message: format!(
                    "remaining {} + expired {} exceeds granted {}",
                    tranche.remaining_amount, tranche.expired_amount, tranche.granted_amount
                ),
            });
        }
        self.tranches.push(tranche);
        Ok(())
    }

    /// Moves the remaining amount of every lapsed tranche into its expired
    /// total and returns the sum that newly expired.
    ///
    /// Idempotent: tranches already swept are untouched on a second run.
    pub fn apply_expiry(&mut self, as_of: NaiveDate) -> Decimal {
        let mut newly_expired = Decimal::ZERO;
        for tranche in &mut self.tranches {
            if tranche.has_lapsed(as_of) && tranche.remaining_amount > Decimal::ZERO {
                newly_expired += tranche.remaining_amount;
                tranche.expired_amount += tranche.remaining_amount;
                tranche.remaining_amount = Decimal::ZERO;
            }
        }
        newly_expired
    }

    /// Total remaining days across all open tranches.
    pub fn total_open_balance(&self, as_of: NaiveDate) -> Decimal {
        self.tranches
            .iter()
            .filter(|t| t.is_open(as_of))
            .map(|t| t.remaining_amount)
            .sum()
    }

    /// Days taken during the given inclusive date range, excluding
    /// reversed events.
    pub fn used_in_range(&self, start: NaiveDate, end: NaiveDate) -> Decimal {
        self.usage_events
            .iter()
            .filter(|e| e.use_date >= start && e.use_date <= end && !self.is_reversed(e.id))
            .map(UsageEvent::total_taken)
            .sum()
    }

    /// Dates leave was taken during the given inclusive range, ascending,
    /// excluding reversed events.
    pub fn acquisition_dates_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self
            .usage_events
            .iter()
            .filter(|e| e.use_date >= start && e.use_date <= end && !self.is_reversed(e.id))
            .map(|e| e.use_date)
            .collect();
        dates.sort();
        dates
    }

    /// Returns true if the usage event has been compensated by a reversal.
    pub fn is_reversed(&self, event_id: Uuid) -> bool {
        self.reversals.iter().any(|r| r.original_event_id == event_id)
    }

    /// Per-cohort balance accounting as of the given date.
    ///
    /// A lapsed-but-unswept tranche is reported as expired, never as
    /// balance, so the view is correct even before an expiry sweep runs.
    pub fn snapshot(&self, fiscal_year: i32, as_of: NaiveDate) -> BalanceSnapshot {
        let mut granted = Decimal::ZERO;
        let mut used = Decimal::ZERO;
        let mut expired = Decimal::ZERO;
        let mut remaining = Decimal::ZERO;
        let mut balance = Decimal::ZERO;

        for tranche in &self.tranches {
            let lapsed = tranche.has_lapsed(as_of);
            let effective_remaining = if lapsed {
                Decimal::ZERO
            } else {
                tranche.remaining_amount
            };
            let effective_expired = if lapsed {
                tranche.expired_amount + tranche.remaining_amount
            } else {
                tranche.expired_amount
            };

            balance += effective_remaining;
            if tranche.fiscal_year == fiscal_year {
                granted += tranche.granted_amount;
                used += tranche.used_amount();
                expired += effective_expired;
                remaining += effective_remaining;
            }
        }

        BalanceSnapshot {
            employee_id: self.employee.id.clone(),
            fiscal_year,
            granted,
            used,
            expired,
            remaining,
            balance,
        }
    }

    pub(crate) fn tranches_mut(&mut self) -> &mut Vec<GrantTranche> {
        &mut self.tranches
    }

    pub(crate) fn record_usage(&mut self, event: UsageEvent) {
        self.usage_events.push(event);
    }

    pub(crate) fn record_reversal(&mut self, reversal: ReversalEvent) {
        self.reversals.push(reversal);
    }
}

/// Durable per-employee collection of ledgers.
///
/// Mutating operations take the target employee's mutex for the whole
/// read-modify-write, which is the single-writer transaction boundary the
/// deduction and carryover paths rely on.
#[derive(Debug, Default)]
pub struct TrancheStore {
    employees: RwLock<HashMap<String, Arc<Mutex<EmployeeLedger>>>>,
}

impl TrancheStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an employee and opens an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns `EmployeeAlreadyRegistered` if the id is already present;
    /// employee records are immutable once recorded.
    pub fn register_employee(&self, employee: Employee) -> LedgerResult<()> {
        let mut employees = self
            .employees
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if employees.contains_key(&employee.id) {
            return Err(LedgerError::EmployeeAlreadyRegistered {
                employee_id: employee.id.clone(),
            });
        }
        employees.insert(
            employee.id.clone(),
            Arc::new(Mutex::new(EmployeeLedger::new(employee))),
        );
        Ok(())
    }

    /// Returns all registered employee ids in ascending order.
    pub fn employee_ids(&self) -> Vec<String> {
        let employees = self
            .employees
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<String> = employees.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns true if the employee is registered.
    pub fn contains(&self, employee_id: &str) -> bool {
        self.employees
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(employee_id)
    }

    fn ledger_handle(&self, employee_id: &str) -> LedgerResult<Arc<Mutex<EmployeeLedger>>> {
        let employees = self
            .employees
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        employees
            .get(employee_id)
            .cloned()
            .ok_or_else(|| LedgerError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            })
    }

    /// Runs a read-only closure against one employee's ledger.
    ///
    /// The employee mutex is held for the duration of the closure, so the
    /// view is a consistent snapshot even while writers target other
    /// employees.
    pub fn read_ledger<R>(
        &self,
        employee_id: &str,
        f: impl FnOnce(&EmployeeLedger) -> R,
    ) -> LedgerResult<R> {
        let handle = self.ledger_handle(employee_id)?;
        let ledger = handle.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&ledger))
    }

    /// Runs a mutating closure against one employee's ledger under the
    /// employee's exclusive lock.
    pub fn write_ledger<R>(
        &self,
        employee_id: &str,
        f: impl FnOnce(&mut EmployeeLedger) -> LedgerResult<R>,
    ) -> LedgerResult<R> {
        let handle = self.ledger_handle(employee_id)?;
        let mut ledger = handle.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut ledger)
    }
}
