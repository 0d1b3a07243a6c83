//! Integration tests for the leave ledger engine.
//!
//! This suite drives the facade end to end and covers:
//! - Grant, deduction, and reversal lifecycles
//! - LIFO deduction ordering across tranches
//! - Fiscal-year rollover, expiry, and the accumulation cap
//! - Compliance classification and alerting
//! - Expiration watching
//! - The statutory annual ledger rows
//! - Race safety of concurrent deductions for one employee

use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use leave_ledger::clock::FixedClock;
use leave_ledger::compliance::{ComplianceStatus, ExpirySeverity};
use leave_ledger::config::LeavePolicy;
use leave_ledger::error::LedgerError;
use leave_ledger::facade::LedgerFacade;
use leave_ledger::ledger::TrancheStore;
use leave_ledger::models::{Employee, LEDGER_COLUMNS};

// =============================================================================
// Test Helpers
// =============================================================================

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::from_str(s).unwrap()
}

fn facade_at(today: &str) -> LedgerFacade {
    LedgerFacade::new(
        Arc::new(TrancheStore::new()),
        LeavePolicy::default(),
        Arc::new(FixedClock::new(date(today))),
    )
}

fn register(facade: &LedgerFacade, id: &str, name: &str, hire: &str) {
    facade
        .register_employee(Employee::new(id, name, date(hire)))
        .unwrap();
}

fn assert_conserved(facade: &LedgerFacade, employee_id: &str, fiscal_year: i32) {
    let snapshot = facade.balance_snapshot(employee_id, fiscal_year).unwrap();
    assert!(
        snapshot.is_balanced(),
        "cohort {fiscal_year} of {employee_id} out of balance: \
         granted {} != used {} + expired {} + remaining {}",
        snapshot.granted,
        snapshot.used,
        snapshot.expired,
        snapshot.remaining
    );
    assert!(snapshot.balance >= Decimal::ZERO);
}

// =============================================================================
// Grant and deduction lifecycle
// =============================================================================

#[test]
fn test_full_lifecycle_grant_use_report() {
    let facade = facade_at("2025-06-15");
    register(&facade, "emp_001", "山田 太郎", "2020-04-01");

    let report = facade.run_year_end_rollover(2025);
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].granted_days, 16);
    assert!(!report.is_partial_failure());

    let event = facade
        .record_approved_leave("emp_001", date("2025-06-16"), dec("1.5"))
        .unwrap();
    assert_eq!(event.total_taken(), dec("1.5"));
    assert_eq!(event.debits.len(), 1);

    let snapshot = facade.balance_snapshot("emp_001", 2025).unwrap();
    assert_eq!(snapshot.granted, dec("16"));
    assert_eq!(snapshot.used, dec("1.5"));
    assert_eq!(snapshot.balance, dec("14.5"));
    assert_conserved(&facade, "emp_001", 2025);
}

#[test]
fn test_lifo_ordering_across_rollovers() {
    let facade = facade_at("2026-04-02");
    register(&facade, "emp_001", "山田 太郎", "2020-04-01");

    facade.run_year_end_rollover(2025); // 16 days
    facade.run_year_end_rollover(2026); // 18 days

    // 17 days spans the new 18-day tranche only.
    let event = facade
        .record_approved_leave("emp_001", date("2026-04-10"), dec("17"))
        .unwrap();
    assert_eq!(event.debits.len(), 1);

    // The next request spills from the drained 2026 tranche into 2025's.
    let event = facade
        .record_approved_leave("emp_001", date("2026-04-11"), dec("2"))
        .unwrap();
    assert_eq!(event.debits.len(), 2);
    assert_eq!(event.debits[0].amount, dec("1"));
    assert_eq!(event.debits[1].amount, dec("1"));

    assert_conserved(&facade, "emp_001", 2025);
    assert_conserved(&facade, "emp_001", 2026);
}

#[test]
fn test_insufficient_balance_is_atomic() {
    let facade = facade_at("2025-06-15");
    register(&facade, "emp_001", "山田 太郎", "2024-10-01");

    facade.run_year_end_rollover(2025); // 10 days

    let before = facade.balance_snapshot("emp_001", 2025).unwrap();
    let result = facade.record_approved_leave("emp_001", date("2025-06-16"), dec("10.5"));
    match result {
        Err(LedgerError::InsufficientBalance {
            requested,
            available,
            shortfall,
        }) => {
            assert_eq!(requested, dec("10.5"));
            assert_eq!(available, dec("10"));
            assert_eq!(shortfall, dec("0.5"));
        }
        other => panic!("expected InsufficientBalance, got {other:?}"),
    }

    let after = facade.balance_snapshot("emp_001", 2025).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_reversal_restores_pre_deduction_state() {
    let facade = facade_at("2025-06-15");
    register(&facade, "emp_001", "山田 太郎", "2020-04-01");
    facade.run_year_end_rollover(2025);

    let before = facade.balance_snapshot("emp_001", 2025).unwrap();
    let event = facade
        .record_approved_leave("emp_001", date("2025-06-16"), dec("3"))
        .unwrap();
    let reversal = facade.reverse_leave("emp_001", event.id).unwrap();

    assert_eq!(reversal.credited.len(), 1);
    assert!(reversal.forfeited.is_empty());
    let after = facade.balance_snapshot("emp_001", 2025).unwrap();
    assert_eq!(before, after);

    // A second reversal of the same event is rejected.
    assert!(matches!(
        facade.reverse_leave("emp_001", event.id),
        Err(LedgerError::UsageEventAlreadyReversed { .. })
    ));
}

// =============================================================================
// Rollover, expiry, and the accumulation cap
// =============================================================================

#[test]
fn test_two_year_window_expires_after_rollover_boundary() {
    let facade = facade_at("2027-06-15");
    register(&facade, "emp_001", "山田 太郎", "2020-04-01");

    facade.run_year_end_rollover(2025); // 16 days, valid through 2027-04-01
    facade.run_year_end_rollover(2026); // 18 days
    let report = facade.run_year_end_rollover(2027); // 20 days

    // The 2025 window runs through 2027-04-01 inclusive, so the sweep at
    // exactly that date closes nothing; the cap trims the surplus instead
    // (16 + 18 + 20 = 54, 14 over the ceiling, oldest first).
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.newly_expired, Decimal::ZERO);
    assert_eq!(outcome.cap_trimmed, dec("14"));

    // By mid-June the 2025 tranche has lapsed outright; its leftover two
    // days report as expired, never as balance.
    let snapshot_2025 = facade.balance_snapshot("emp_001", 2025).unwrap();
    assert_eq!(snapshot_2025.expired, dec("16"));
    assert_eq!(snapshot_2025.remaining, Decimal::ZERO);
    assert_conserved(&facade, "emp_001", 2025);

    let snapshot_2027 = facade.balance_snapshot("emp_001", 2027).unwrap();
    assert_eq!(snapshot_2027.balance, dec("38"));
}

#[test]
fn test_accumulation_cap_pushes_surplus_into_expired() {
    let facade = facade_at("2026-06-15");
    register(&facade, "emp_001", "山田 太郎", "2015-04-01");

    facade.run_year_end_rollover(2025); // 20 days
    let report = facade.run_year_end_rollover(2026); // +20 -> 40, at the cap

    assert_eq!(report.outcomes[0].cap_trimmed, Decimal::ZERO);

    let report = facade.run_year_end_rollover(2027); // 2025 lapses, +20 -> 40

    // 2025's 20 lapse on 2027-04-01 (expiry 2027-04-01 is inclusive, so
    // they survive the sweep at exactly that date and the cap trims them).
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.newly_expired + outcome.cap_trimmed, dec("20"));

    let snapshot = facade.balance_snapshot("emp_001", 2027).unwrap();
    assert_eq!(snapshot.balance, dec("40"));
    for year in [2025, 2026, 2027] {
        assert_conserved(&facade, "emp_001", year);
    }
}

#[test]
fn test_reversal_after_expiry_does_not_resurrect_days() {
    let facade = facade_at("2027-04-02");
    register(&facade, "emp_001", "山田 太郎", "2020-04-01");

    // Grant 2025, take 2 days, roll forward until the tranche lapses.
    facade.run_year_end_rollover(2025);
    let event = facade
        .record_approved_leave("emp_001", date("2025-06-16"), dec("2"))
        .unwrap();
    facade.run_year_end_rollover(2026);
    facade.run_year_end_rollover(2027); // 2025 tranche swept here

    let balance_before = facade.balance_snapshot("emp_001", 2027).unwrap().balance;
    let reversal = facade.reverse_leave("emp_001", event.id).unwrap();

    assert!(reversal.credited.is_empty());
    assert_eq!(reversal.forfeited.len(), 1);
    assert_eq!(reversal.forfeited[0].amount, dec("2"));

    // The forfeited days are booked as expired, never as balance.
    let balance_after = facade.balance_snapshot("emp_001", 2027).unwrap().balance;
    assert_eq!(balance_before, balance_after);
    let snapshot = facade.balance_snapshot("emp_001", 2027).unwrap();
    assert_eq!(snapshot.expired, dec("2"));
    assert_conserved(&facade, "emp_001", 2027);
}

#[test]
fn test_rollover_partial_failure_reports_per_employee() {
    let store = Arc::new(TrancheStore::new());
    let policy = LeavePolicy {
        fiscal_year_start_month: 2,
        fiscal_year_start_day: 30,
        ..LeavePolicy::default()
    };
    let facade = LedgerFacade::new(
        store,
        policy,
        Arc::new(FixedClock::new(date("2025-06-15"))),
    );
    register(&facade, "emp_001", "a", "2020-04-01");
    register(&facade, "emp_002", "b", "2020-04-01");

    let report = facade.run_year_end_rollover(2025);

    assert!(report.is_partial_failure());
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].employee_id, "emp_001");
    assert!(report.failures[0].error.contains("not a valid date"));
}

// =============================================================================
// Compliance
// =============================================================================

#[test]
fn test_compliance_report_classifies_and_alerts() {
    let facade = facade_at("2026-01-15");
    register(&facade, "emp_001", "新入 社員", "2025-09-20"); // no grant yet
    register(&facade, "emp_002", "山田 太郎", "2020-04-01"); // 16 days
    register(&facade, "emp_003", "佐藤 花子", "2018-04-01"); // 20 days
    register(&facade, "emp_004", "鈴木 一郎", "2019-04-01"); // 20 days

    facade.run_year_end_rollover(2025);
    facade
        .record_approved_leave("emp_002", date("2025-07-01"), dec("2"))
        .unwrap();
    facade
        .record_approved_leave("emp_003", date("2025-07-01"), dec("4"))
        .unwrap();
    facade
        .record_approved_leave("emp_004", date("2025-07-01"), dec("5"))
        .unwrap();

    let report = facade.compliance_report(2025).unwrap();

    assert_eq!(report.records.len(), 4);
    let by_id = |id: &str| {
        report
            .records
            .iter()
            .find(|r| r.employee_id == id)
            .unwrap()
    };
    assert_eq!(by_id("emp_001").status, ComplianceStatus::Unknown);
    assert_eq!(by_id("emp_002").status, ComplianceStatus::NonCompliant);
    assert_eq!(by_id("emp_003").status, ComplianceStatus::AtRisk);
    assert_eq!(by_id("emp_004").status, ComplianceStatus::Compliant);

    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].employee_id, "emp_002");
    assert_eq!(report.alerts[0].days_remaining_to_comply, dec("3"));
}

#[test]
fn test_compliance_not_applicable_below_ten_granted() {
    // Policy with a reduced table so a cohort exists but stays under 10.
    let mut policy = LeavePolicy::default();
    for step in &mut policy.grant_table {
        step.granted_days = 8;
    }
    let facade = LedgerFacade::new(
        Arc::new(TrancheStore::new()),
        policy,
        Arc::new(FixedClock::new(date("2026-01-15"))),
    );
    register(&facade, "emp_001", "山田 太郎", "2020-04-01");
    facade.run_year_end_rollover(2025);

    let report = facade.compliance_report(2025).unwrap();
    assert_eq!(report.records[0].status, ComplianceStatus::NotApplicable);
    assert!(report.alerts.is_empty());
}

// =============================================================================
// Expiration watching
// =============================================================================

#[test]
fn test_expiring_soon_warns_and_escalates() {
    // 2025 tranche expires 2027-04-01.
    let facade = facade_at("2027-03-10");
    register(&facade, "emp_001", "山田 太郎", "2020-04-01");
    facade.run_year_end_rollover(2025);
    facade.run_year_end_rollover(2026);
    facade
        .record_approved_leave("emp_001", date("2026-06-01"), dec("30"))
        .unwrap();

    // 22 days out: warning. Fiscal 2026 spans 2026-04-01..2027-03-31.
    let alerts = facade.expiring_soon(2026, None).unwrap();
    assert!(alerts.is_empty(), "expiry date 2027-04-01 is fiscal 2027");

    let alerts = facade.expiring_soon(2027, None).unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].employee_id, "emp_001");
    assert_eq!(alerts[0].expiry_date, date("2027-04-01"));
    assert_eq!(alerts[0].days_until_expiry, 22);
    assert_eq!(alerts[0].severity, ExpirySeverity::Warning);
    assert_eq!(alerts[0].amount_at_risk, dec("4"));

    // A custom three-day window excludes it entirely.
    let alerts = facade.expiring_soon(2027, Some(3)).unwrap();
    assert!(alerts.is_empty());
}

#[test]
fn test_expiring_soon_critical_within_seven_days() {
    let facade = facade_at("2027-03-27");
    register(&facade, "emp_001", "山田 太郎", "2020-04-01");
    facade.run_year_end_rollover(2025);

    let alerts = facade.expiring_soon(2027, None).unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].days_until_expiry, 5);
    assert_eq!(alerts[0].severity, ExpirySeverity::Critical);
}

// =============================================================================
// Statutory annual ledger
// =============================================================================

#[test]
fn test_annual_ledger_rows_and_column_contract() {
    let facade = facade_at("2026-01-15");
    register(&facade, "emp_002", "佐藤 花子", "2018-04-01");
    register(&facade, "emp_001", "山田 太郎", "2020-04-01");
    facade.run_year_end_rollover(2025);
    facade
        .record_approved_leave("emp_001", date("2025-07-01"), dec("2"))
        .unwrap();
    facade
        .record_approved_leave("emp_001", date("2025-05-12"), dec("0.5"))
        .unwrap();

    let rows = facade.annual_ledger(2025).unwrap();

    // Ordered by employee id.
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].employee_id, "emp_001");
    assert_eq!(rows[1].employee_id, "emp_002");

    let row = &rows[0];
    assert_eq!(row.employee_name, "山田 太郎");
    assert_eq!(row.grant_date, date("2025-04-01"));
    assert_eq!(row.granted_days, dec("16"));
    assert_eq!(
        row.acquisition_dates,
        vec![date("2025-05-12"), date("2025-07-01")]
    );
    assert_eq!(row.days_taken, dec("2.5"));
    assert_eq!(row.days_remaining, dec("13.5"));
    assert_eq!(row.fiscal_year, 2025);

    // The serialized headers match the statutory column contract exactly.
    let json = serde_json::to_value(row).unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), LEDGER_COLUMNS.len());
    for column in LEDGER_COLUMNS {
        assert!(object.contains_key(column), "missing column {column}");
    }
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_deductions_cannot_overdraw() {
    let facade = Arc::new(facade_at("2025-06-15"));
    register(&facade, "emp_001", "山田 太郎", "2024-10-01");
    facade.run_year_end_rollover(2025); // 10 days

    // Two 6-day requests individually fit but jointly exceed the balance.
    let mut handles = Vec::new();
    for _ in 0..2 {
        let facade = Arc::clone(&facade);
        handles.push(thread::spawn(move || {
            facade.record_approved_leave("emp_001", date("2025-06-16"), dec("6"))
        }));
    }
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one of the two requests may succeed");

    let snapshot = facade.balance_snapshot("emp_001", 2025).unwrap();
    assert_eq!(snapshot.balance, dec("4"));
    assert_conserved(&facade, "emp_001", 2025);
}

#[test]
fn test_writes_on_other_employees_proceed_concurrently() {
    let facade = Arc::new(facade_at("2025-06-15"));
    for i in 0..8 {
        register(
            &facade,
            &format!("emp_{i:03}"),
            "従業員",
            "2020-04-01",
        );
    }
    facade.run_year_end_rollover(2025);

    let mut handles = Vec::new();
    for i in 0..8 {
        let facade = Arc::clone(&facade);
        handles.push(thread::spawn(move || {
            facade.record_approved_leave(
                &format!("emp_{i:03}"),
                date("2025-06-16"),
                dec("1"),
            )
        }));
    }
    for handle in handles {
        assert!(handle.join().unwrap().is_ok());
    }

    for i in 0..8 {
        let snapshot = facade
            .balance_snapshot(&format!("emp_{i:03}"), 2025)
            .unwrap();
        assert_eq!(snapshot.used, dec("1"));
    }
}
