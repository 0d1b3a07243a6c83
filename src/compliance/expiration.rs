//! Expiration watching.
//!
//! Scans for tranches whose validity window closes soon and classifies the
//! urgency, so employees can be nudged to use days before they lapse.
//! Alerts are returned as values; the caller owns whatever alert store or
//! notification channel they land in.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::EmployeeLedger;

/// Urgency of an approaching expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpirySeverity {
    /// Expiry is more than the critical threshold away.
    Warning,
    /// Expiry is within the critical threshold (default seven days).
    Critical,
}

/// One employee's at-risk balance inside the warning window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryAlert {
    /// The employee whose days are at risk.
    pub employee_id: String,
    /// Total remaining days on tranches expiring inside the window.
    pub amount_at_risk: Decimal,
    /// The soonest expiry date among those tranches.
    pub expiry_date: NaiveDate,
    /// Days from today until that expiry.
    pub days_until_expiry: i64,
    /// Urgency classification.
    pub severity: ExpirySeverity,
}

/// Scans one employee for tranches expiring inside the window.
///
/// Considers open tranches with `today <= expiry <= today + window_days`,
/// optionally restricted to expiry dates inside `expiry_range` (used to
/// scope a report to one fiscal year). Emits at most one alert per
/// employee: the at-risk amounts are totalled and the soonest expiry
/// drives the date and severity.
pub fn scan_employee(
    ledger: &EmployeeLedger,
    today: NaiveDate,
    window_days: i64,
    critical_threshold_days: i64,
    expiry_range: Option<(NaiveDate, NaiveDate)>,
) -> Option<ExpiryAlert> {
    let window_end = today + chrono::Duration::days(window_days);

    let mut amount_at_risk = Decimal::ZERO;
    let mut soonest: Option<NaiveDate> = None;
    for tranche in ledger.open_tranches(today) {
        if tranche.expiry_date > window_end {
            continue;
        }
        if let Some((start, end)) = expiry_range {
            if tranche.expiry_date < start || tranche.expiry_date > end {
                continue;
            }
        }
        amount_at_risk += tranche.remaining_amount;
        soonest = Some(match soonest {
            Some(date) => date.min(tranche.expiry_date),
            None => tranche.expiry_date,
        });
    }

    let expiry_date = soonest?;
    let days_until_expiry = (expiry_date - today).num_days();
    let severity = if days_until_expiry <= critical_threshold_days {
        ExpirySeverity::Critical
    } else {
        ExpirySeverity::Warning
    };

    Some(ExpiryAlert {
        employee_id: ledger.employee().id.clone(),
        amount_at_risk,
        expiry_date,
        days_until_expiry,
        severity,
    })
}
