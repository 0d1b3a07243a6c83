//! Read-only observers over the tranche store: five-day-rule compliance
//! and expiration watching.

mod checker;
mod expiration;

pub use checker::{
    ComplianceAlert, ComplianceRecord, ComplianceReport, ComplianceStatus, classify,
    evaluate_employee,
};
pub use expiration::{ExpiryAlert, ExpirySeverity, scan_employee};
