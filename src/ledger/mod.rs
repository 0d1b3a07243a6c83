//! Ledger core: grant calculation, tranche storage, deduction, and
//! fiscal-year carryover.
//!
//! This module contains the mutating half of the engine. The read-only
//! observers (compliance, expiration) live in [`crate::compliance`].

mod carryover;
mod deduction;
mod grant;
mod store;

pub use carryover::{
    RolloverFailure, RolloverOutcome, RolloverReport, enforce_accumulation_cap, rollover_employee,
    run_rollover,
};
pub use deduction::{deduct, reverse, validate_usage_amount};
pub use grant::{GrantRecommendation, granted_days, seniority_years};
pub use store::{EmployeeLedger, TrancheStore};
