//! Core data models for the leave ledger engine.
//!
//! This module contains all the domain models used throughout the engine.

mod employee;
mod snapshot;
mod tranche;
mod usage;

pub use employee::Employee;
pub use snapshot::{BalanceSnapshot, LEDGER_COLUMNS, LedgerRow};
pub use tranche::GrantTranche;
pub use usage::{ReversalEvent, TrancheDebit, UsageEvent, is_half_day_multiple};
