//! Policy configuration for the leave ledger engine.
//!
//! This module provides the typed leave policy (grant table, fiscal-year
//! anchor, validity window, accumulation cap, compliance thresholds) and a
//! loader that reads overrides from a YAML file. The defaults carry the
//! statutory values, so most deployments never load a file at all.
//!
//! # Example
//!
//! ```
//! use leave_ledger::config::LeavePolicy;
//!
//! let policy = LeavePolicy::default();
//! assert_eq!(policy.fiscal_year_start_month, 4);
//! ```

mod loader;
mod types;

pub use loader::PolicyLoader;
pub use types::{CompliancePolicy, ExpiryWarningPolicy, GrantStep, LeavePolicy};
