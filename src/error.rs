//! Error types for the leave ledger engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all failure conditions the ledger can surface to callers.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// The main error type for the leave ledger engine.
///
/// Every fallible operation returns this type, so callers handle each
/// failure path explicitly instead of catching exceptions.
///
/// # Example
///
/// ```
/// use leave_ledger::error::LedgerError;
///
/// let error = LedgerError::EmployeeNotFound {
///     employee_id: "emp_404".to_string(),
/// };
/// assert_eq!(error.to_string(), "Employee not found: emp_404");
/// ```
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The requested deduction exceeds the total open remaining balance.
    #[error("Insufficient balance: requested {requested}, available {available} (short {shortfall})")]
    InsufficientBalance {
        /// The number of days requested.
        requested: Decimal,
        /// The total remaining days across all open tranches.
        available: Decimal,
        /// The unmet portion of the request.
        shortfall: Decimal,
    },

    /// An operation referenced an employee the store does not know.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The employee identifier that was not found.
        employee_id: String,
    },

    /// Registration referenced an employee id the store already holds.
    #[error("Employee already registered: {employee_id}")]
    EmployeeAlreadyRegistered {
        /// The employee identifier that was already present.
        employee_id: String,
    },

    /// A usage amount was zero, negative, or not a multiple of half a day.
    #[error("Invalid amount {amount}: {message}")]
    InvalidAmount {
        /// The rejected amount.
        amount: Decimal,
        /// A description of what made the amount invalid.
        message: String,
    },

    /// A tranche failed its construction invariants.
    #[error("Invalid tranche: {message}")]
    InvalidTranche {
        /// A description of the violated invariant.
        message: String,
    },

    /// A reversal referenced a usage event the store does not hold.
    #[error("Usage event not found: {event_id}")]
    UsageEventNotFound {
        /// The usage event identifier that was not found.
        event_id: Uuid,
    },

    /// A reversal referenced a usage event that was already reversed.
    #[error("Usage event already reversed: {event_id}")]
    UsageEventAlreadyReversed {
        /// The usage event identifier.
        event_id: Uuid,
    },

    /// Policy file was not found at the specified path.
    #[error("Policy file not found: {path}")]
    PolicyNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Policy file could not be parsed.
    #[error("Failed to parse policy file '{path}': {message}")]
    PolicyParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The policy contents are unusable (empty grant table, bad dates).
    #[error("Invalid policy: {message}")]
    InvalidPolicy {
        /// A description of what made the policy invalid.
        message: String,
    },
}

/// A type alias for Results that return LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;
