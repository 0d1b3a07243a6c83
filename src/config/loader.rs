//! Policy loading functionality.
//!
//! This module provides the [`PolicyLoader`] type for loading a leave
//! policy from a YAML file, falling back to the statutory defaults.

use std::fs;
use std::path::Path;

use crate::error::{LedgerError, LedgerResult};

use super::types::LeavePolicy;

/// Loads and provides access to the leave policy.
///
/// # Example
///
/// ```no_run
/// use leave_ledger::config::PolicyLoader;
///
/// let loader = PolicyLoader::load("./policy/leave.yaml").unwrap();
/// println!("fiscal year starts in month {}", loader.policy().fiscal_year_start_month);
/// ```
#[derive(Debug, Clone)]
pub struct PolicyLoader {
    policy: LeavePolicy,
}

impl PolicyLoader {
    /// Loads a policy from the specified YAML file and validates it.
    ///
    /// Fields absent from the file keep their statutory defaults.
    ///
    /// # Errors
    ///
    /// Returns `PolicyNotFound` if the file cannot be read,
    /// `PolicyParseError` if it is not valid YAML for a policy, and
    /// `InvalidPolicy` if the parsed policy fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> LedgerResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| LedgerError::PolicyNotFound {
            path: path_str.clone(),
        })?;

        let policy: LeavePolicy =
            serde_yaml::from_str(&content).map_err(|e| LedgerError::PolicyParseError {
                path: path_str,
                message: e.to_string(),
            })?;

        policy.validate()?;
        Ok(Self { policy })
    }

    /// A loader carrying the unmodified statutory policy.
    pub fn statutory() -> Self {
        Self {
            policy: LeavePolicy::default(),
        }
    }

    /// Returns the loaded policy.
    pub fn policy(&self) -> &LeavePolicy {
        &self.policy
    }

    /// Consumes the loader and returns the policy.
    pub fn into_policy(self) -> LeavePolicy {
        self.policy
    }
}
