//! Employee model.
//!
//! This module defines the Employee struct whose seniority drives
//! statutory grant amounts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Represents an employee whose paid leave is tracked by the ledger.
///
/// The record is immutable once registered; employment-status changes are
/// handled outside the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee (社員番号).
    pub id: String,
    /// The employee's display name (氏名).
    pub name: String,
    /// The date continuous service began.
    pub hire_date: NaiveDate,
}

impl Employee {
    /// Creates an employee record.
    pub fn new(id: impl Into<String>, name: impl Into<String>, hire_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            hire_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_employee() {
        let json = r#"{
            "id": "emp_001",
            "name": "山田 太郎",
            "hire_date": "2020-10-01"
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.id, "emp_001");
        assert_eq!(employee.name, "山田 太郎");
        assert_eq!(
            employee.hire_date,
            NaiveDate::from_ymd_opt(2020, 10, 1).unwrap()
        );
    }

    #[test]
    fn test_serialize_employee_round_trip() {
        let employee = Employee::new(
            "emp_002",
            "佐藤 花子",
            NaiveDate::from_ymd_opt(2018, 4, 1).unwrap(),
        );
        let json = serde_json::to_string(&employee).unwrap();
        let deserialized: Employee = serde_json::from_str(&json).unwrap();
        assert_eq!(employee, deserialized);
    }
}
