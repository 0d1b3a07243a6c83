//! Derived reporting models: balance snapshots and statutory ledger rows.
//!
//! Both types are computed views over the tranche store with no independent
//! lifecycle; they are reported or cached, never persisted as source of truth.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-employee, per-fiscal-year balance accounting.
///
/// The cohort fields (`granted`, `used`, `expired`, `remaining`) cover the
/// tranche opened in `fiscal_year`; `balance` is the total remaining across
/// all currently open tranches. The conservation equation
/// `granted = used + expired + remaining` holds for the cohort after every
/// operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// The employee the snapshot belongs to.
    pub employee_id: String,
    /// The fiscal year cohort the snapshot covers.
    pub fiscal_year: i32,
    /// Days granted in tranches opened that year.
    pub granted: Decimal,
    /// Days consumed from that cohort.
    pub used: Decimal,
    /// Days from that cohort that lapsed unused.
    pub expired: Decimal,
    /// Days from that cohort still available.
    pub remaining: Decimal,
    /// Total remaining days across all open tranches, any cohort.
    pub balance: Decimal,
}

impl BalanceSnapshot {
    /// Returns true if the cohort satisfies the conservation equation.
    pub fn is_balanced(&self) -> bool {
        self.granted == self.used + self.expired + self.remaining
    }
}

/// Column headers of the statutory annual leave ledger (年次有給休暇管理簿).
///
/// Column order and the Japanese headers are a compatibility contract with
/// downstream report consumers and must not be altered.
pub const LEDGER_COLUMNS: [&str; 8] = [
    "社員番号",
    "氏名",
    "基準日",
    "付与日数",
    "取得日",
    "取得日数",
    "残日数",
    "年度",
];

/// One employee's row in the statutory annual leave ledger.
///
/// Serialized field names match [`LEDGER_COLUMNS`] exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Employee identifier.
    #[serde(rename = "社員番号")]
    pub employee_id: String,
    /// Employee display name.
    #[serde(rename = "氏名")]
    pub employee_name: String,
    /// The base date of the year's grant (基準日).
    #[serde(rename = "基準日")]
    pub grant_date: NaiveDate,
    /// Days granted on the base date.
    #[serde(rename = "付与日数")]
    pub granted_days: Decimal,
    /// Dates leave was taken during the year, ascending.
    #[serde(rename = "取得日")]
    pub acquisition_dates: Vec<NaiveDate>,
    /// Total days taken during the year.
    #[serde(rename = "取得日数")]
    pub days_taken: Decimal,
    /// Days remaining across open tranches at the reporting date.
    #[serde(rename = "残日数")]
    pub days_remaining: Decimal,
    /// The fiscal year the row covers.
    #[serde(rename = "年度")]
    pub fiscal_year: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_snapshot_is_balanced() {
        let snapshot = BalanceSnapshot {
            employee_id: "emp_001".to_string(),
            fiscal_year: 2025,
            granted: dec("12"),
            used: dec("4.5"),
            expired: dec("0"),
            remaining: dec("7.5"),
            balance: dec("10"),
        };
        assert!(snapshot.is_balanced());
    }

    #[test]
    fn test_snapshot_detects_imbalance() {
        let snapshot = BalanceSnapshot {
            employee_id: "emp_001".to_string(),
            fiscal_year: 2025,
            granted: dec("12"),
            used: dec("4"),
            expired: dec("0"),
            remaining: dec("7.5"),
            balance: dec("7.5"),
        };
        assert!(!snapshot.is_balanced());
    }

    #[test]
    fn test_ledger_column_contract() {
        assert_eq!(
            LEDGER_COLUMNS,
            [
                "社員番号",
                "氏名",
                "基準日",
                "付与日数",
                "取得日",
                "取得日数",
                "残日数",
                "年度"
            ]
        );
    }

    #[test]
    fn test_ledger_row_serializes_with_japanese_headers() {
        let row = LedgerRow {
            employee_id: "emp_001".to_string(),
            employee_name: "山田 太郎".to_string(),
            grant_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            granted_days: dec("12"),
            acquisition_dates: vec![NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()],
            days_taken: dec("1"),
            days_remaining: dec("11"),
            fiscal_year: 2025,
        };

        let json = serde_json::to_value(&row).unwrap();
        for column in LEDGER_COLUMNS {
            assert!(json.get(column).is_some(), "missing column {column}");
        }
        assert_eq!(json["社員番号"], "emp_001");
        assert_eq!(json["付与日数"], "12");
        assert_eq!(json["年度"], 2025);
    }

    #[test]
    fn test_ledger_row_round_trip() {
        let row = LedgerRow {
            employee_id: "emp_002".to_string(),
            employee_name: "佐藤 花子".to_string(),
            grant_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            granted_days: dec("20"),
            acquisition_dates: vec![],
            days_taken: dec("0"),
            days_remaining: dec("20"),
            fiscal_year: 2025,
        };
        let json = serde_json::to_string(&row).unwrap();
        let deserialized: LedgerRow = serde_json::from_str(&json).unwrap();
        assert_eq!(row, deserialized);
    }
}
