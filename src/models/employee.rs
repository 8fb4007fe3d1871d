//! Employee model and related types.
//!
//! Employees are owned by the directory collaborator; the engine only reads
//! the fields that drive eligibility (gender, joining date) and routing
//! (organization, manager).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Gender as recorded by the employee directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Any other recorded gender.
    Other,
}

/// Employment status as recorded by the employee directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Currently working.
    Active,
    /// Employed but currently away on leave.
    OnLeave,
    /// Suspended or otherwise inactive.
    Inactive,
    /// No longer employed.
    Terminated,
}

impl EmployeeStatus {
    /// Every status, in declaration order.
    pub const ALL: [EmployeeStatus; 4] = [
        EmployeeStatus::Active,
        EmployeeStatus::OnLeave,
        EmployeeStatus::Inactive,
        EmployeeStatus::Terminated,
    ];

    /// Returns true if the annual rollover recomputes balances for this status.
    pub fn receives_rollover(&self) -> bool {
        matches!(self, EmployeeStatus::Active | EmployeeStatus::OnLeave)
    }
}

/// Represents an employee subject to leave entitlements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// The organization the employee belongs to.
    pub organization_id: String,
    /// The employee's recorded gender.
    pub gender: Gender,
    /// The date the employee joined the organization.
    pub joining_date: NaiveDate,
    /// Current employment status.
    pub status: EmployeeStatus,
    /// The employee's direct manager, if any.
    #[serde(default)]
    pub manager_id: Option<String>,
}

impl Employee {
    /// Returns the employee's tenure in whole months on `today`.
    ///
    /// Tenure is the calendar difference in years and months between the
    /// joining date and `today`; the day of month is ignored. Joining dates
    /// in the future yield zero.
    ///
    /// # Example
    ///
    /// ```
    /// use leave_engine::models::{Employee, EmployeeStatus, Gender};
    /// use chrono::NaiveDate;
    ///
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     organization_id: "org_001".to_string(),
    ///     gender: Gender::Female,
    ///     joining_date: NaiveDate::from_ymd_opt(2025, 11, 30).unwrap(),
    ///     status: EmployeeStatus::Active,
    ///     manager_id: None,
    /// };
    /// let today = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
    /// assert_eq!(employee.tenure_months(today), 6);
    /// ```
    pub fn tenure_months(&self, today: NaiveDate) -> u32 {
        let months = (today.year() - self.joining_date.year()) * 12
            + (today.month() as i32 - self.joining_date.month() as i32);
        months.max(0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_employee(joining_date: NaiveDate) -> Employee {
        Employee {
            id: "emp_001".to_string(),
            organization_id: "org_001".to_string(),
            gender: Gender::Male,
            joining_date,
            status: EmployeeStatus::Active,
            manager_id: Some("mgr_001".to_string()),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_tenure_ignores_day_of_month() {
        let employee = create_test_employee(date(2024, 1, 31));
        // One calendar month later even though only one day elapsed.
        assert_eq!(employee.tenure_months(date(2024, 2, 1)), 1);
    }

    #[test]
    fn test_tenure_across_years() {
        let employee = create_test_employee(date(2023, 10, 15));
        assert_eq!(employee.tenure_months(date(2026, 3, 1)), 29);
    }

    #[test]
    fn test_tenure_same_month_is_zero() {
        let employee = create_test_employee(date(2026, 3, 1));
        assert_eq!(employee.tenure_months(date(2026, 3, 31)), 0);
    }

    #[test]
    fn test_future_joining_date_floors_at_zero() {
        let employee = create_test_employee(date(2027, 1, 1));
        assert_eq!(employee.tenure_months(date(2026, 6, 1)), 0);
    }

    #[test]
    fn test_rollover_statuses() {
        assert!(EmployeeStatus::Active.receives_rollover());
        assert!(EmployeeStatus::OnLeave.receives_rollover());
        assert!(!EmployeeStatus::Inactive.receives_rollover());
        assert!(!EmployeeStatus::Terminated.receives_rollover());
    }

    #[test]
    fn test_deserialize_employee_without_manager() {
        let json = r#"{
            "id": "emp_002",
            "organization_id": "org_001",
            "gender": "female",
            "joining_date": "2022-03-01",
            "status": "on_leave"
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.gender, Gender::Female);
        assert_eq!(employee.status, EmployeeStatus::OnLeave);
        assert!(employee.manager_id.is_none());
    }
}
