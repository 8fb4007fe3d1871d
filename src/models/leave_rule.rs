//! Leave rules and their assignment to employees.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Employee, Gender, LeaveType};

/// Organization-level policy for one leave type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRule {
    /// Unique identifier for the rule.
    pub id: String,
    /// The organization the rule belongs to.
    pub organization_id: String,
    /// The leave type the rule governs.
    pub leave_type: LeaveType,
    /// Base yearly entitlement in days.
    pub max_allowed: Decimal,
    /// Configured carry-forward ceiling. Informational; the rollover applies
    /// its own fixed cap.
    pub carry_forward_max: Decimal,
    /// Informational accrual rate (days per month).
    #[serde(default)]
    pub accrual_rate: Option<Decimal>,
    /// Whether the rule is in force.
    pub is_active: bool,
    /// Restricts the rule to one gender when set.
    #[serde(default)]
    pub applicable_gender: Option<Gender>,
    /// Minimum tenure in whole months before the rule applies.
    #[serde(default)]
    pub min_tenure_months: u32,
    /// Whether requests must carry a supporting document.
    #[serde(default)]
    pub requires_document: bool,
    /// When the rule was created.
    pub created_at: NaiveDateTime,
    /// Optimistic concurrency version, bumped by the store on every write.
    #[serde(default)]
    pub version: u64,
}

impl LeaveRule {
    /// Returns true if the rule's gender and tenure restrictions admit `employee`.
    pub fn admits(&self, employee: &Employee, today: NaiveDate) -> bool {
        let gender_matches = self
            .applicable_gender
            .is_none_or(|gender| gender == employee.gender);
        gender_matches && employee.tenure_months(today) >= self.min_tenure_months
    }
}

/// Links an employee to a rule, optionally overriding the entitlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeLeaveRuleAssignment {
    /// Unique identifier for the assignment.
    pub id: String,
    /// The employee.
    pub employee_id: String,
    /// The assigned rule.
    pub rule_id: String,
    /// The rule's leave type, kept alongside for per-type lookups.
    pub leave_type: LeaveType,
    /// Employee-specific entitlement replacing the rule's `max_allowed`.
    #[serde(default)]
    pub custom_max_allowed: Option<Decimal>,
    /// When the assignment was created.
    pub created_at: NaiveDateTime,
}

impl EmployeeLeaveRuleAssignment {
    /// Resolves the base entitlement for this assignment.
    pub fn base_max_allowed(&self, rule: &LeaveRule) -> Decimal {
        self.custom_max_allowed.unwrap_or(rule.max_allowed)
    }
}
