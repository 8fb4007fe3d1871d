//! Persistence contract for the leave engine.
//!
//! The engine owns no storage technology. It reads through [`LeaveStore`]
//! and writes exclusively through [`LeaveStore::commit`], which applies a
//! [`UnitOfWork`] atomically. Rows carry a version for optimistic
//! concurrency; the store also enforces one active rule per organization
//! and leave type, and one assignment per employee and leave type.
//!
//! [`InMemoryStore`] implements the contract for tests and embedding.

mod memory;
mod unit_of_work;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::EngineResult;
use crate::models::{
    BalanceKey, EmployeeLeaveRuleAssignment, Holiday, LeaveBalance, LeaveRequest, LeaveRule,
    LeaveStatus, LeaveType,
};

pub use memory::InMemoryStore;
pub use unit_of_work::{UnitOfWork, WriteOp};

/// Filter for leave request queries. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    /// Only requests of this employee.
    pub employee_id: Option<String>,
    /// Only requests of this leave type.
    pub leave_type: Option<LeaveType>,
    /// Only requests in this status.
    pub status: Option<LeaveStatus>,
}

impl RequestFilter {
    /// Matches requests of one employee.
    pub fn for_employee(employee_id: impl Into<String>) -> Self {
        Self {
            employee_id: Some(employee_id.into()),
            ..Self::default()
        }
    }

    /// Narrows the filter to a leave type.
    pub fn with_leave_type(mut self, leave_type: LeaveType) -> Self {
        self.leave_type = Some(leave_type);
        self
    }

    /// Narrows the filter to a status.
    pub fn with_status(mut self, status: LeaveStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns true if `request` passes the filter.
    pub fn matches(&self, request: &LeaveRequest) -> bool {
        self.employee_id
            .as_ref()
            .is_none_or(|id| *id == request.employee_id)
            && self.leave_type.is_none_or(|t| t == request.leave_type)
            && self.status.is_none_or(|s| s == request.status)
    }
}

/// Read access to leave records plus atomic batched writes.
#[async_trait]
pub trait LeaveStore: Send + Sync {
    /// Loads a leave request by id.
    async fn request(&self, id: &str) -> EngineResult<Option<LeaveRequest>>;

    /// Lists leave requests passing `filter`.
    async fn requests(&self, filter: &RequestFilter) -> EngineResult<Vec<LeaveRequest>>;

    /// Loads a ledger row.
    async fn balance(&self, key: &BalanceKey) -> EngineResult<Option<LeaveBalance>>;

    /// Lists every ledger row of an employee.
    async fn balances_for_employee(&self, employee_id: &str) -> EngineResult<Vec<LeaveBalance>>;

    /// Loads a rule by id.
    async fn rule(&self, id: &str) -> EngineResult<Option<LeaveRule>>;

    /// Lists every rule of an organization, active or not.
    async fn rules_for_organization(&self, organization_id: &str) -> EngineResult<Vec<LeaveRule>>;

    /// Loads a rule assignment by id.
    async fn assignment(&self, id: &str) -> EngineResult<Option<EmployeeLeaveRuleAssignment>>;

    /// Lists the rule assignments of an employee.
    async fn assignments_for_employee(
        &self,
        employee_id: &str,
    ) -> EngineResult<Vec<EmployeeLeaveRuleAssignment>>;

    /// Lists the assignments referencing a rule.
    async fn assignments_for_rule(
        &self,
        rule_id: &str,
    ) -> EngineResult<Vec<EmployeeLeaveRuleAssignment>>;

    /// Lists an organization's holidays in the inclusive range `[from, to]`.
    async fn holidays_between(
        &self,
        organization_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<Holiday>>;

    /// Applies every staged write of `unit`, or none of them.
    async fn commit(&self, unit: UnitOfWork) -> EngineResult<()>;

    /// Deletes ledger rows with a year before `year`; returns how many.
    async fn purge_balances_before(&self, year: i32) -> EngineResult<usize>;
}
