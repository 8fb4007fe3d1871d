//! Scoped unit of work.
//!
//! A [`UnitOfWork`] collects staged writes and is handed to
//! [`LeaveStore::commit`](super::LeaveStore::commit), which applies every
//! write or none of them. Dropping a unit of work without committing it
//! discards the staged writes.
//!
//! Update and delete operations carry the row as it was read; its `version`
//! is the version the store must still hold for the write to apply. A
//! mismatch fails the whole commit with
//! [`EngineError::ConcurrentUpdateConflict`](crate::error::EngineError::ConcurrentUpdateConflict).

use crate::models::{BalanceKey, EmployeeLeaveRuleAssignment, LeaveBalance, LeaveRequest, LeaveRule};

/// A single staged write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert a new leave request.
    InsertRequest(LeaveRequest),
    /// Replace a leave request read at `version`.
    UpdateRequest(LeaveRequest),
    /// Delete a leave request read at `expected_version`.
    DeleteRequest {
        /// The request id.
        id: String,
        /// The version the request was read at.
        expected_version: u64,
    },
    /// Insert a new ledger row.
    InsertBalance(LeaveBalance),
    /// Replace a ledger row read at `version`.
    UpdateBalance(LeaveBalance),
    /// Delete a ledger row.
    DeleteBalance(BalanceKey),
    /// Insert a new rule.
    InsertRule(LeaveRule),
    /// Replace a rule read at `version`.
    UpdateRule(LeaveRule),
    /// Delete a rule.
    DeleteRule(String),
    /// Insert a rule assignment.
    InsertAssignment(EmployeeLeaveRuleAssignment),
    /// Delete a rule assignment.
    DeleteAssignment(String),
}

/// An ordered batch of staged writes committed all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitOfWork {
    ops: Vec<WriteOp>,
}

impl UnitOfWork {
    /// Creates an empty unit of work.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a new leave request.
    pub fn insert_request(&mut self, request: LeaveRequest) -> &mut Self {
        self.push(WriteOp::InsertRequest(request))
    }

    /// Stages a replacement for a request read from the store.
    pub fn update_request(&mut self, request: LeaveRequest) -> &mut Self {
        self.push(WriteOp::UpdateRequest(request))
    }

    /// Stages the removal of a request read from the store.
    pub fn delete_request(&mut self, request: &LeaveRequest) -> &mut Self {
        self.push(WriteOp::DeleteRequest {
            id: request.id.clone(),
            expected_version: request.version,
        })
    }

    /// Stages a new ledger row.
    pub fn insert_balance(&mut self, balance: LeaveBalance) -> &mut Self {
        self.push(WriteOp::InsertBalance(balance))
    }

    /// Stages a replacement for a ledger row read from the store.
    pub fn update_balance(&mut self, balance: LeaveBalance) -> &mut Self {
        self.push(WriteOp::UpdateBalance(balance))
    }

    /// Stages the removal of a ledger row.
    pub fn delete_balance(&mut self, key: BalanceKey) -> &mut Self {
        self.push(WriteOp::DeleteBalance(key))
    }

    /// Stages a new rule.
    pub fn insert_rule(&mut self, rule: LeaveRule) -> &mut Self {
        self.push(WriteOp::InsertRule(rule))
    }

    /// Stages a replacement for a rule read from the store.
    pub fn update_rule(&mut self, rule: LeaveRule) -> &mut Self {
        self.push(WriteOp::UpdateRule(rule))
    }

    /// Stages the removal of a rule.
    pub fn delete_rule(&mut self, id: impl Into<String>) -> &mut Self {
        self.push(WriteOp::DeleteRule(id.into()))
    }

    /// Stages a new rule assignment.
    pub fn insert_assignment(&mut self, assignment: EmployeeLeaveRuleAssignment) -> &mut Self {
        self.push(WriteOp::InsertAssignment(assignment))
    }

    /// Stages the removal of a rule assignment.
    pub fn delete_assignment(&mut self, id: impl Into<String>) -> &mut Self {
        self.push(WriteOp::DeleteAssignment(id.into()))
    }

    /// The staged writes in order.
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Consumes the unit and returns the staged writes.
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    /// Number of staged writes.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true if nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    fn push(&mut self, op: WriteOp) -> &mut Self {
        self.ops.push(op);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeaveType;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[test]
    fn test_ops_are_kept_in_staging_order() {
        let now = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let key = BalanceKey::new("emp_001", LeaveType::Sick, 2026);
        let balance = LeaveBalance::new(key.clone(), Decimal::from(14), Decimal::ZERO, now);

        let mut unit = UnitOfWork::new();
        unit.insert_balance(balance.clone())
            .delete_assignment("asg_001")
            .delete_balance(key.clone());

        assert_eq!(unit.len(), 3);
        assert_eq!(unit.ops()[0], WriteOp::InsertBalance(balance));
        assert_eq!(unit.ops()[1], WriteOp::DeleteAssignment("asg_001".to_string()));
        assert_eq!(unit.ops()[2], WriteOp::DeleteBalance(key));
    }

    #[test]
    fn test_new_unit_is_empty() {
        let unit = UnitOfWork::new();
        assert!(unit.is_empty());
        assert!(unit.into_ops().is_empty());
    }
}
