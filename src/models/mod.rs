//! Core data models for the Leave Entitlement Engine.
//!
//! This module contains the domain records the engine reads and writes:
//! employees, holidays, leave requests, ledger balances, rules and
//! rule assignments.

mod employee;
mod holiday;
mod leave_balance;
mod leave_request;
mod leave_rule;
mod leave_type;

pub use employee::{Employee, EmployeeStatus, Gender};
pub use holiday::Holiday;
pub use leave_balance::{BalanceKey, LeaveBalance};
pub use leave_request::{HalfDaySide, LeaveRequest, LeaveStatus, compute_applied_days};
pub use leave_rule::{EmployeeLeaveRuleAssignment, LeaveRule};
pub use leave_type::LeaveType;
