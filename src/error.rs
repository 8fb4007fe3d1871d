//! Error types for the Leave Entitlement Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while validating leave windows,
//! mutating balances and running the annual rollover.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::LeaveType;

/// The main error type for the Leave Entitlement Engine.
///
/// Business-rule violations (insufficient balance, duplicate rules, ...) and
/// faults (store unavailable, broken configuration) share this type;
/// [`EngineError::is_fault`] tells them apart.
///
/// # Example
///
/// ```
/// use leave_engine::error::EngineError;
///
/// let error = EngineError::MissingApprover {
///     request_id: "req_001".to_string(),
/// };
/// assert_eq!(error.to_string(), "Leave request 'req_001' cannot be approved without an approver");
/// assert_eq!(error.code(), "MISSING_APPROVER");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The requested region has no default policy table.
    #[error("Unknown region: {region}")]
    UnknownRegion {
        /// The region code that was requested.
        region: String,
    },

    /// An employee, organization, rule, balance or request is missing.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record that was looked up.
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// No ledger row exists for the employee, leave type and year.
    #[error("No {leave_type} balance configured for employee '{employee_id}' in {year}")]
    NoBalanceConfigured {
        /// The employee.
        employee_id: String,
        /// The leave type.
        leave_type: LeaveType,
        /// The ledger year.
        year: i32,
    },

    /// A ledger row already exists for the employee, leave type and year.
    #[error("A {leave_type} balance for employee '{employee_id}' in {year} already exists")]
    BalanceAlreadyExists {
        /// The employee.
        employee_id: String,
        /// The leave type.
        leave_type: LeaveType,
        /// The ledger year.
        year: i32,
    },

    /// The requested days would exceed the allowed total.
    #[error(
        "Insufficient {leave_type} balance for employee '{employee_id}': requested {requested}, available {available}"
    )]
    InsufficientBalance {
        /// The employee.
        employee_id: String,
        /// The leave type.
        leave_type: LeaveType,
        /// Days requested by the mutation.
        requested: Decimal,
        /// Days still available before the mutation.
        available: Decimal,
    },

    /// The end date precedes the start date, or dates could not be parsed.
    #[error("Invalid date range: {message}")]
    InvalidDateRange {
        /// A description of what is wrong with the range.
        message: String,
    },

    /// The leave window overlaps non-working days without sandwiching.
    #[error("Leave window rejected: {message}")]
    LeaveWindowRejected {
        /// The validator's message.
        message: String,
    },

    /// The leave type requires a supporting document.
    #[error("A supporting document is required for {leave_type} leave")]
    DocumentRequired {
        /// The leave type.
        leave_type: LeaveType,
    },

    /// Approval was attempted without an approver.
    #[error("Leave request '{request_id}' cannot be approved without an approver")]
    MissingApprover {
        /// The request being approved.
        request_id: String,
    },

    /// An active rule already exists for the organization and leave type.
    #[error("An active {leave_type} rule already exists for organization '{organization_id}'")]
    DuplicateRule {
        /// The organization.
        organization_id: String,
        /// The leave type.
        leave_type: LeaveType,
    },

    /// The employee already has a rule assigned for the leave type.
    #[error("Employee '{employee_id}' already has a {leave_type} rule assigned")]
    DuplicateAssignment {
        /// The employee.
        employee_id: String,
        /// The leave type.
        leave_type: LeaveType,
    },

    /// The assignment cannot be removed because leave history exists.
    #[error(
        "Cannot unassign {leave_type} rule from employee '{employee_id}': {request_count} leave request(s) exist"
    )]
    AssignmentInUse {
        /// The employee.
        employee_id: String,
        /// The leave type.
        leave_type: LeaveType,
        /// How many requests reference the employee and type.
        request_count: usize,
    },

    /// The rule is still referenced by an assignment with an active balance.
    #[error("Leave rule '{rule_id}' is still assigned to employees with active balances")]
    RuleInUse {
        /// The rule.
        rule_id: String,
    },

    /// The actor may not perform the action.
    #[error("Actor '{actor_id}' is not allowed to {action}")]
    NotAuthorized {
        /// The acting user.
        actor_id: String,
        /// The attempted action.
        action: String,
    },

    /// A versioned row changed between read and write.
    #[error("Concurrent update conflict on {entity} '{id}'")]
    ConcurrentUpdateConflict {
        /// The kind of row.
        entity: &'static str,
        /// The row identifier.
        id: String,
    },

    /// The persistent store could not be reached.
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// A description of the failure.
        message: String,
    },

    /// A notification could not be delivered.
    #[error("Notification failed: {message}")]
    NotificationFailed {
        /// A description of the failure.
        message: String,
    },

    /// An attachment reference could not be resolved.
    #[error("Attachment unavailable: {message}")]
    AttachmentUnavailable {
        /// A description of the failure.
        message: String,
    },
}

impl EngineError {
    /// Returns a stable machine-readable code for the error.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                "CONFIG_ERROR"
            }
            EngineError::UnknownRegion { .. } => "UNKNOWN_REGION",
            EngineError::NotFound { .. } => "NOT_FOUND",
            EngineError::NoBalanceConfigured { .. } => "NO_BALANCE_CONFIGURED",
            EngineError::BalanceAlreadyExists { .. } => "BALANCE_ALREADY_EXISTS",
            EngineError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            EngineError::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            EngineError::LeaveWindowRejected { .. } => "LEAVE_WINDOW_REJECTED",
            EngineError::DocumentRequired { .. } => "DOCUMENT_REQUIRED",
            EngineError::MissingApprover { .. } => "MISSING_APPROVER",
            EngineError::DuplicateRule { .. } => "DUPLICATE_RULE",
            EngineError::DuplicateAssignment { .. } => "DUPLICATE_ASSIGNMENT",
            EngineError::AssignmentInUse { .. } => "ASSIGNMENT_IN_USE",
            EngineError::RuleInUse { .. } => "RULE_IN_USE",
            EngineError::NotAuthorized { .. } => "NOT_AUTHORIZED",
            EngineError::ConcurrentUpdateConflict { .. } => "CONCURRENT_UPDATE_CONFLICT",
            EngineError::StoreUnavailable { .. } => "STORE_UNAVAILABLE",
            EngineError::NotificationFailed { .. } => "NOTIFICATION_FAILED",
            EngineError::AttachmentUnavailable { .. } => "ATTACHMENT_UNAVAILABLE",
        }
    }

    /// Returns true for unexpected failures that must propagate as faults
    /// rather than be reported as a rejected business outcome.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            EngineError::ConfigNotFound { .. }
                | EngineError::ConfigParseError { .. }
                | EngineError::StoreUnavailable { .. }
        )
    }

    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/engine.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/engine.yaml"
        );
    }

    #[test]
    fn test_not_found_displays_entity_and_id() {
        let error = EngineError::not_found("Leave request", "req_404");
        assert_eq!(error.to_string(), "Leave request not found: req_404");
        assert_eq!(error.code(), "NOT_FOUND");
    }

    #[test]
    fn test_insufficient_balance_displays_amounts() {
        let error = EngineError::InsufficientBalance {
            employee_id: "emp_001".to_string(),
            leave_type: LeaveType::Annual,
            requested: Decimal::new(5, 0),
            available: Decimal::new(25, 1),
        };
        assert_eq!(
            error.to_string(),
            "Insufficient annual balance for employee 'emp_001': requested 5, available 2.5"
        );
    }

    #[test]
    fn test_assignment_in_use_displays_count() {
        let error = EngineError::AssignmentInUse {
            employee_id: "emp_001".to_string(),
            leave_type: LeaveType::Sick,
            request_count: 2,
        };
        assert_eq!(
            error.to_string(),
            "Cannot unassign sick rule from employee 'emp_001': 2 leave request(s) exist"
        );
        assert_eq!(error.code(), "ASSIGNMENT_IN_USE");
    }

    #[test]
    fn test_only_store_and_config_errors_are_faults() {
        assert!(
            EngineError::StoreUnavailable {
                message: "connection refused".to_string()
            }
            .is_fault()
        );
        assert!(
            EngineError::ConfigParseError {
                path: "engine.yaml".to_string(),
                message: "bad".to_string()
            }
            .is_fault()
        );
        assert!(
            !EngineError::MissingApprover {
                request_id: "req_001".to_string()
            }
            .is_fault()
        );
        assert!(
            !EngineError::ConcurrentUpdateConflict {
                entity: "leave balance",
                id: "bal_001".to_string()
            }
            .is_fault()
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_invalid_range() -> EngineResult<()> {
            Err(EngineError::InvalidDateRange {
                message: "end date before start date".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_invalid_range()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
