//! Structured outcomes for mutating operations.
//!
//! Expected business-rule violations become a `rejected` [`LeaveOutcome`]
//! carrying the error code and message; faults such as an unavailable store
//! or broken configuration stay errors. [`crate::engine::LeaveEngine`]
//! returns outcomes from its `*_request` and rule assignment methods; the
//! service types return plain results for callers that convert themselves.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Whether an operation took effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The operation was applied.
    Success,
    /// A business rule refused the operation; nothing changed.
    Rejected,
}

/// The result of a mutating operation as reported to callers.
///
/// # Example
///
/// ```
/// use leave_engine::error::EngineError;
/// use leave_engine::outcome::{LeaveOutcome, OutcomeStatus};
///
/// let refused: Result<u32, EngineError> = Err(EngineError::MissingApprover {
///     request_id: "req_001".to_string(),
/// });
/// let outcome = LeaveOutcome::from_result(refused, "Leave approved").unwrap();
/// assert_eq!(outcome.status, OutcomeStatus::Rejected);
/// assert_eq!(outcome.code.as_deref(), Some("MISSING_APPROVER"));
/// assert!(outcome.data.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveOutcome<T> {
    /// Success or rejection.
    pub status: OutcomeStatus,
    /// Error code of a rejection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Human-readable summary.
    pub message: String,
    /// The operation's result on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> LeaveOutcome<T> {
    /// A successful outcome.
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Success,
            code: None,
            message: message.into(),
            data: Some(data),
        }
    }

    /// A rejected outcome describing `error`.
    pub fn rejected(error: &EngineError) -> Self {
        Self {
            status: OutcomeStatus::Rejected,
            code: Some(error.code().to_string()),
            message: error.to_string(),
            data: None,
        }
    }

    /// Converts an operation result, keeping faults as errors.
    pub fn from_result(result: EngineResult<T>, success_message: impl Into<String>) -> EngineResult<Self> {
        match result {
            Ok(data) => Ok(Self::success(data, success_message)),
            Err(error) if error.is_fault() => Err(error),
            Err(error) => Ok(Self::rejected(&error)),
        }
    }

    /// Returns true if the operation was applied.
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}
