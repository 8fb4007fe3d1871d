//! Leave request model and the applied-days derivation.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::{BalanceKey, LeaveType};

/// The approval status of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Submitted and awaiting a decision. Nothing has been debited.
    Pending,
    /// Approved; the applied days are debited from the ledger.
    Approved,
    /// Rejected; nothing is debited.
    Rejected,
}

impl LeaveStatus {
    /// Returns true if a request in this status holds a ledger debit.
    pub fn is_debited(&self) -> bool {
        matches!(self, LeaveStatus::Approved)
    }
}

impl std::fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaveStatus::Pending => write!(f, "pending"),
            LeaveStatus::Approved => write!(f, "approved"),
            LeaveStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Which half of the working day a half-day request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HalfDaySide {
    /// The morning half.
    First,
    /// The afternoon half.
    Second,
}

/// A leave request filed by an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Unique identifier for the request.
    pub id: String,
    /// The requesting employee.
    pub employee_id: String,
    /// The kind of leave requested.
    pub leave_type: LeaveType,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Days charged against the balance. Always derived, see [`compute_applied_days`].
    pub applied_days: Decimal,
    /// Whether this is a half-day request.
    pub half_day: bool,
    /// The half of the day covered, for half-day requests.
    #[serde(default)]
    pub half_day_side: Option<HalfDaySide>,
    /// Current approval status.
    pub status: LeaveStatus,
    /// The approver, required once approved.
    #[serde(default)]
    pub approved_by: Option<String>,
    /// Free-text reason.
    #[serde(default)]
    pub reason: String,
    /// Opaque attachment reference handed to the attachment store.
    #[serde(default)]
    pub attachment: Option<String>,
    /// The ledger year this request is charged against.
    pub balance_year: i32,
    /// When the request was created.
    pub created_at: NaiveDateTime,
    /// When the request was last changed.
    pub updated_at: NaiveDateTime,
    /// Optimistic concurrency version, bumped by the store on every write.
    #[serde(default)]
    pub version: u64,
}

impl LeaveRequest {
    /// The ledger row this request is charged against.
    pub fn balance_key(&self) -> BalanceKey {
        BalanceKey::new(self.employee_id.clone(), self.leave_type, self.balance_year)
    }
}

/// Derives the number of leave days for a date range.
///
/// Half-day requests always yield `0.5`; otherwise the inclusive calendar
/// day count between `start` and `end`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidDateRange`] when `end` precedes `start`.
///
/// # Example
///
/// ```
/// use leave_engine::models::compute_applied_days;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
/// assert_eq!(compute_applied_days(start, end, false).unwrap(), Decimal::from(4));
/// assert_eq!(compute_applied_days(start, start, true).unwrap(), Decimal::new(5, 1));
/// ```
pub fn compute_applied_days(
    start: NaiveDate,
    end: NaiveDate,
    half_day: bool,
) -> EngineResult<Decimal> {
    if end < start {
        return Err(EngineError::InvalidDateRange {
            message: format!("end date {} is before start date {}", end, start),
        });
    }

    if half_day {
        return Ok(Decimal::new(5, 1));
    }

    let days = (end - start).num_days() + 1;
    Ok(Decimal::from(days))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_day_counts_one() {
        let day = date(2026, 2, 2);
        assert_eq!(compute_applied_days(day, day, false).unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_range_across_month_boundary() {
        let days = compute_applied_days(date(2026, 1, 30), date(2026, 2, 2), false).unwrap();
        assert_eq!(days, Decimal::from(4));
    }

    #[test]
    fn test_range_across_leap_day() {
        let days = compute_applied_days(date(2028, 2, 28), date(2028, 3, 1), false).unwrap();
        assert_eq!(days, Decimal::from(3));
    }

    #[test]
    fn test_half_day_is_always_half() {
        let days = compute_applied_days(date(2026, 2, 2), date(2026, 2, 2), true).unwrap();
        assert_eq!(days, Decimal::new(5, 1));
    }

    #[test]
    fn test_end_before_start_is_invalid() {
        let result = compute_applied_days(date(2026, 2, 5), date(2026, 2, 2), false);
        match result {
            Err(EngineError::InvalidDateRange { message }) => {
                assert!(message.contains("2026-02-02"));
            }
            other => panic!("Expected InvalidDateRange, got {:?}", other),
        }
    }

    #[test]
    fn test_only_approved_is_debited() {
        assert!(LeaveStatus::Approved.is_debited());
        assert!(!LeaveStatus::Pending.is_debited());
        assert!(!LeaveStatus::Rejected.is_debited());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&LeaveStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(LeaveStatus::Rejected.to_string(), "rejected");
    }
}
