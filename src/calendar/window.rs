//! Leave window validation.
//!
//! Evaluates an inclusive leave date range against the organization calendar:
//! it collects weekend and holiday dates inside the range and detects
//! sandwiching, where non-working days sit strictly between a working start
//! date and a working end date and are therefore counted as leave.
//!
//! Sandwich detection runs first and a positive result makes the window
//! valid. Only when no sandwiching is found does a weekend or holiday inside
//! the range make the window invalid.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::store::LeaveStore;

use super::classifier::{HolidaySet, classify};

/// Days of holiday lookup on either side of a leave window.
pub const HOLIDAY_LOOKUP_BUFFER_DAYS: i64 = 5;

/// A holiday that falls inside a leave window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayHit {
    /// The holiday date.
    pub date: NaiveDate,
    /// The holiday name.
    pub name: String,
}

/// Machine-readable findings of a window evaluation.
///
/// Date lists are only populated when the matching flag is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveWindowDetails {
    /// A weekend day falls inside the range.
    pub has_weekends: bool,
    /// A holiday falls inside the range.
    pub has_holidays: bool,
    /// Non-working days are sandwiched between working boundary days.
    pub is_sandwiching: bool,
    /// Weekend dates inside the range.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weekend_dates: Vec<NaiveDate>,
    /// Holidays inside the range.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holiday_dates: Vec<HolidayHit>,
    /// Non-working dates strictly between working start and end dates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sandwiching_dates: Vec<NaiveDate>,
}

/// The verdict for a leave window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveWindowVerdict {
    /// Whether the window may be filed.
    pub is_valid: bool,
    /// Human-readable explanation.
    pub message: String,
    /// Detailed findings.
    pub details: LeaveWindowDetails,
}

/// Returns the inclusive holiday lookup range for a window.
pub fn holiday_lookup_range(
    start: NaiveDate,
    end: NaiveDate,
    buffer_days: i64,
) -> (NaiveDate, NaiveDate) {
    let buffer = Duration::days(buffer_days.max(0));
    (start - buffer, end + buffer)
}

/// Evaluates a leave window against a holiday set.
///
/// # Errors
///
/// Returns [`EngineError::InvalidDateRange`] when `end` precedes `start`.
///
/// # Example
///
/// ```
/// use leave_engine::calendar::{evaluate_leave_window, HolidaySet};
/// use chrono::NaiveDate;
///
/// // Monday 2026-01-12 to Thursday 2026-01-15 with Tuesday declared a holiday
/// let mut holidays = HolidaySet::new();
/// holidays.insert(NaiveDate::from_ymd_opt(2026, 1, 13).unwrap(), "Founders Day");
///
/// let verdict = evaluate_leave_window(
///     NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
///     &holidays,
/// )
/// .unwrap();
///
/// assert!(verdict.is_valid);
/// assert!(verdict.details.is_sandwiching);
/// assert_eq!(
///     verdict.details.sandwiching_dates,
///     vec![NaiveDate::from_ymd_opt(2026, 1, 13).unwrap()]
/// );
/// ```
pub fn evaluate_leave_window(
    start: NaiveDate,
    end: NaiveDate,
    holidays: &HolidaySet,
) -> EngineResult<LeaveWindowVerdict> {
    if end < start {
        return Err(EngineError::InvalidDateRange {
            message: format!("end date {} is before start date {}", end, start),
        });
    }

    let mut details = LeaveWindowDetails::default();

    for day in start.iter_days().take_while(|d| *d <= end) {
        let classification = classify(day, holidays);
        if classification.is_weekend {
            details.weekend_dates.push(day);
        }
        if let Some(name) = classification.holiday_name {
            details.holiday_dates.push(HolidayHit { date: day, name });
        }
    }
    details.has_weekends = !details.weekend_dates.is_empty();
    details.has_holidays = !details.holiday_dates.is_empty();

    let bounded_by_working_days =
        classify(start, holidays).is_working_day() && classify(end, holidays).is_working_day();
    if bounded_by_working_days {
        details.sandwiching_dates = start
            .iter_days()
            .skip(1)
            .take_while(|d| *d < end)
            .filter(|d| !classify(*d, holidays).is_working_day())
            .collect();
    }
    details.is_sandwiching = !details.sandwiching_dates.is_empty();

    let (is_valid, message) = if details.is_sandwiching {
        (
            true,
            format!(
                "Leave dates are valid; {} non-working day(s) between {} and {} are counted as leave",
                details.sandwiching_dates.len(),
                start,
                end
            ),
        )
    } else if details.has_weekends || details.has_holidays {
        (false, describe_non_working_overlap(&details))
    } else {
        (true, "Leave dates are valid".to_string())
    };

    Ok(LeaveWindowVerdict {
        is_valid,
        message,
        details,
    })
}

fn describe_non_working_overlap(details: &LeaveWindowDetails) -> String {
    let mut parts = Vec::new();
    if details.has_weekends {
        let dates: Vec<String> = details.weekend_dates.iter().map(|d| d.to_string()).collect();
        parts.push(format!("weekends {}", dates.join(", ")));
    }
    if details.has_holidays {
        let holidays: Vec<String> = details
            .holiday_dates
            .iter()
            .map(|h| format!("{} ({})", h.name, h.date))
            .collect();
        parts.push(format!("holidays {}", holidays.join(", ")));
    }
    format!("Leave dates include non-working days: {}", parts.join("; "))
}

/// Fetches the organization's holidays around a window and evaluates it.
pub async fn validate_leave_window(
    store: &dyn LeaveStore,
    organization_id: &str,
    start: NaiveDate,
    end: NaiveDate,
    buffer_days: i64,
) -> EngineResult<LeaveWindowVerdict> {
    if end < start {
        return Err(EngineError::InvalidDateRange {
            message: format!("end date {} is before start date {}", end, start),
        });
    }

    let (from, to) = holiday_lookup_range(start, end, buffer_days);
    let holidays = store.holidays_between(organization_id, from, to).await?;
    let set = HolidaySet::from_holidays(&holidays);

    let verdict = evaluate_leave_window(start, end, &set)?;
    debug!(
        organization_id = %organization_id,
        start = %start,
        end = %end,
        is_valid = verdict.is_valid,
        is_sandwiching = verdict.details.is_sandwiching,
        "Evaluated leave window"
    );
    Ok(verdict)
}
