//! Calendar rules for leave requests.
//!
//! This module contains the day classifier (weekend, holiday, working day)
//! and the leave window validator built on top of it, including sandwich
//! detection for non-working days enclosed by a leave range.

mod classifier;
mod window;

pub use classifier::{DayClassification, DayType, HolidaySet, WEEKEND_DAYS, classify, is_weekend};
pub use window::{
    HOLIDAY_LOOKUP_BUFFER_DAYS, HolidayHit, LeaveWindowDetails, LeaveWindowVerdict,
    evaluate_leave_window, holiday_lookup_range, validate_leave_window,
};
