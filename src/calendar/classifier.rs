//! Day classification logic.
//!
//! This module decides whether a calendar date is a weekend day, a declared
//! organization holiday, or a working day. The organization week runs Sunday
//! to Saturday with Friday and Saturday as the weekend.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::Holiday;

/// The weekend days of the organization week.
pub const WEEKEND_DAYS: [Weekday; 2] = [Weekday::Fri, Weekday::Sat];

/// Represents the type of a calendar day for leave purposes.
///
/// # Example
///
/// ```
/// use leave_engine::calendar::DayType;
///
/// let day_type = DayType::Weekend;
/// assert_eq!(format!("{:?}", day_type), "Weekend");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    /// Sunday through Thursday with no holiday declared.
    Working,
    /// Friday or Saturday.
    Weekend,
    /// A declared organization holiday that is not a weekend day.
    Holiday,
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayType::Working => write!(f, "Working"),
            DayType::Weekend => write!(f, "Weekend"),
            DayType::Holiday => write!(f, "Holiday"),
        }
    }
}

/// An organization's declared holidays, keyed by calendar date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidaySet {
    by_date: BTreeMap<NaiveDate, String>,
}

impl HolidaySet {
    /// Creates an empty holiday set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from holiday records. When two records share a date the
    /// first name wins.
    pub fn from_holidays<'a, I>(holidays: I) -> Self
    where
        I: IntoIterator<Item = &'a Holiday>,
    {
        let mut set = Self::new();
        for holiday in holidays {
            set.insert(holiday.date, holiday.name.clone());
        }
        set
    }

    /// Adds a holiday unless the date is already declared.
    pub fn insert(&mut self, date: NaiveDate, name: impl Into<String>) {
        self.by_date.entry(date).or_insert_with(|| name.into());
    }

    /// Returns the holiday name declared for `date`.
    pub fn name_on(&self, date: NaiveDate) -> Option<&str> {
        self.by_date.get(&date).map(String::as_str)
    }

    /// Number of declared dates.
    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    /// Returns true if no holidays are declared.
    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}

/// The classification of one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayClassification {
    /// The classified date.
    pub date: NaiveDate,
    /// Friday or Saturday.
    pub is_weekend: bool,
    /// A declared holiday.
    pub is_holiday: bool,
    /// The holiday's name, when `is_holiday`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holiday_name: Option<String>,
}

impl DayClassification {
    /// Returns true if the date is neither a weekend day nor a holiday.
    pub fn is_working_day(&self) -> bool {
        !self.is_weekend && !self.is_holiday
    }

    /// Collapses the flags into a single [`DayType`]; weekend wins over holiday.
    pub fn day_type(&self) -> DayType {
        if self.is_weekend {
            DayType::Weekend
        } else if self.is_holiday {
            DayType::Holiday
        } else {
            DayType::Working
        }
    }
}

/// Returns true if `date` falls on Friday or Saturday.
pub fn is_weekend(date: NaiveDate) -> bool {
    WEEKEND_DAYS.contains(&date.weekday())
}

/// Classifies a date against an organization's holidays.
///
/// # Example
///
/// ```
/// use leave_engine::calendar::{classify, HolidaySet};
/// use chrono::NaiveDate;
///
/// let mut holidays = HolidaySet::new();
/// holidays.insert(NaiveDate::from_ymd_opt(2026, 3, 26).unwrap(), "Independence Day");
///
/// // 2026-03-26 is a Thursday
/// let day = classify(NaiveDate::from_ymd_opt(2026, 3, 26).unwrap(), &holidays);
/// assert!(day.is_holiday);
/// assert!(!day.is_weekend);
/// assert_eq!(day.holiday_name.as_deref(), Some("Independence Day"));
///
/// // 2026-03-27 is a Friday
/// let day = classify(NaiveDate::from_ymd_opt(2026, 3, 27).unwrap(), &holidays);
/// assert!(day.is_weekend);
/// ```
pub fn classify(date: NaiveDate, holidays: &HolidaySet) -> DayClassification {
    let holiday_name = holidays.name_on(date).map(str::to_string);
    DayClassification {
        date,
        is_weekend: is_weekend(date),
        is_holiday: holiday_name.is_some(),
        holiday_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_sunday_is_working_day() {
        // 2026-01-11 is a Sunday
        let day = classify(make_date("2026-01-11"), &HolidaySet::new());
        assert!(day.is_working_day());
        assert_eq!(day.day_type(), DayType::Working);
    }

    #[test]
    fn test_thursday_is_working_day() {
        // 2026-01-15 is a Thursday
        let day = classify(make_date("2026-01-15"), &HolidaySet::new());
        assert!(day.is_working_day());
    }

    #[test]
    fn test_friday_is_weekend() {
        // 2026-01-16 is a Friday
        let day = classify(make_date("2026-01-16"), &HolidaySet::new());
        assert!(day.is_weekend);
        assert_eq!(day.day_type(), DayType::Weekend);
    }

    #[test]
    fn test_saturday_is_weekend() {
        // 2026-01-17 is a Saturday
        assert!(is_weekend(make_date("2026-01-17")));
    }

    #[test]
    fn test_monday_is_not_weekend() {
        // 2026-01-12 is a Monday
        assert!(!is_weekend(make_date("2026-01-12")));
    }

    #[test]
    fn test_holiday_on_weekday() {
        let mut holidays = HolidaySet::new();
        holidays.insert(make_date("2026-01-13"), "Founders Day");

        let day = classify(make_date("2026-01-13"), &holidays);
        assert!(day.is_holiday);
        assert!(!day.is_working_day());
        assert_eq!(day.day_type(), DayType::Holiday);
        assert_eq!(day.holiday_name.as_deref(), Some("Founders Day"));
    }

    #[test]
    fn test_holiday_on_weekend_keeps_both_flags() {
        let mut holidays = HolidaySet::new();
        holidays.insert(make_date("2026-01-16"), "Friday Holiday");

        let day = classify(make_date("2026-01-16"), &holidays);
        assert!(day.is_weekend);
        assert!(day.is_holiday);
        assert_eq!(day.day_type(), DayType::Weekend);
    }

    #[test]
    fn test_first_holiday_name_wins() {
        let mut holidays = HolidaySet::new();
        holidays.insert(make_date("2026-02-21"), "Language Martyrs Day");
        holidays.insert(make_date("2026-02-21"), "Duplicate");
        assert_eq!(holidays.len(), 1);
        assert_eq!(
            holidays.name_on(make_date("2026-02-21")),
            Some("Language Martyrs Day")
        );
    }

    #[test]
    fn test_from_holiday_records() {
        let records = vec![
            Holiday {
                organization_id: "org_001".to_string(),
                date: make_date("2026-12-16"),
                name: "Victory Day".to_string(),
                description: None,
            },
            Holiday {
                organization_id: "org_001".to_string(),
                date: make_date("2026-03-26"),
                name: "Independence Day".to_string(),
                description: None,
            },
        ];
        let set = HolidaySet::from_holidays(&records);
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        assert_eq!(set.name_on(make_date("2026-12-16")), Some("Victory Day"));
    }

    #[test]
    fn test_classification_is_total_across_a_year() {
        let holidays = HolidaySet::new();
        let start = make_date("2026-01-01");
        let weekend_days = start
            .iter_days()
            .take(365)
            .filter(|d| classify(*d, &holidays).is_weekend)
            .count();
        // 2026 has 52 Fridays and 52 Saturdays
        assert_eq!(weekend_days, 104);
    }

    #[test]
    fn test_day_type_serialization() {
        let json = serde_json::to_string(&DayType::Weekend).unwrap();
        assert_eq!(json, "\"weekend\"");

        let deserialized: DayType = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, DayType::Weekend);
    }
}
