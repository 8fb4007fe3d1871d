//! Organization holiday model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A declared holiday for one organization.
///
/// The date is the organization's local calendar date; it is never shifted
/// through UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// The organization the holiday belongs to.
    pub organization_id: String,
    /// The calendar date of the holiday.
    pub date: NaiveDate,
    /// The name of the holiday (e.g., "Victory Day").
    pub name: String,
    /// Optional free-text description.
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_holiday_without_description() {
        let json = r#"{
            "organization_id": "org_001",
            "date": "2026-12-16",
            "name": "Victory Day"
        }"#;
        let holiday: Holiday = serde_json::from_str(json).unwrap();
        assert_eq!(holiday.date, NaiveDate::from_ymd_opt(2026, 12, 16).unwrap());
        assert_eq!(holiday.name, "Victory Day");
        assert!(holiday.description.is_none());
    }

    #[test]
    fn test_serialize_holiday_date_key() {
        let holiday = Holiday {
            organization_id: "org_001".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 26).unwrap(),
            name: "Independence Day".to_string(),
            description: Some("National holiday".to_string()),
        };
        let json = serde_json::to_string(&holiday).unwrap();
        assert!(json.contains("\"date\":\"2026-03-26\""));
    }
}
