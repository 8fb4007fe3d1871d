//! Leave type tags.

use serde::{Deserialize, Serialize};

/// The kind of leave an entitlement or request refers to.
///
/// # Example
///
/// ```
/// use leave_engine::models::LeaveType;
///
/// assert!(LeaveType::Annual.carries_forward());
/// assert!(!LeaveType::Sick.carries_forward());
/// assert_eq!(LeaveType::Maternity.to_string(), "maternity");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    /// Paid annual (earned) leave. The only type that carries forward.
    Annual,
    /// Short-notice casual leave.
    Casual,
    /// Sick leave.
    Sick,
    /// Maternity leave.
    Maternity,
    /// Paternity leave.
    Paternity,
    /// Unpaid leave.
    Unpaid,
}

impl LeaveType {
    /// All leave types, in catalog order.
    pub const ALL: [LeaveType; 6] = [
        LeaveType::Annual,
        LeaveType::Casual,
        LeaveType::Sick,
        LeaveType::Maternity,
        LeaveType::Paternity,
        LeaveType::Unpaid,
    ];

    /// Returns the snake_case tag used in configuration and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveType::Annual => "annual",
            LeaveType::Casual => "casual",
            LeaveType::Sick => "sick",
            LeaveType::Maternity => "maternity",
            LeaveType::Paternity => "paternity",
            LeaveType::Unpaid => "unpaid",
        }
    }

    /// Returns true if unused days roll into the next year's allowance.
    pub fn carries_forward(&self) -> bool {
        matches!(self, LeaveType::Annual)
    }
}

impl std::fmt::Display for LeaveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leave_type_serialization() {
        assert_eq!(
            serde_json::to_string(&LeaveType::Annual).unwrap(),
            "\"annual\""
        );
        let parsed: LeaveType = serde_json::from_str("\"paternity\"").unwrap();
        assert_eq!(parsed, LeaveType::Paternity);
    }

    #[test]
    fn test_display_matches_serde_tag() {
        for leave_type in LeaveType::ALL {
            let json = serde_json::to_string(&leave_type).unwrap();
            assert_eq!(json, format!("\"{}\"", leave_type));
        }
    }

    #[test]
    fn test_only_annual_carries_forward() {
        let carrying: Vec<_> = LeaveType::ALL
            .iter()
            .filter(|t| t.carries_forward())
            .collect();
        assert_eq!(carrying, vec![&LeaveType::Annual]);
    }
}
