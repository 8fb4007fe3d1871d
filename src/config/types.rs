//! Configuration types for the leave engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::models::{Gender, LeaveType};

/// Engine-wide tunables from `engine.yaml`.
///
/// Every field has a default so a partial file is accepted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Hard ceiling on annual-leave days carried into a new year by the
    /// rollover. Independent of each rule's `carry_forward_max`.
    pub carry_forward_cap: Decimal,
    /// Days of holiday lookup on either side of a leave window.
    pub holiday_buffer_days: i64,
    /// Ledger years kept behind the rollover target year; `None` disables the purge.
    pub balance_retention_years: Option<i32>,
    /// Retries after a concurrent update conflict before giving up.
    pub conflict_retry_limit: u32,
    /// Whether create and date edits reject windows the validator marks invalid.
    pub enforce_leave_window: bool,
    /// Seconds between scheduler checks for a new calendar year.
    pub rollover_check_interval_secs: u64,
}

impl EngineSettings {
    /// Time between scheduler checks; a zero setting counts as one second.
    pub fn rollover_check_interval(&self) -> Duration {
        Duration::from_secs(self.rollover_check_interval_secs.max(1))
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            carry_forward_cap: Decimal::from(10),
            holiday_buffer_days: 5,
            balance_retention_years: Some(3),
            conflict_retry_limit: 3,
            enforce_leave_window: true,
            rollover_check_interval_secs: 3600,
        }
    }
}

/// A default rule seeded into new organizations of a region.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DefaultRule {
    /// The leave type.
    pub leave_type: LeaveType,
    /// Base yearly entitlement in days.
    pub max_allowed: Decimal,
    /// Configured carry-forward ceiling.
    #[serde(default)]
    pub carry_forward_max: Decimal,
    /// Informational accrual rate.
    #[serde(default)]
    pub accrual_rate: Option<Decimal>,
    /// Gender restriction.
    #[serde(default)]
    pub applicable_gender: Option<Gender>,
    /// Minimum tenure in months.
    #[serde(default)]
    pub min_tenure_months: u32,
    /// Whether a supporting document is required.
    #[serde(default)]
    pub requires_document: bool,
}

/// The default policy table for one region, from `regions/<code>.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegionPolicy {
    /// Short region code (e.g., "bd").
    pub code: String,
    /// Human-readable region name.
    pub name: String,
    /// Default rules, at most one per leave type.
    pub rules: Vec<DefaultRule>,
}

impl RegionPolicy {
    /// Returns the default rule for a leave type, if the region defines one.
    pub fn rule_for(&self, leave_type: LeaveType) -> Option<&DefaultRule> {
        self.rules.iter().find(|r| r.leave_type == leave_type)
    }
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    settings: EngineSettings,
    regions: HashMap<String, RegionPolicy>,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(settings: EngineSettings, regions: Vec<RegionPolicy>) -> Self {
        let regions = regions
            .into_iter()
            .map(|policy| (policy.code.to_lowercase(), policy))
            .collect();
        Self { settings, regions }
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns all region policies keyed by lowercase code.
    pub fn regions(&self) -> &HashMap<String, RegionPolicy> {
        &self.regions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_use_defaults() {
        let settings: EngineSettings = serde_yaml::from_str("carry_forward_cap: \"5\"").unwrap();
        assert_eq!(settings.carry_forward_cap, Decimal::from(5));
        assert_eq!(settings.holiday_buffer_days, 5);
        assert_eq!(settings.balance_retention_years, Some(3));
    }

    #[test]
    fn test_region_policy_rule_lookup() {
        let yaml = r#"
code: xx
name: Test Region
rules:
  - leave_type: annual
    max_allowed: "15"
  - leave_type: maternity
    max_allowed: "90"
    applicable_gender: female
"#;
        let policy: RegionPolicy = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            policy.rule_for(LeaveType::Annual).unwrap().max_allowed,
            Decimal::from(15)
        );
        assert_eq!(
            policy.rule_for(LeaveType::Maternity).unwrap().applicable_gender,
            Some(Gender::Female)
        );
        assert!(policy.rule_for(LeaveType::Sick).is_none());
    }

    #[test]
    fn test_engine_config_keys_regions_lowercase() {
        let policy = RegionPolicy {
            code: "BD".to_string(),
            name: "Bangladesh".to_string(),
            rules: vec![],
        };
        let config = EngineConfig::new(EngineSettings::default(), vec![policy]);
        assert!(config.regions().contains_key("bd"));
    }
}
