//! Rule catalog.
//!
//! Manages organization leave rules, seeds region defaults, answers
//! eligibility questions and assigns rules to employees. Assigning a rule
//! creates the employee's current-year ledger row in the same unit of work.

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::DefaultRule;
use crate::context::EngineContext;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    BalanceKey, Employee, EmployeeLeaveRuleAssignment, Gender, LeaveRule, LeaveType,
};
use crate::store::{RequestFilter, UnitOfWork};

use super::ledger::Ledger;
use super::retry::retry_on_conflict;

/// Input for creating a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLeaveRule {
    /// The owning organization.
    pub organization_id: String,
    /// The leave type governed.
    pub leave_type: LeaveType,
    /// Base yearly entitlement.
    pub max_allowed: Decimal,
    /// Configured carry-forward ceiling.
    #[serde(default)]
    pub carry_forward_max: Decimal,
    /// Informational accrual rate.
    #[serde(default)]
    pub accrual_rate: Option<Decimal>,
    /// Whether the rule starts active.
    pub is_active: bool,
    /// Gender restriction.
    #[serde(default)]
    pub applicable_gender: Option<Gender>,
    /// Minimum tenure in months.
    #[serde(default)]
    pub min_tenure_months: u32,
    /// Whether requests need a supporting document.
    #[serde(default)]
    pub requires_document: bool,
}

impl NewLeaveRule {
    /// An active rule built from a region default.
    pub fn from_default(organization_id: impl Into<String>, default: &DefaultRule) -> Self {
        Self {
            organization_id: organization_id.into(),
            leave_type: default.leave_type,
            max_allowed: default.max_allowed,
            carry_forward_max: default.carry_forward_max,
            accrual_rate: default.accrual_rate,
            is_active: true,
            applicable_gender: default.applicable_gender,
            min_tenure_months: default.min_tenure_months,
            requires_document: default.requires_document,
        }
    }

    fn into_rule(self, now: chrono::NaiveDateTime) -> LeaveRule {
        LeaveRule {
            id: Uuid::new_v4().to_string(),
            organization_id: self.organization_id,
            leave_type: self.leave_type,
            max_allowed: self.max_allowed,
            carry_forward_max: self.carry_forward_max,
            accrual_rate: self.accrual_rate,
            is_active: self.is_active,
            applicable_gender: self.applicable_gender,
            min_tenure_months: self.min_tenure_months,
            requires_document: self.requires_document,
            created_at: now,
            version: 0,
        }
    }
}

/// Fields an update may change. Unset fields keep their value; the
/// organization and leave type are fixed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRuleUpdate {
    /// New base entitlement.
    pub max_allowed: Option<Decimal>,
    /// New carry-forward ceiling.
    pub carry_forward_max: Option<Decimal>,
    /// New accrual rate; `Some(None)` clears it.
    pub accrual_rate: Option<Option<Decimal>>,
    /// Activate or deactivate.
    pub is_active: Option<bool>,
    /// New gender restriction; `Some(None)` clears it.
    pub applicable_gender: Option<Option<Gender>>,
    /// New minimum tenure.
    pub min_tenure_months: Option<u32>,
    /// New document requirement.
    pub requires_document: Option<bool>,
}

impl LeaveRuleUpdate {
    fn apply(&self, rule: LeaveRule) -> LeaveRule {
        LeaveRule {
            max_allowed: self.max_allowed.unwrap_or(rule.max_allowed),
            carry_forward_max: self.carry_forward_max.unwrap_or(rule.carry_forward_max),
            accrual_rate: self.accrual_rate.unwrap_or(rule.accrual_rate),
            is_active: self.is_active.unwrap_or(rule.is_active),
            applicable_gender: self.applicable_gender.unwrap_or(rule.applicable_gender),
            min_tenure_months: self.min_tenure_months.unwrap_or(rule.min_tenure_months),
            requires_document: self.requires_document.unwrap_or(rule.requires_document),
            ..rule
        }
    }
}

/// Rule management, eligibility and assignment.
#[derive(Clone)]
pub struct RuleCatalog {
    ctx: EngineContext,
    ledger: Ledger,
}

impl RuleCatalog {
    /// Creates the catalog over `ctx`.
    pub fn new(ctx: EngineContext) -> Self {
        Self {
            ledger: Ledger::new(ctx.clone()),
            ctx,
        }
    }

    /// Loads a rule.
    pub async fn rule(&self, rule_id: &str) -> EngineResult<LeaveRule> {
        self.ctx
            .store()
            .rule(rule_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Leave rule", rule_id))
    }

    /// Lists every rule of an organization.
    pub async fn rules(&self, organization_id: &str) -> EngineResult<Vec<LeaveRule>> {
        self.ctx.store().rules_for_organization(organization_id).await
    }

    /// Creates a rule.
    ///
    /// # Errors
    ///
    /// [`EngineError::DuplicateRule`] when the rule is active and another
    /// active rule exists for the organization and leave type.
    pub async fn create_rule(&self, new: NewLeaveRule) -> EngineResult<LeaveRule> {
        self.require_organization(&new.organization_id).await?;

        let rule = new.into_rule(self.ctx.clock().now());
        let mut unit = UnitOfWork::new();
        unit.insert_rule(rule.clone());
        self.ctx.store().commit(unit).await?;

        info!(
            rule_id = %rule.id,
            organization_id = %rule.organization_id,
            leave_type = %rule.leave_type,
            "Leave rule created"
        );
        Ok(LeaveRule { version: 1, ..rule })
    }

    /// Applies `update` to a rule.
    pub async fn update_rule(&self, rule_id: &str, update: LeaveRuleUpdate) -> EngineResult<LeaveRule> {
        let this = self;
        let update = &update;
        let rule = retry_on_conflict(
            self.ctx.settings().conflict_retry_limit,
            "update_rule",
            move || async move {
                let current = this.rule(rule_id).await?;
                let updated = update.apply(current);
                let mut unit = UnitOfWork::new();
                unit.update_rule(updated.clone());
                this.ctx.store().commit(unit).await?;
                Ok(LeaveRule {
                    version: updated.version + 1,
                    ..updated
                })
            },
        )
        .await?;

        info!(rule_id = %rule.id, is_active = rule.is_active, "Leave rule updated");
        Ok(rule)
    }

    /// Deletes a rule together with its assignments.
    ///
    /// # Errors
    ///
    /// [`EngineError::RuleInUse`] while an assigned employee still has a
    /// ledger row of the rule's type for the current or a later year.
    pub async fn delete_rule(&self, rule_id: &str) -> EngineResult<()> {
        let rule = self.rule(rule_id).await?;
        let store = self.ctx.store();
        let current_year = self.ctx.clock().current_year();

        let assignments = store.assignments_for_rule(rule_id).await?;
        for assignment in &assignments {
            let balances = store.balances_for_employee(&assignment.employee_id).await?;
            let active = balances
                .iter()
                .any(|b| b.key.leave_type == rule.leave_type && b.key.year >= current_year);
            if active {
                return Err(EngineError::RuleInUse {
                    rule_id: rule_id.to_string(),
                });
            }
        }

        let mut unit = UnitOfWork::new();
        for assignment in &assignments {
            unit.delete_assignment(assignment.id.clone());
        }
        unit.delete_rule(rule_id);
        store.commit(unit).await?;

        info!(
            rule_id = %rule_id,
            assignments_removed = assignments.len(),
            "Leave rule deleted"
        );
        Ok(())
    }

    /// Seeds an organization with its region's default rules.
    ///
    /// Leave types that already have a rule, active or not, are skipped.
    /// Returns the rules created.
    pub async fn initialize_defaults(
        &self,
        organization_id: &str,
        region: &str,
    ) -> EngineResult<Vec<LeaveRule>> {
        self.require_organization(organization_id).await?;
        let policy = self.ctx.config().region(region)?;
        let existing = self.rules(organization_id).await?;

        let now = self.ctx.clock().now();
        let created: Vec<LeaveRule> = policy
            .rules
            .iter()
            .filter(|default| !existing.iter().any(|r| r.leave_type == default.leave_type))
            .map(|default| NewLeaveRule::from_default(organization_id, default).into_rule(now))
            .collect();

        if created.is_empty() {
            return Ok(created);
        }

        let mut unit = UnitOfWork::new();
        for rule in &created {
            unit.insert_rule(rule.clone());
        }
        self.ctx.store().commit(unit).await?;

        info!(
            organization_id = %organization_id,
            region = %policy.code,
            rules_created = created.len(),
            "Initialized default leave rules"
        );
        Ok(created
            .into_iter()
            .map(|rule| LeaveRule { version: 1, ..rule })
            .collect())
    }

    /// Lists the active rules of the employee's organization whose gender
    /// and tenure restrictions admit the employee today.
    pub async fn eligible_rules(&self, employee_id: &str) -> EngineResult<Vec<LeaveRule>> {
        let employee = self.employee(employee_id).await?;
        let today = self.ctx.clock().today();
        let rules = self.rules(&employee.organization_id).await?;
        Ok(rules
            .into_iter()
            .filter(|r| r.is_active && r.admits(&employee, today))
            .collect())
    }

    /// Lists an employee's rule assignments.
    pub async fn assignments(&self, employee_id: &str) -> EngineResult<Vec<EmployeeLeaveRuleAssignment>> {
        self.ctx.store().assignments_for_employee(employee_id).await
    }

    /// Assigns a rule to an employee and sets up the current-year ledger row
    /// with the resolved entitlement, all or nothing.
    ///
    /// An existing row for the year keeps its usage and carry-forward and
    /// has its allowance recomputed.
    pub async fn assign_rule(
        &self,
        employee_id: &str,
        rule_id: &str,
        custom_max_allowed: Option<Decimal>,
    ) -> EngineResult<EmployeeLeaveRuleAssignment> {
        let employee = self.employee(employee_id).await?;
        let rule = self.rule(rule_id).await?;
        if rule.organization_id != employee.organization_id {
            return Err(EngineError::not_found("Leave rule", rule_id));
        }

        let existing = self.assignments(employee_id).await?;
        if existing.iter().any(|a| a.leave_type == rule.leave_type) {
            return Err(EngineError::DuplicateAssignment {
                employee_id: employee_id.to_string(),
                leave_type: rule.leave_type,
            });
        }

        let now = self.ctx.clock().now();
        let assignment = EmployeeLeaveRuleAssignment {
            id: Uuid::new_v4().to_string(),
            employee_id: employee.id.clone(),
            rule_id: rule.id.clone(),
            leave_type: rule.leave_type,
            custom_max_allowed,
            created_at: now,
        };
        let base = assignment.base_max_allowed(&rule);
        let key = BalanceKey::new(employee.id.clone(), rule.leave_type, now.year());

        let this = self;
        let (assignment_ref, key_ref) = (&assignment, &key);
        retry_on_conflict(
            self.ctx.settings().conflict_retry_limit,
            "assign_rule",
            move || async move {
                let mut unit = UnitOfWork::new();
                unit.insert_assignment(assignment_ref.clone());
                this.ledger.stage_allowance(&mut unit, key_ref, base).await?;
                this.ctx.store().commit(unit).await
            },
        )
        .await?;

        info!(
            assignment_id = %assignment.id,
            employee_id = %assignment.employee_id,
            rule_id = %assignment.rule_id,
            leave_type = %assignment.leave_type,
            total_allowed = %base,
            "Leave rule assigned"
        );
        Ok(assignment)
    }

    /// Removes an assignment and the employee's current-year row of its type.
    ///
    /// # Errors
    ///
    /// [`EngineError::AssignmentInUse`] when the employee has any request of
    /// the assignment's leave type.
    pub async fn unassign_rule(&self, assignment_id: &str) -> EngineResult<()> {
        let store = self.ctx.store();
        let assignment = store
            .assignment(assignment_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Rule assignment", assignment_id))?;

        let filter =
            RequestFilter::for_employee(assignment.employee_id.clone()).with_leave_type(assignment.leave_type);
        let request_count = store.requests(&filter).await?.len();
        if request_count > 0 {
            return Err(EngineError::AssignmentInUse {
                employee_id: assignment.employee_id,
                leave_type: assignment.leave_type,
                request_count,
            });
        }

        let key = BalanceKey::new(
            assignment.employee_id.clone(),
            assignment.leave_type,
            self.ctx.clock().current_year(),
        );
        let mut unit = UnitOfWork::new();
        unit.delete_assignment(assignment.id.clone());
        self.ledger.stage_remove(&mut unit, &key).await?;
        store.commit(unit).await?;

        info!(
            assignment_id = %assignment.id,
            employee_id = %assignment.employee_id,
            leave_type = %assignment.leave_type,
            "Leave rule unassigned"
        );
        Ok(())
    }

    async fn employee(&self, employee_id: &str) -> EngineResult<Employee> {
        self.ctx
            .directory()
            .employee(employee_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Employee", employee_id))
    }

    async fn require_organization(&self, organization_id: &str) -> EngineResult<()> {
        if self.ctx.directory().organization_exists(organization_id).await? {
            Ok(())
        } else {
            Err(EngineError::not_found("Organization", organization_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::lifecycle::{LeaveLifecycle, NewLeaveRequest};
    use crate::engine::test_support::{Fixture, date, dec, rule};

    fn new_rule(leave_type: LeaveType, max_allowed: &str) -> NewLeaveRule {
        NewLeaveRule {
            organization_id: "org_001".to_string(),
            leave_type,
            max_allowed: dec(max_allowed),
            carry_forward_max: Decimal::ZERO,
            accrual_rate: None,
            is_active: true,
            applicable_gender: None,
            min_tenure_months: 0,
            requires_document: false,
        }
    }

    // ==========================================================================
    // Rule management
    // ==========================================================================
    #[tokio::test]
    async fn test_create_rule_for_unknown_org() {
        let fixture = Fixture::new().await;
        let catalog = RuleCatalog::new(fixture.ctx.clone());

        let mut new = new_rule(LeaveType::Casual, "10");
        new.organization_id = "org_404".to_string();
        let result = catalog.create_rule(new).await;
        assert!(matches!(
            result,
            Err(EngineError::NotFound {
                entity: "Organization",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_second_active_rule_is_duplicate() {
        let fixture = Fixture::new().await;
        let catalog = RuleCatalog::new(fixture.ctx.clone());

        catalog.create_rule(new_rule(LeaveType::Casual, "10")).await.unwrap();
        let result = catalog.create_rule(new_rule(LeaveType::Casual, "12")).await;
        assert!(matches!(result, Err(EngineError::DuplicateRule { .. })));
    }

    #[tokio::test]
    async fn test_activating_clashing_rule_is_duplicate() {
        let fixture = Fixture::new().await;
        let catalog = RuleCatalog::new(fixture.ctx.clone());
        catalog.create_rule(new_rule(LeaveType::Casual, "10")).await.unwrap();
        let mut inactive = new_rule(LeaveType::Casual, "12");
        inactive.is_active = false;
        let inactive = catalog.create_rule(inactive).await.unwrap();

        let result = catalog
            .update_rule(
                &inactive.id,
                LeaveRuleUpdate {
                    is_active: Some(true),
                    ..LeaveRuleUpdate::default()
                },
            )
            .await;
        assert!(matches!(result, Err(EngineError::DuplicateRule { .. })));
    }

    #[tokio::test]
    async fn test_update_rule_merges_fields() {
        let fixture = Fixture::new().await;
        let catalog = RuleCatalog::new(fixture.ctx.clone());
        let created = catalog.create_rule(new_rule(LeaveType::Sick, "14")).await.unwrap();

        let updated = catalog
            .update_rule(
                &created.id,
                LeaveRuleUpdate {
                    max_allowed: Some(dec("18")),
                    requires_document: Some(true),
                    ..LeaveRuleUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.max_allowed, dec("18"));
        assert!(updated.requires_document);
        assert_eq!(updated.leave_type, LeaveType::Sick);
        assert_eq!(updated.version, 2);
        assert_eq!(catalog.rule(&created.id).await.unwrap(), updated);
    }

    // ==========================================================================
    // Region defaults
    // ==========================================================================
    #[tokio::test]
    async fn test_initialize_defaults_seeds_region_table() {
        let fixture = Fixture::new().await;
        let catalog = RuleCatalog::new(fixture.ctx.clone());

        let created = catalog.initialize_defaults("org_001", "bd").await.unwrap();
        assert_eq!(created.len(), 5);

        let maternity = created
            .iter()
            .find(|r| r.leave_type == LeaveType::Maternity)
            .unwrap();
        assert_eq!(maternity.max_allowed, dec("112"));
        assert_eq!(maternity.applicable_gender, Some(Gender::Female));

        // a second run adds nothing
        let again = catalog.initialize_defaults("org_001", "BD").await.unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn test_initialize_defaults_skips_existing_types() {
        let fixture = Fixture::new().await;
        fixture.seed_rule(rule("rule_annual", LeaveType::Annual, "25")).await;
        let catalog = RuleCatalog::new(fixture.ctx.clone());

        let created = catalog.initialize_defaults("org_001", "sa").await.unwrap();
        assert!(created.iter().all(|r| r.leave_type != LeaveType::Annual));
        assert_eq!(created.len(), 4);

        let annual: Vec<LeaveRule> = catalog
            .rules("org_001")
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.leave_type == LeaveType::Annual)
            .collect();
        assert_eq!(annual.len(), 1);
        assert_eq!(annual[0].max_allowed, dec("25"));
    }

    #[tokio::test]
    async fn test_initialize_defaults_unknown_region() {
        let fixture = Fixture::new().await;
        let catalog = RuleCatalog::new(fixture.ctx.clone());
        let result = catalog.initialize_defaults("org_001", "zz").await;
        assert!(matches!(result, Err(EngineError::UnknownRegion { .. })));
    }

    // ==========================================================================
    // Eligibility
    // ==========================================================================
    #[tokio::test]
    async fn test_eligibility_by_gender_and_tenure() {
        let fixture = Fixture::new().await;
        let catalog = RuleCatalog::new(fixture.ctx.clone());
        catalog.initialize_defaults("org_001", "bd").await.unwrap();

        // emp_001: female, 22 months of tenure
        let types: Vec<LeaveType> = catalog
            .eligible_rules("emp_001")
            .await
            .unwrap()
            .iter()
            .map(|r| r.leave_type)
            .collect();
        assert!(types.contains(&LeaveType::Maternity));
        assert!(!types.contains(&LeaveType::Paternity));

        // emp_002: male, 2 months of tenure
        let types: Vec<LeaveType> = catalog
            .eligible_rules("emp_002")
            .await
            .unwrap()
            .iter()
            .map(|r| r.leave_type)
            .collect();
        assert!(types.contains(&LeaveType::Paternity));
        assert!(!types.contains(&LeaveType::Maternity));
        assert!(types.contains(&LeaveType::Annual));
    }

    #[tokio::test]
    async fn test_tenure_counts_calendar_months() {
        let fixture = Fixture::new().await;
        fixture
            .add_employee("emp_003", Gender::Female, date(2025, 7, 31), None)
            .await;
        let mut maternity = rule("rule_maternity", LeaveType::Maternity, "112");
        maternity.min_tenure_months = 6;
        fixture.seed_rule(maternity).await;
        let catalog = RuleCatalog::new(fixture.ctx.clone());

        // 2025-07-31 to 2026-01-05 is six calendar months
        assert_eq!(catalog.eligible_rules("emp_003").await.unwrap().len(), 1);
    }

    // ==========================================================================
    // Assignment
    // ==========================================================================
    #[tokio::test]
    async fn test_assign_creates_current_year_row() {
        let fixture = Fixture::new().await;
        fixture.seed_rule(rule("rule_sick", LeaveType::Sick, "14")).await;
        let catalog = RuleCatalog::new(fixture.ctx.clone());

        let assignment = catalog
            .assign_rule("emp_001", "rule_sick", Some(dec("16")))
            .await
            .unwrap();

        assert_eq!(assignment.leave_type, LeaveType::Sick);
        let row = fixture.balance("emp_001", LeaveType::Sick).await;
        assert_eq!(row.total_allowed, dec("16"));
        assert_eq!(row.used, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_assign_keeps_usage_of_existing_row() {
        let fixture = Fixture::new().await;
        fixture.seed_rule(rule("rule_sick", LeaveType::Sick, "14")).await;
        fixture.seed_balance("emp_001", LeaveType::Sick, "10", "4").await;
        let catalog = RuleCatalog::new(fixture.ctx.clone());

        catalog.assign_rule("emp_001", "rule_sick", None).await.unwrap();

        let row = fixture.balance("emp_001", LeaveType::Sick).await;
        assert_eq!(row.total_allowed, dec("14"));
        assert_eq!(row.used, dec("4"));
    }

    #[tokio::test]
    async fn test_assign_below_existing_usage_changes_nothing() {
        let fixture = Fixture::new().await;
        fixture.seed_rule(rule("rule_sick", LeaveType::Sick, "14")).await;
        fixture.seed_balance("emp_001", LeaveType::Sick, "14", "9").await;
        let before = fixture.balance("emp_001", LeaveType::Sick).await;
        let catalog = RuleCatalog::new(fixture.ctx.clone());

        let result = catalog
            .assign_rule("emp_001", "rule_sick", Some(dec("6")))
            .await;

        match result {
            Err(EngineError::InsufficientBalance {
                requested,
                available,
                ..
            }) => {
                assert_eq!(requested, dec("9"));
                assert_eq!(available, dec("6"));
            }
            other => panic!("expected InsufficientBalance, got {:?}", other),
        }
        assert!(catalog.assignments("emp_001").await.unwrap().is_empty());
        assert_eq!(fixture.balance("emp_001", LeaveType::Sick).await, before);
    }

    #[tokio::test]
    async fn test_assign_during_store_outage_leaves_nothing_behind() {
        let fixture = Fixture::new().await;
        fixture.seed_rule(rule("rule_sick", LeaveType::Sick, "14")).await;
        fixture.seed_balance("emp_001", LeaveType::Sick, "10", "4").await;
        let before = fixture.balance("emp_001", LeaveType::Sick).await;
        let catalog = RuleCatalog::new(fixture.ctx.clone());

        fixture.store.set_unavailable(true);
        let result = catalog.assign_rule("emp_001", "rule_sick", None).await;
        fixture.store.set_unavailable(false);

        assert!(matches!(result, Err(EngineError::StoreUnavailable { .. })));
        assert!(catalog.assignments("emp_001").await.unwrap().is_empty());
        assert_eq!(fixture.balance("emp_001", LeaveType::Sick).await, before);
    }

    #[tokio::test]
    async fn test_duplicate_assignment() {
        let fixture = Fixture::new().await;
        fixture.seed_rule(rule("rule_sick", LeaveType::Sick, "14")).await;
        let catalog = RuleCatalog::new(fixture.ctx.clone());
        catalog.assign_rule("emp_001", "rule_sick", None).await.unwrap();

        let result = catalog.assign_rule("emp_001", "rule_sick", None).await;
        assert!(matches!(result, Err(EngineError::DuplicateAssignment { .. })));
    }

    #[tokio::test]
    async fn test_unassign_without_requests_removes_row() {
        let fixture = Fixture::new().await;
        fixture.seed_rule(rule("rule_sick", LeaveType::Sick, "14")).await;
        let catalog = RuleCatalog::new(fixture.ctx.clone());
        let assignment = catalog.assign_rule("emp_001", "rule_sick", None).await.unwrap();

        catalog.unassign_rule(&assignment.id).await.unwrap();

        assert!(catalog.assignments("emp_001").await.unwrap().is_empty());
        let key = BalanceKey::new("emp_001", LeaveType::Sick, 2026);
        assert!(fixture.ctx.store().balance(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unassign_with_requests_is_in_use() {
        let fixture = Fixture::new().await;
        fixture.seed_rule(rule("rule_sick", LeaveType::Sick, "14")).await;
        let catalog = RuleCatalog::new(fixture.ctx.clone());
        let assignment = catalog.assign_rule("emp_001", "rule_sick", None).await.unwrap();

        let lifecycle = LeaveLifecycle::new(fixture.ctx.clone());
        lifecycle
            .create(NewLeaveRequest {
                employee_id: "emp_001".to_string(),
                leave_type: LeaveType::Sick,
                start_date: date(2026, 1, 12),
                end_date: date(2026, 1, 12),
                half_day: false,
                half_day_side: None,
                reason: "flu".to_string(),
                attachment: None,
            })
            .await
            .unwrap();

        let result = catalog.unassign_rule(&assignment.id).await;
        match result {
            Err(EngineError::AssignmentInUse { request_count, .. }) => {
                assert_eq!(request_count, 1)
            }
            other => panic!("Expected AssignmentInUse, got {:?}", other),
        }
        assert_eq!(catalog.assignments("emp_001").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_rule_in_use() {
        let fixture = Fixture::new().await;
        fixture.seed_rule(rule("rule_sick", LeaveType::Sick, "14")).await;
        let catalog = RuleCatalog::new(fixture.ctx.clone());
        let assignment = catalog.assign_rule("emp_001", "rule_sick", None).await.unwrap();

        let result = catalog.delete_rule("rule_sick").await;
        assert!(matches!(result, Err(EngineError::RuleInUse { .. })));

        catalog.unassign_rule(&assignment.id).await.unwrap();
        catalog.delete_rule("rule_sick").await.unwrap();
        assert!(matches!(
            catalog.rule("rule_sick").await,
            Err(EngineError::NotFound { .. })
        ));
    }
}
