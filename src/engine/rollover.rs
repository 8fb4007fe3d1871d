//! Annual balance rollover.
//!
//! For a target year every active or on-leave employee gets one ledger row
//! per applicable rule. Annual leave carries the previous year's unused days
//! forward up to a fixed cap; every other type starts from its base
//! entitlement. Rows are overwritten on re-runs, so running the job twice
//! for a year leaves the same ledger as running it once.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::context::EngineContext;
use crate::error::EngineResult;
use crate::models::{
    BalanceKey, Employee, EmployeeLeaveRuleAssignment, EmployeeStatus, LeaveBalance, LeaveRule,
};
use crate::store::UnitOfWork;

use super::ledger::Ledger;
use super::retry::retry_on_conflict;

/// One ledger row written by the rollover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloverEntry {
    /// The row written.
    pub key: BalanceKey,
    /// The rule the row was derived from.
    pub rule_id: String,
    /// Entitlement before carry-forward.
    pub base_max_allowed: Decimal,
    /// Days carried in from the previous year.
    pub carry_forwarded: Decimal,
    /// The resulting allowance.
    pub total_allowed: Decimal,
    /// How the allowance was derived.
    pub reasoning: String,
}

/// An employee the rollover could not process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloverFailure {
    /// The employee.
    pub employee_id: String,
    /// The error code.
    pub code: String,
    /// The error message.
    pub message: String,
}

/// Summary of one rollover run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloverReport {
    /// The target year.
    pub year: i32,
    /// Employees considered.
    pub employees_processed: usize,
    /// Employees whose rows were all written.
    pub succeeded: usize,
    /// Employees skipped because of an error.
    pub failed: usize,
    /// One entry per failed employee.
    pub failures: Vec<RolloverFailure>,
    /// Every row written.
    pub entries: Vec<RolloverEntry>,
    /// Number of rows written.
    pub rows_written: usize,
    /// Rows removed by the retention purge, when it ran and succeeded.
    pub purged: Option<usize>,
    /// Why the purge failed, if it did.
    pub purge_error: Option<String>,
}

/// Days carried into a new year from the previous year's row.
///
/// `min(max(total_allowed - used, 0), cap)`, or zero without a previous row.
///
/// # Example
///
/// ```
/// use leave_engine::engine::carry_forward;
/// use leave_engine::models::{BalanceKey, LeaveBalance, LeaveType};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let now = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let mut previous = LeaveBalance::new(
///     BalanceKey::new("emp_001", LeaveType::Annual, 2025),
///     Decimal::from(20),
///     Decimal::ZERO,
///     now,
/// );
/// previous.used = Decimal::from(5);
///
/// assert_eq!(carry_forward(Some(&previous), Decimal::from(10)), Decimal::from(10));
/// previous.used = Decimal::from(17);
/// assert_eq!(carry_forward(Some(&previous), Decimal::from(10)), Decimal::from(3));
/// assert_eq!(carry_forward(None, Decimal::from(10)), Decimal::ZERO);
/// ```
pub fn carry_forward(previous: Option<&LeaveBalance>, cap: Decimal) -> Decimal {
    previous
        .map(|row| (row.total_allowed - row.used).max(Decimal::ZERO).min(cap))
        .unwrap_or(Decimal::ZERO)
}

/// The yearly rollover job.
#[derive(Clone)]
pub struct AnnualRollover {
    ctx: EngineContext,
    ledger: Ledger,
}

impl AnnualRollover {
    /// Creates the job over `ctx`.
    pub fn new(ctx: EngineContext) -> Self {
        Self {
            ledger: Ledger::new(ctx.clone()),
            ctx,
        }
    }

    pub(crate) fn context(&self) -> &EngineContext {
        &self.ctx
    }

    /// Runs the rollover for `year`, or the clock's current year.
    ///
    /// Failures for one employee are recorded in the report and the run
    /// continues. Only a failure to list employees fails the run.
    pub async fn run(&self, year: Option<i32>) -> EngineResult<RolloverReport> {
        let year = year.unwrap_or_else(|| self.ctx.clock().current_year());
        let statuses: Vec<EmployeeStatus> = EmployeeStatus::ALL
            .into_iter()
            .filter(EmployeeStatus::receives_rollover)
            .collect();
        let employees = self.ctx.directory().employees_with_status(&statuses).await?;

        info!(year, employees = employees.len(), "Starting annual leave rollover");

        let mut report = RolloverReport {
            year,
            employees_processed: employees.len(),
            succeeded: 0,
            failed: 0,
            failures: Vec::new(),
            entries: Vec::new(),
            rows_written: 0,
            purged: None,
            purge_error: None,
        };

        for employee in &employees {
            match self.roll_employee(employee, year).await {
                Ok(entries) => {
                    report.succeeded += 1;
                    report.rows_written += entries.len();
                    report.entries.extend(entries);
                }
                Err(err) => {
                    warn!(
                        employee_id = %employee.id,
                        year,
                        error = %err,
                        "Rollover failed for employee"
                    );
                    report.failed += 1;
                    report.failures.push(RolloverFailure {
                        employee_id: employee.id.clone(),
                        code: err.code().to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }

        if let Some(retention) = self.ctx.settings().balance_retention_years {
            let cutoff = year - retention;
            match self.ctx.store().purge_balances_before(cutoff).await {
                Ok(purged) => {
                    debug!(cutoff, purged, "Purged old leave balances");
                    report.purged = Some(purged);
                }
                Err(err) => {
                    warn!(cutoff, error = %err, "Leave balance purge failed");
                    report.purge_error = Some(err.to_string());
                }
            }
        }

        info!(
            year,
            succeeded = report.succeeded,
            failed = report.failed,
            rows_written = report.rows_written,
            "Annual leave rollover finished"
        );
        Ok(report)
    }

    async fn roll_employee(&self, employee: &Employee, year: i32) -> EngineResult<Vec<RolloverEntry>> {
        let rules = self.applicable_rules(employee).await?;
        let this = self;
        let rules = &rules;

        retry_on_conflict(
            self.ctx.settings().conflict_retry_limit,
            "annual_rollover",
            move || async move {
                let store = this.ctx.store();
                let cap = this.ctx.settings().carry_forward_cap;

                let mut unit = UnitOfWork::new();
                let mut entries = Vec::with_capacity(rules.len());
                for (rule, assignment) in rules {
                    let key = BalanceKey::new(employee.id.clone(), rule.leave_type, year);
                    let base = match assignment {
                        Some(a) => a.base_max_allowed(rule),
                        None => rule.max_allowed,
                    };

                    let (carry, reasoning) = if rule.leave_type.carries_forward() {
                        let previous_key =
                            BalanceKey::new(employee.id.clone(), rule.leave_type, year - 1);
                        let previous = store.balance(&previous_key).await?;
                        let carry = carry_forward(previous.as_ref(), cap);
                        let reasoning = match &previous {
                            Some(row) => format!(
                                "{}: base {} + carry-forward {} (unused {} of {} in {}, capped at {}) = {}",
                                rule.leave_type,
                                base,
                                carry,
                                (row.total_allowed - row.used).max(Decimal::ZERO),
                                row.total_allowed,
                                year - 1,
                                cap,
                                base + carry
                            ),
                            None => format!(
                                "{}: base {}, no {} balance to carry forward",
                                rule.leave_type,
                                base,
                                year - 1
                            ),
                        };
                        (carry, reasoning)
                    } else {
                        (
                            Decimal::ZERO,
                            format!("{}: base {}, does not carry forward", rule.leave_type, base),
                        )
                    };
                    let total = base + carry;

                    this.ledger.stage_rollover(&mut unit, &key, total, carry).await?;

                    entries.push(RolloverEntry {
                        key,
                        rule_id: rule.id.clone(),
                        base_max_allowed: base,
                        carry_forwarded: carry,
                        total_allowed: total,
                        reasoning,
                    });
                }

                store.commit(unit).await?;
                Ok(entries)
            },
        )
        .await
    }

    /// Assigned active rules take precedence; without assignments every
    /// active organization rule that admits the employee applies.
    async fn applicable_rules(
        &self,
        employee: &Employee,
    ) -> EngineResult<Vec<(LeaveRule, Option<EmployeeLeaveRuleAssignment>)>> {
        let store = self.ctx.store();
        let assignments = store.assignments_for_employee(&employee.id).await?;

        if !assignments.is_empty() {
            let mut rules = Vec::with_capacity(assignments.len());
            for assignment in assignments {
                match store.rule(&assignment.rule_id).await? {
                    Some(rule) if rule.is_active => rules.push((rule, Some(assignment))),
                    _ => debug!(
                        employee_id = %employee.id,
                        rule_id = %assignment.rule_id,
                        "Skipping assignment to missing or inactive rule"
                    ),
                }
            }
            return Ok(rules);
        }

        let today = self.ctx.clock().today();
        Ok(store
            .rules_for_organization(&employee.organization_id)
            .await?
            .into_iter()
            .filter(|r| r.is_active && r.admits(employee, today))
            .map(|r| (r, None))
            .collect())
    }
}
