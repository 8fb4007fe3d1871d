//! In-memory implementation of [`LeaveStore`].
//!
//! Commits apply each staged write to the live tables while recording an
//! undo entry; the first failing write replays the undo log in reverse so a
//! failed commit leaves no trace.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    BalanceKey, EmployeeLeaveRuleAssignment, Holiday, LeaveBalance, LeaveRequest, LeaveRule,
};

use super::{LeaveStore, RequestFilter, UnitOfWork, WriteOp};

#[derive(Debug, Default)]
struct Tables {
    requests: HashMap<String, LeaveRequest>,
    balances: BTreeMap<BalanceKey, LeaveBalance>,
    rules: HashMap<String, LeaveRule>,
    assignments: HashMap<String, EmployeeLeaveRuleAssignment>,
    holidays: Vec<Holiday>,
}

enum Undo {
    Request(String, Option<LeaveRequest>),
    Balance(BalanceKey, Option<LeaveBalance>),
    Rule(String, Option<LeaveRule>),
    Assignment(String, Option<EmployeeLeaveRuleAssignment>),
}

impl Tables {
    fn apply(&mut self, op: WriteOp) -> EngineResult<Undo> {
        match op {
            WriteOp::InsertRequest(mut request) => {
                if self.requests.contains_key(&request.id) {
                    return Err(conflict("leave request", &request.id));
                }
                request.version = 1;
                let id = request.id.clone();
                self.requests.insert(id.clone(), request);
                Ok(Undo::Request(id, None))
            }
            WriteOp::UpdateRequest(mut request) => {
                let stored = self
                    .requests
                    .get(&request.id)
                    .ok_or_else(|| EngineError::not_found("Leave request", &request.id))?;
                if stored.version != request.version {
                    return Err(conflict("leave request", &request.id));
                }
                request.version += 1;
                let id = request.id.clone();
                let previous = self.requests.insert(id.clone(), request);
                Ok(Undo::Request(id, previous))
            }
            WriteOp::DeleteRequest {
                id,
                expected_version,
            } => {
                let stored = self
                    .requests
                    .get(&id)
                    .ok_or_else(|| EngineError::not_found("Leave request", &id))?;
                if stored.version != expected_version {
                    return Err(conflict("leave request", &id));
                }
                let previous = self.requests.remove(&id);
                Ok(Undo::Request(id, previous))
            }
            WriteOp::InsertBalance(mut balance) => {
                if self.balances.contains_key(&balance.key) {
                    return Err(conflict("leave balance", &balance.key.to_string()));
                }
                balance.version = 1;
                let key = balance.key.clone();
                self.balances.insert(key.clone(), balance);
                Ok(Undo::Balance(key, None))
            }
            WriteOp::UpdateBalance(mut balance) => {
                let stored = self
                    .balances
                    .get(&balance.key)
                    .ok_or_else(|| EngineError::not_found("Leave balance", balance.key.to_string()))?;
                if stored.version != balance.version {
                    return Err(conflict("leave balance", &balance.key.to_string()));
                }
                balance.version += 1;
                let key = balance.key.clone();
                let previous = self.balances.insert(key.clone(), balance);
                Ok(Undo::Balance(key, previous))
            }
            WriteOp::DeleteBalance(key) => {
                let previous = self
                    .balances
                    .remove(&key)
                    .ok_or_else(|| EngineError::not_found("Leave balance", key.to_string()))?;
                Ok(Undo::Balance(key, Some(previous)))
            }
            WriteOp::InsertRule(mut rule) => {
                if self.rules.contains_key(&rule.id) {
                    return Err(conflict("leave rule", &rule.id));
                }
                self.ensure_single_active_rule(&rule)?;
                rule.version = 1;
                let id = rule.id.clone();
                self.rules.insert(id.clone(), rule);
                Ok(Undo::Rule(id, None))
            }
            WriteOp::UpdateRule(mut rule) => {
                let stored = self
                    .rules
                    .get(&rule.id)
                    .ok_or_else(|| EngineError::not_found("Leave rule", &rule.id))?;
                if stored.version != rule.version {
                    return Err(conflict("leave rule", &rule.id));
                }
                self.ensure_single_active_rule(&rule)?;
                rule.version += 1;
                let id = rule.id.clone();
                let previous = self.rules.insert(id.clone(), rule);
                Ok(Undo::Rule(id, previous))
            }
            WriteOp::DeleteRule(id) => {
                let previous = self
                    .rules
                    .remove(&id)
                    .ok_or_else(|| EngineError::not_found("Leave rule", &id))?;
                Ok(Undo::Rule(id, Some(previous)))
            }
            WriteOp::InsertAssignment(assignment) => {
                if self.assignments.contains_key(&assignment.id) {
                    return Err(conflict("rule assignment", &assignment.id));
                }
                let duplicate = self.assignments.values().any(|a| {
                    a.employee_id == assignment.employee_id && a.leave_type == assignment.leave_type
                });
                if duplicate {
                    return Err(EngineError::DuplicateAssignment {
                        employee_id: assignment.employee_id,
                        leave_type: assignment.leave_type,
                    });
                }
                let id = assignment.id.clone();
                self.assignments.insert(id.clone(), assignment);
                Ok(Undo::Assignment(id, None))
            }
            WriteOp::DeleteAssignment(id) => {
                let previous = self
                    .assignments
                    .remove(&id)
                    .ok_or_else(|| EngineError::not_found("Rule assignment", &id))?;
                Ok(Undo::Assignment(id, Some(previous)))
            }
        }
    }

    fn ensure_single_active_rule(&self, rule: &LeaveRule) -> EngineResult<()> {
        if !rule.is_active {
            return Ok(());
        }
        let clash = self.rules.values().any(|r| {
            r.id != rule.id
                && r.is_active
                && r.organization_id == rule.organization_id
                && r.leave_type == rule.leave_type
        });
        if clash {
            return Err(EngineError::DuplicateRule {
                organization_id: rule.organization_id.clone(),
                leave_type: rule.leave_type,
            });
        }
        Ok(())
    }

    fn revert(&mut self, undo: Undo) {
        match undo {
            Undo::Request(id, previous) => restore(&mut self.requests, id, previous),
            Undo::Balance(key, previous) => match previous {
                Some(row) => {
                    self.balances.insert(key, row);
                }
                None => {
                    self.balances.remove(&key);
                }
            },
            Undo::Rule(id, previous) => restore(&mut self.rules, id, previous),
            Undo::Assignment(id, previous) => restore(&mut self.assignments, id, previous),
        }
    }
}

fn restore<T>(table: &mut HashMap<String, T>, id: String, previous: Option<T>) {
    match previous {
        Some(row) => {
            table.insert(id, row);
        }
        None => {
            table.remove(&id);
        }
    }
}

fn conflict(entity: &'static str, id: &str) -> EngineError {
    EngineError::ConcurrentUpdateConflict {
        entity,
        id: id.to_string(),
    }
}

/// A [`LeaveStore`] that keeps every table in process memory.
///
/// # Example
///
/// ```
/// use leave_engine::store::{InMemoryStore, LeaveStore, UnitOfWork};
/// use leave_engine::models::{BalanceKey, LeaveBalance, LeaveType};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = InMemoryStore::new();
/// let now = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let key = BalanceKey::new("emp_001", LeaveType::Annual, 2026);
///
/// let mut unit = UnitOfWork::new();
/// unit.insert_balance(LeaveBalance::new(key.clone(), Decimal::from(20), Decimal::ZERO, now));
/// store.commit(unit).await.unwrap();
///
/// let row = store.balance(&key).await.unwrap().unwrap();
/// assert_eq!(row.total_allowed, Decimal::from(20));
/// assert_eq!(row.version, 1);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a holiday. Holidays are maintained outside the engine.
    pub async fn insert_holiday(&self, holiday: Holiday) {
        self.tables.write().await.holidays.push(holiday);
    }

    /// Makes every subsequent call fail with
    /// [`EngineError::StoreUnavailable`] until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> EngineResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(EngineError::StoreUnavailable {
                message: "in-memory store marked unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LeaveStore for InMemoryStore {
    async fn request(&self, id: &str) -> EngineResult<Option<LeaveRequest>> {
        self.check_available()?;
        Ok(self.tables.read().await.requests.get(id).cloned())
    }

    async fn requests(&self, filter: &RequestFilter) -> EngineResult<Vec<LeaveRequest>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut found: Vec<LeaveRequest> = tables
            .requests
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn balance(&self, key: &BalanceKey) -> EngineResult<Option<LeaveBalance>> {
        self.check_available()?;
        Ok(self.tables.read().await.balances.get(key).cloned())
    }

    async fn balances_for_employee(&self, employee_id: &str) -> EngineResult<Vec<LeaveBalance>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .balances
            .values()
            .filter(|b| b.key.employee_id == employee_id)
            .cloned()
            .collect())
    }

    async fn rule(&self, id: &str) -> EngineResult<Option<LeaveRule>> {
        self.check_available()?;
        Ok(self.tables.read().await.rules.get(id).cloned())
    }

    async fn rules_for_organization(&self, organization_id: &str) -> EngineResult<Vec<LeaveRule>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut rules: Vec<LeaveRule> = tables
            .rules
            .values()
            .filter(|r| r.organization_id == organization_id)
            .cloned()
            .collect();
        rules.sort_by(|a, b| a.leave_type.cmp(&b.leave_type).then(a.id.cmp(&b.id)));
        Ok(rules)
    }

    async fn assignment(&self, id: &str) -> EngineResult<Option<EmployeeLeaveRuleAssignment>> {
        self.check_available()?;
        Ok(self.tables.read().await.assignments.get(id).cloned())
    }

    async fn assignments_for_employee(
        &self,
        employee_id: &str,
    ) -> EngineResult<Vec<EmployeeLeaveRuleAssignment>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut assignments: Vec<EmployeeLeaveRuleAssignment> = tables
            .assignments
            .values()
            .filter(|a| a.employee_id == employee_id)
            .cloned()
            .collect();
        assignments.sort_by(|a, b| a.leave_type.cmp(&b.leave_type));
        Ok(assignments)
    }

    async fn assignments_for_rule(
        &self,
        rule_id: &str,
    ) -> EngineResult<Vec<EmployeeLeaveRuleAssignment>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .assignments
            .values()
            .filter(|a| a.rule_id == rule_id)
            .cloned()
            .collect())
    }

    async fn holidays_between(
        &self,
        organization_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<Holiday>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .holidays
            .iter()
            .filter(|h| h.organization_id == organization_id && h.date >= from && h.date <= to)
            .cloned()
            .collect())
    }

    async fn commit(&self, unit: UnitOfWork) -> EngineResult<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let op_count = unit.len();
        let mut undo_log = Vec::with_capacity(op_count);

        for op in unit.into_ops() {
            match tables.apply(op) {
                Ok(undo) => undo_log.push(undo),
                Err(err) => {
                    for undo in undo_log.into_iter().rev() {
                        tables.revert(undo);
                    }
                    debug!(error = %err, "Rolled back unit of work");
                    return Err(err);
                }
            }
        }

        debug!(op_count, "Committed unit of work");
        Ok(())
    }

    async fn purge_balances_before(&self, year: i32) -> EngineResult<usize> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let before = tables.balances.len();
        tables.balances.retain(|key, _| key.year >= year);
        Ok(before - tables.balances.len())
    }
}
