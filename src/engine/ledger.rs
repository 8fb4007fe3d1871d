//! Entitlement ledger.
//!
//! The only component that changes `used` and `total_allowed` on a
//! [`LeaveBalance`] row. Row changes are staged into a [`UnitOfWork`] so a
//! caller can commit them together with its own writes; the standalone
//! operations stage one change, commit it against the version read and
//! retry on conflicts a bounded number of times.

use rust_decimal::Decimal;
use tracing::debug;

use crate::context::EngineContext;
use crate::error::{EngineError, EngineResult};
use crate::models::{BalanceKey, LeaveBalance, LeaveType};
use crate::store::{LeaveStore, UnitOfWork};

use super::retry::retry_on_conflict;

/// Reads a ledger row, reporting a missing row as
/// [`EngineError::NoBalanceConfigured`].
pub(crate) async fn require_balance(
    store: &dyn LeaveStore,
    key: &BalanceKey,
) -> EngineResult<LeaveBalance> {
    store
        .balance(key)
        .await?
        .ok_or_else(|| no_balance(key))
}

fn no_balance(key: &BalanceKey) -> EngineError {
    EngineError::NoBalanceConfigured {
        employee_id: key.employee_id.clone(),
        leave_type: key.leave_type,
        year: key.year,
    }
}

/// The row as the store holds it after a staged write commits.
fn committed(row: LeaveBalance) -> LeaveBalance {
    LeaveBalance {
        version: row.version + 1,
        ..row
    }
}

/// Per-row balance operations.
#[derive(Clone)]
pub struct Ledger {
    ctx: EngineContext,
}

impl Ledger {
    /// Creates a ledger over the context's store.
    pub fn new(ctx: EngineContext) -> Self {
        Self { ctx }
    }

    /// Loads one row.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] when the row does not exist.
    pub async fn get_balance(
        &self,
        employee_id: &str,
        leave_type: LeaveType,
        year: i32,
    ) -> EngineResult<LeaveBalance> {
        let key = BalanceKey::new(employee_id, leave_type, year);
        self.ctx
            .store()
            .balance(&key)
            .await?
            .ok_or_else(|| EngineError::not_found("Leave balance", key.to_string()))
    }

    /// Lists an employee's rows for one year, ordered by leave type.
    pub async fn balances_for(&self, employee_id: &str, year: i32) -> EngineResult<Vec<LeaveBalance>> {
        let mut rows: Vec<LeaveBalance> = self
            .ctx
            .store()
            .balances_for_employee(employee_id)
            .await?
            .into_iter()
            .filter(|b| b.key.year == year)
            .collect();
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(rows)
    }

    /// Adds `days` to `used`.
    ///
    /// # Errors
    ///
    /// [`EngineError::InsufficientBalance`] when the row cannot cover `days`.
    pub async fn debit(&self, key: &BalanceKey, days: Decimal) -> EngineResult<LeaveBalance> {
        let this = self;
        let row = retry_on_conflict(self.retry_limit(), "ledger_debit", move || async move {
            let mut unit = UnitOfWork::new();
            let row = this.stage_debit(&mut unit, key, days).await?;
            this.ctx.store().commit(unit).await?;
            Ok(committed(row))
        })
        .await?;
        trace_write("ledger_debit", &row);
        Ok(row)
    }

    /// Removes `days` from `used`, never going below zero.
    ///
    /// # Errors
    ///
    /// [`EngineError::NoBalanceConfigured`] when the row does not exist.
    pub async fn credit(&self, key: &BalanceKey, days: Decimal) -> EngineResult<LeaveBalance> {
        let this = self;
        let row = retry_on_conflict(self.retry_limit(), "ledger_credit", move || async move {
            let mut unit = UnitOfWork::new();
            let row = this
                .stage_credit(&mut unit, key, days)
                .await?
                .ok_or_else(|| no_balance(key))?;
            this.ctx.store().commit(unit).await?;
            Ok(committed(row))
        })
        .await?;
        trace_write("ledger_credit", &row);
        Ok(row)
    }

    /// Applies the change of an approved request from `old_days` to `new_days`.
    pub async fn adjust_for_edit(
        &self,
        key: &BalanceKey,
        old_days: Decimal,
        new_days: Decimal,
    ) -> EngineResult<LeaveBalance> {
        let this = self;
        let row = retry_on_conflict(self.retry_limit(), "ledger_adjust", move || async move {
            let mut unit = UnitOfWork::new();
            let row = this.stage_adjust(&mut unit, key, old_days, new_days).await?;
            this.ctx.store().commit(unit).await?;
            Ok(committed(row))
        })
        .await?;
        trace_write("ledger_adjust", &row);
        Ok(row)
    }

    /// Creates a row with nothing used.
    ///
    /// # Errors
    ///
    /// [`EngineError::BalanceAlreadyExists`] when the row already exists.
    pub async fn initialize(
        &self,
        key: BalanceKey,
        total_allowed: Decimal,
        carry_forwarded: Decimal,
    ) -> EngineResult<LeaveBalance> {
        let store = self.ctx.store();
        let already_exists = || EngineError::BalanceAlreadyExists {
            employee_id: key.employee_id.clone(),
            leave_type: key.leave_type,
            year: key.year,
        };
        if store.balance(&key).await?.is_some() {
            return Err(already_exists());
        }

        let mut unit = UnitOfWork::new();
        let row = self.stage_initialize(&mut unit, key.clone(), total_allowed, carry_forwarded);
        match store.commit(unit).await {
            Ok(()) => {}
            // the only write is the insert, so a conflict means the row appeared
            Err(EngineError::ConcurrentUpdateConflict { .. }) => return Err(already_exists()),
            Err(err) => return Err(err),
        }

        debug!(key = %row.key, total_allowed = %total_allowed, "Initialized leave balance");
        Ok(committed(row))
    }

    /// Checks that the row could take `days` more without staging anything.
    pub async fn check_capacity(&self, key: &BalanceKey, days: Decimal) -> EngineResult<LeaveBalance> {
        let row = require_balance(self.ctx.store(), key).await?;
        row.debited(days, self.ctx.clock().now())?;
        Ok(row)
    }

    /// Stages a debit of `days` on the row; returns the staged row.
    pub async fn stage_debit(
        &self,
        unit: &mut UnitOfWork,
        key: &BalanceKey,
        days: Decimal,
    ) -> EngineResult<LeaveBalance> {
        let row = require_balance(self.ctx.store(), key)
            .await?
            .debited(days, self.ctx.clock().now())?;
        unit.update_balance(row.clone());
        Ok(row)
    }

    /// Stages a credit of `days` on the row.
    ///
    /// A row removed by the retention purge has nothing left to credit;
    /// that returns `Ok(None)` and stages nothing.
    pub async fn stage_credit(
        &self,
        unit: &mut UnitOfWork,
        key: &BalanceKey,
        days: Decimal,
    ) -> EngineResult<Option<LeaveBalance>> {
        let Some(current) = self.ctx.store().balance(key).await? else {
            debug!(key = %key, days = %days, "No ledger row to credit; skipping");
            return Ok(None);
        };
        let row = current.credited(days, self.ctx.clock().now());
        unit.update_balance(row.clone());
        Ok(Some(row))
    }

    /// Stages the change of an approved request from `old_days` to `new_days`.
    pub async fn stage_adjust(
        &self,
        unit: &mut UnitOfWork,
        key: &BalanceKey,
        old_days: Decimal,
        new_days: Decimal,
    ) -> EngineResult<LeaveBalance> {
        let row = require_balance(self.ctx.store(), key)
            .await?
            .adjusted(old_days, new_days, self.ctx.clock().now())?;
        unit.update_balance(row.clone());
        Ok(row)
    }

    /// Stages the insert of a fresh row with nothing used.
    pub fn stage_initialize(
        &self,
        unit: &mut UnitOfWork,
        key: BalanceKey,
        total_allowed: Decimal,
        carry_forwarded: Decimal,
    ) -> LeaveBalance {
        let row = LeaveBalance::new(key, total_allowed, carry_forwarded, self.ctx.clock().now());
        unit.insert_balance(row.clone());
        row
    }

    /// Stages a new base entitlement for the row.
    ///
    /// An existing row keeps its usage and carry-forward and gets
    /// `base + carry_forwarded` as its allowance; a missing row is created
    /// with `base` and nothing used.
    ///
    /// # Errors
    ///
    /// [`EngineError::InsufficientBalance`] when existing usage exceeds the
    /// recomputed allowance.
    pub async fn stage_allowance(
        &self,
        unit: &mut UnitOfWork,
        key: &BalanceKey,
        base: Decimal,
    ) -> EngineResult<LeaveBalance> {
        let now = self.ctx.clock().now();
        match self.ctx.store().balance(key).await? {
            Some(current) => {
                let total_allowed = base + current.carry_forwarded;
                if current.used > total_allowed {
                    return Err(EngineError::InsufficientBalance {
                        employee_id: key.employee_id.clone(),
                        leave_type: key.leave_type,
                        requested: current.used,
                        available: total_allowed,
                    });
                }
                let row = LeaveBalance {
                    total_allowed,
                    updated_at: now,
                    ..current
                };
                unit.update_balance(row.clone());
                Ok(row)
            }
            None => Ok(self.stage_initialize(unit, key.clone(), base, Decimal::ZERO)),
        }
    }

    /// Stages a new-year row: `total_allowed` and `carry_forwarded` with
    /// nothing used, overwriting a row written by an earlier run.
    pub async fn stage_rollover(
        &self,
        unit: &mut UnitOfWork,
        key: &BalanceKey,
        total_allowed: Decimal,
        carry_forwarded: Decimal,
    ) -> EngineResult<LeaveBalance> {
        match self.ctx.store().balance(key).await? {
            Some(current) => {
                let row = current.reset(total_allowed, carry_forwarded, self.ctx.clock().now());
                unit.update_balance(row.clone());
                Ok(row)
            }
            None => Ok(self.stage_initialize(unit, key.clone(), total_allowed, carry_forwarded)),
        }
    }

    /// Stages the removal of the row, if it exists.
    pub async fn stage_remove(&self, unit: &mut UnitOfWork, key: &BalanceKey) -> EngineResult<bool> {
        if self.ctx.store().balance(key).await?.is_none() {
            return Ok(false);
        }
        unit.delete_balance(key.clone());
        Ok(true)
    }

    fn retry_limit(&self) -> u32 {
        self.ctx.settings().conflict_retry_limit
    }
}

fn trace_write(operation: &'static str, row: &LeaveBalance) {
    debug!(
        key = %row.key,
        operation,
        used = %row.used,
        total_allowed = %row.total_allowed,
        "Ledger row updated"
    );
}
