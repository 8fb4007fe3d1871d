//! Ledger balance rows.
//!
//! A [`LeaveBalance`] is the per-employee, per-leave-type, per-year record of
//! allowed, used and carried-forward days. The mutation helpers here are pure:
//! they return the next row or an error and never touch storage. Every helper
//! re-checks `0 <= used <= total_allowed` on its result.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::LeaveType;

/// The identity of a ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BalanceKey {
    /// The employee.
    pub employee_id: String,
    /// The leave type.
    pub leave_type: LeaveType,
    /// The ledger year.
    pub year: i32,
}

impl BalanceKey {
    /// Creates a new balance key.
    pub fn new(employee_id: impl Into<String>, leave_type: LeaveType, year: i32) -> Self {
        Self {
            employee_id: employee_id.into(),
            leave_type,
            year,
        }
    }
}

impl std::fmt::Display for BalanceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.employee_id, self.leave_type, self.year)
    }
}

/// One ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// The row identity.
    #[serde(flatten)]
    pub key: BalanceKey,
    /// Days the employee may take this year, including any carry-forward.
    pub total_allowed: Decimal,
    /// Days consumed by approved requests.
    pub used: Decimal,
    /// Days carried in from the previous year.
    pub carry_forwarded: Decimal,
    /// When the row was last written.
    pub updated_at: NaiveDateTime,
    /// Optimistic concurrency version, bumped by the store on every write.
    #[serde(default)]
    pub version: u64,
}

impl LeaveBalance {
    /// Creates a fresh row with nothing used.
    pub fn new(
        key: BalanceKey,
        total_allowed: Decimal,
        carry_forwarded: Decimal,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            key,
            total_allowed,
            used: Decimal::ZERO,
            carry_forwarded,
            updated_at: now,
            version: 0,
        }
    }

    /// Days still available.
    pub fn available(&self) -> Decimal {
        self.total_allowed - self.used
    }

    /// Returns true if `days` more could be debited.
    pub fn can_cover(&self, days: Decimal) -> bool {
        self.used + days <= self.total_allowed
    }

    /// Returns the row after debiting `days`.
    ///
    /// # Errors
    ///
    /// [`EngineError::InsufficientBalance`] when `used + days > total_allowed`.
    pub fn debited(&self, days: Decimal, now: NaiveDateTime) -> EngineResult<Self> {
        if !self.can_cover(days) {
            return Err(self.insufficient(days));
        }
        Ok(self.with_used(self.used + days, now))
    }

    /// Returns the row after crediting `days` back, floored at zero used.
    pub fn credited(&self, days: Decimal, now: NaiveDateTime) -> Self {
        let used = (self.used - days).max(Decimal::ZERO);
        self.with_used(used, now)
    }

    /// Returns the row after an approved request changed from `old_days` to
    /// `new_days`.
    ///
    /// The delta is applied in the direction of the change and the capacity
    /// check runs on the result for reductions too, so a row that is already
    /// over its allowance is reported instead of silently carried on.
    pub fn adjusted(
        &self,
        old_days: Decimal,
        new_days: Decimal,
        now: NaiveDateTime,
    ) -> EngineResult<Self> {
        let delta = (new_days - old_days).abs();
        let used = if new_days >= old_days {
            self.used + delta
        } else {
            (self.used - delta).max(Decimal::ZERO)
        };

        if used > self.total_allowed {
            return Err(self.insufficient(delta));
        }
        Ok(self.with_used(used, now))
    }

    /// Returns the row with a recomputed allowance and nothing used.
    pub fn reset(&self, total_allowed: Decimal, carry_forwarded: Decimal, now: NaiveDateTime) -> Self {
        Self {
            key: self.key.clone(),
            total_allowed,
            used: Decimal::ZERO,
            carry_forwarded,
            updated_at: now,
            version: self.version,
        }
    }

    fn with_used(&self, used: Decimal, now: NaiveDateTime) -> Self {
        Self {
            used,
            updated_at: now,
            ..self.clone()
        }
    }

    fn insufficient(&self, requested: Decimal) -> EngineError {
        EngineError::InsufficientBalance {
            employee_id: self.key.employee_id.clone(),
            leave_type: self.key.leave_type,
            requested,
            available: self.available().max(Decimal::ZERO),
        }
    }
}
