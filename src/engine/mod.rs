//! Leave engine services.
//!
//! - [`Ledger`]: per-row balance debits, credits and adjustments.
//! - [`LeaveLifecycle`]: create, edit, approve, reject and delete requests.
//! - [`RuleCatalog`]: rules, region defaults, eligibility and assignments.
//! - [`AnnualRollover`]: the yearly balance rollover and its scheduler.
//!
//! [`LeaveEngine`] builds all of them over one [`EngineContext`] and wraps
//! the mutating operations in [`LeaveOutcome`]s.

mod catalog;
mod ledger;
mod lifecycle;
mod retry;
mod rollover;
mod scheduler;

pub use catalog::{LeaveRuleUpdate, NewLeaveRule, RuleCatalog};
pub use ledger::Ledger;
pub use lifecycle::{Actor, ActorRole, LeaveLifecycle, LeaveRequestEdit, NewLeaveRequest};
pub use retry::retry_on_conflict;
pub use rollover::{AnnualRollover, RolloverEntry, RolloverFailure, RolloverReport, carry_forward};
pub use scheduler::{MIN_CHECK_INTERVAL, spawn_rollover_scheduler, spawn_rollover_scheduler_every};

use rust_decimal::Decimal;

use crate::context::EngineContext;
use crate::error::EngineResult;
use crate::models::{EmployeeLeaveRuleAssignment, LeaveRequest};
use crate::outcome::LeaveOutcome;

/// All engine services sharing one context.
#[derive(Clone)]
pub struct LeaveEngine {
    ledger: Ledger,
    lifecycle: LeaveLifecycle,
    catalog: RuleCatalog,
    rollover: AnnualRollover,
}

impl LeaveEngine {
    /// Builds the services over `ctx`.
    pub fn new(ctx: EngineContext) -> Self {
        Self {
            ledger: Ledger::new(ctx.clone()),
            lifecycle: LeaveLifecycle::new(ctx.clone()),
            catalog: RuleCatalog::new(ctx.clone()),
            rollover: AnnualRollover::new(ctx),
        }
    }

    /// The entitlement ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The request lifecycle.
    pub fn lifecycle(&self) -> &LeaveLifecycle {
        &self.lifecycle
    }

    /// The rule catalog.
    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// The annual rollover job.
    pub fn rollover(&self) -> &AnnualRollover {
        &self.rollover
    }

    /// Files a leave request, reporting refusals as a rejected outcome.
    pub async fn submit_request(&self, new: NewLeaveRequest) -> EngineResult<LeaveOutcome<LeaveRequest>> {
        LeaveOutcome::from_result(self.lifecycle.create(new).await, "Leave request submitted")
    }

    /// Approves a request, reporting refusals as a rejected outcome.
    pub async fn approve_request(
        &self,
        request_id: &str,
        approver: &str,
    ) -> EngineResult<LeaveOutcome<LeaveRequest>> {
        LeaveOutcome::from_result(
            self.lifecycle.approve(request_id, approver).await,
            "Leave request approved",
        )
    }

    /// Rejects a request, reporting refusals as a rejected outcome.
    pub async fn reject_request(&self, request_id: &str) -> EngineResult<LeaveOutcome<LeaveRequest>> {
        LeaveOutcome::from_result(self.lifecycle.reject(request_id).await, "Leave request rejected")
    }

    /// Edits a request, reporting refusals as a rejected outcome.
    pub async fn edit_request(
        &self,
        request_id: &str,
        changes: LeaveRequestEdit,
    ) -> EngineResult<LeaveOutcome<LeaveRequest>> {
        LeaveOutcome::from_result(
            self.lifecycle.edit(request_id, changes).await,
            "Leave request updated",
        )
    }

    /// Deletes a request, reporting refusals as a rejected outcome.
    pub async fn delete_request(
        &self,
        request_id: &str,
        actor: &Actor,
    ) -> EngineResult<LeaveOutcome<LeaveRequest>> {
        LeaveOutcome::from_result(
            self.lifecycle.delete(request_id, actor).await,
            "Leave request deleted",
        )
    }

    /// Assigns a rule, reporting refusals as a rejected outcome.
    pub async fn assign_rule(
        &self,
        employee_id: &str,
        rule_id: &str,
        custom_max_allowed: Option<Decimal>,
    ) -> EngineResult<LeaveOutcome<EmployeeLeaveRuleAssignment>> {
        LeaveOutcome::from_result(
            self.catalog
                .assign_rule(employee_id, rule_id, custom_max_allowed)
                .await,
            "Leave rule assigned",
        )
    }

    /// Removes an assignment, reporting refusals as a rejected outcome.
    pub async fn unassign_rule(&self, assignment_id: &str) -> EngineResult<LeaveOutcome<()>> {
        LeaveOutcome::from_result(
            self.catalog.unassign_rule(assignment_id).await,
            "Leave rule unassigned",
        )
    }
}
