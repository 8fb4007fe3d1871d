//! Leave request lifecycle.
//!
//! Requests move `pending -> approved` or `pending -> rejected`; approved and
//! rejected requests may be flipped by later approvals, rejections or edits,
//! and any request may be deleted. The ledger is only debited while a
//! request is approved:
//!
//! | transition              | ledger effect                         |
//! |-------------------------|---------------------------------------|
//! | create                  | capacity pre-check, no debit          |
//! | pending/rejected -> approved | debit `applied_days`             |
//! | approved -> rejected    | credit `applied_days`                 |
//! | approved edit           | adjust by the change in days          |
//! | delete approved         | credit `applied_days`                 |
//!
//! Each transition writes the request and its ledger row in one unit of
//! work and is retried on concurrent update conflicts. Notifications are
//! sent after the commit; a failed delivery is logged and otherwise ignored.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calendar::validate_leave_window;
use crate::context::EngineContext;
use crate::error::{EngineError, EngineResult};
use crate::external::{NotificationEvent, NotificationKind};
use crate::models::{
    BalanceKey, Employee, HalfDaySide, LeaveRequest, LeaveRule, LeaveStatus, LeaveType,
    compute_applied_days,
};
use crate::store::{RequestFilter, UnitOfWork};

use super::ledger::Ledger;
use super::retry::retry_on_conflict;

/// Input for filing a leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLeaveRequest {
    /// The requesting employee.
    pub employee_id: String,
    /// The kind of leave.
    pub leave_type: LeaveType,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Whether only half of a single day is requested.
    #[serde(default)]
    pub half_day: bool,
    /// Which half, for half-day requests.
    #[serde(default)]
    pub half_day_side: Option<HalfDaySide>,
    /// Free-text reason.
    #[serde(default)]
    pub reason: String,
    /// Attachment reference, if a document was uploaded.
    #[serde(default)]
    pub attachment: Option<String>,
}

/// Fields an edit may change. Unset fields keep their current value; the
/// leave type and employee cannot be edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequestEdit {
    /// New first day.
    pub start_date: Option<NaiveDate>,
    /// New last day.
    pub end_date: Option<NaiveDate>,
    /// New half-day flag.
    pub half_day: Option<bool>,
    /// New half-day side.
    pub half_day_side: Option<HalfDaySide>,
    /// New reason.
    pub reason: Option<String>,
    /// New attachment reference.
    pub attachment: Option<String>,
    /// New status.
    pub status: Option<LeaveStatus>,
    /// Approver, required when the resulting status is approved.
    pub approved_by: Option<String>,
}

/// The role an actor acts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// A regular employee.
    Employee,
    /// A people manager.
    Manager,
    /// An HR administrator.
    Admin,
}

/// Who performs an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The acting user's id.
    pub id: String,
    /// The role the user acts in.
    pub role: ActorRole,
}

impl Actor {
    /// Creates an actor.
    pub fn new(id: impl Into<String>, role: ActorRole) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}

/// Operations on leave requests.
#[derive(Clone)]
pub struct LeaveLifecycle {
    ctx: EngineContext,
    ledger: Ledger,
}

impl LeaveLifecycle {
    /// Creates the lifecycle over `ctx`.
    pub fn new(ctx: EngineContext) -> Self {
        Self {
            ledger: Ledger::new(ctx.clone()),
            ctx,
        }
    }

    /// Loads a request.
    pub async fn request(&self, request_id: &str) -> EngineResult<LeaveRequest> {
        self.ctx
            .store()
            .request(request_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Leave request", request_id))
    }

    /// Lists requests passing `filter`, oldest first.
    pub async fn requests(&self, filter: &RequestFilter) -> EngineResult<Vec<LeaveRequest>> {
        self.ctx.store().requests(filter).await
    }

    /// Files a pending request.
    ///
    /// The request is charged against the current year's ledger row, which
    /// must exist and be able to cover the applied days. Nothing is debited
    /// until approval.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotFound`] for an unknown employee
    /// - [`EngineError::InvalidDateRange`] for reversed dates or a multi-day half-day
    /// - [`EngineError::LeaveWindowRejected`] when the window covers non-working days
    /// - [`EngineError::DocumentRequired`] when the rule needs an attachment
    /// - [`EngineError::NoBalanceConfigured`] / [`EngineError::InsufficientBalance`]
    pub async fn create(&self, new: NewLeaveRequest) -> EngineResult<LeaveRequest> {
        let employee = self.employee(&new.employee_id).await?;
        let applied_days = derive_days(new.start_date, new.end_date, new.half_day)?;
        self.check_window(&employee.organization_id, new.start_date, new.end_date)
            .await?;

        let attachment = new.attachment.filter(|a| !a.trim().is_empty());
        let rule = self
            .active_rule(&employee.organization_id, new.leave_type)
            .await?;
        if rule.is_some_and(|r| r.requires_document) && attachment.is_none() {
            return Err(EngineError::DocumentRequired {
                leave_type: new.leave_type,
            });
        }

        let now = self.ctx.clock().now();
        let key = BalanceKey::new(employee.id.clone(), new.leave_type, now.year());
        self.ledger.check_capacity(&key, applied_days).await?;

        let request = LeaveRequest {
            id: Uuid::new_v4().to_string(),
            employee_id: employee.id.clone(),
            leave_type: new.leave_type,
            start_date: new.start_date,
            end_date: new.end_date,
            applied_days,
            half_day: new.half_day,
            half_day_side: new.half_day_side.filter(|_| new.half_day),
            status: LeaveStatus::Pending,
            approved_by: None,
            reason: new.reason,
            attachment,
            balance_year: key.year,
            created_at: now,
            updated_at: now,
            version: 0,
        };

        let mut unit = UnitOfWork::new();
        unit.insert_request(request.clone());
        self.ctx.store().commit(unit).await?;
        let request = LeaveRequest {
            version: 1,
            ..request
        };

        info!(
            request_id = %request.id,
            employee_id = %request.employee_id,
            leave_type = %request.leave_type,
            applied_days = %request.applied_days,
            "Leave request submitted"
        );
        if let Some(manager_id) = employee.manager_id.as_deref() {
            self.notify(manager_id, NotificationKind::LeaveSubmitted, &request)
                .await;
        }
        Ok(request)
    }

    /// Approves a request and debits its applied days.
    ///
    /// Approving an approved request is a no-op. On
    /// [`EngineError::InsufficientBalance`] the request keeps its status.
    pub async fn approve(&self, request_id: &str, approver: &str) -> EngineResult<LeaveRequest> {
        if approver.trim().is_empty() {
            return Err(EngineError::MissingApprover {
                request_id: request_id.to_string(),
            });
        }

        let this = self;
        let (request, changed) = retry_on_conflict(self.retry_limit(), "approve_leave", move || {
            this.approve_once(request_id, approver)
        })
        .await?;

        if changed {
            info!(
                request_id = %request.id,
                employee_id = %request.employee_id,
                approved_by = %approver,
                applied_days = %request.applied_days,
                "Leave request approved"
            );
            self.notify(&request.employee_id, NotificationKind::LeaveApproved, &request)
                .await;
        }
        Ok(request)
    }

    async fn approve_once(
        &self,
        request_id: &str,
        approver: &str,
    ) -> EngineResult<(LeaveRequest, bool)> {
        let request = self.request(request_id).await?;
        if request.status == LeaveStatus::Approved {
            return Ok((request, false));
        }

        let mut unit = UnitOfWork::new();
        self.ledger
            .stage_debit(&mut unit, &request.balance_key(), request.applied_days)
            .await?;
        let updated = LeaveRequest {
            status: LeaveStatus::Approved,
            approved_by: Some(approver.to_string()),
            updated_at: self.ctx.clock().now(),
            ..request
        };
        unit.update_request(updated.clone());
        self.ctx.store().commit(unit).await?;
        Ok((bumped(updated), true))
    }

    /// Rejects a request, crediting its days back if it was approved.
    ///
    /// Rejecting a rejected request is a no-op.
    pub async fn reject(&self, request_id: &str) -> EngineResult<LeaveRequest> {
        let this = self;
        let (request, previous) = retry_on_conflict(self.retry_limit(), "reject_leave", move || {
            this.reject_once(request_id)
        })
        .await?;

        if previous != LeaveStatus::Rejected {
            info!(
                request_id = %request.id,
                employee_id = %request.employee_id,
                previous_status = %previous,
                "Leave request rejected"
            );
            self.notify(&request.employee_id, NotificationKind::LeaveRejected, &request)
                .await;
        }
        Ok(request)
    }

    async fn reject_once(&self, request_id: &str) -> EngineResult<(LeaveRequest, LeaveStatus)> {
        let request = self.request(request_id).await?;
        let previous = request.status;
        if previous == LeaveStatus::Rejected {
            return Ok((request, previous));
        }

        let now = self.ctx.clock().now();
        let mut unit = UnitOfWork::new();
        if previous.is_debited() {
            self.ledger
                .stage_credit(&mut unit, &request.balance_key(), request.applied_days)
                .await?;
        }
        let updated = LeaveRequest {
            status: LeaveStatus::Rejected,
            updated_at: now,
            ..request
        };
        unit.update_request(updated.clone());
        self.ctx.store().commit(unit).await?;
        Ok((bumped(updated), previous))
    }

    /// Applies an edit.
    ///
    /// Applied days are re-derived from the resulting dates. The ledger
    /// follows the status change: an approved request that stays approved is
    /// adjusted by the change in days, leaving or entering approved credits
    /// or debits, and a pending request with new days is re-checked against
    /// the row without touching it.
    pub async fn edit(&self, request_id: &str, changes: LeaveRequestEdit) -> EngineResult<LeaveRequest> {
        let this = self;
        let changes = &changes;
        let (request, previous) = retry_on_conflict(self.retry_limit(), "edit_leave", move || {
            this.edit_once(request_id, changes)
        })
        .await?;

        info!(
            request_id = %request.id,
            status = %request.status,
            applied_days = %request.applied_days,
            "Leave request edited"
        );
        if request.status != previous {
            match request.status {
                LeaveStatus::Approved => {
                    self.notify(&request.employee_id, NotificationKind::LeaveApproved, &request)
                        .await
                }
                LeaveStatus::Rejected => {
                    self.notify(&request.employee_id, NotificationKind::LeaveRejected, &request)
                        .await
                }
                LeaveStatus::Pending => {}
            }
        }
        Ok(request)
    }

    async fn edit_once(
        &self,
        request_id: &str,
        changes: &LeaveRequestEdit,
    ) -> EngineResult<(LeaveRequest, LeaveStatus)> {
        let current = self.request(request_id).await?;

        let start_date = changes.start_date.unwrap_or(current.start_date);
        let end_date = changes.end_date.unwrap_or(current.end_date);
        let half_day = changes.half_day.unwrap_or(current.half_day);
        let applied_days = derive_days(start_date, end_date, half_day)?;

        if start_date != current.start_date || end_date != current.end_date {
            let employee = self.employee(&current.employee_id).await?;
            self.check_window(&employee.organization_id, start_date, end_date)
                .await?;
        }

        let status = changes.status.unwrap_or(current.status);
        let approved_by = changes
            .approved_by
            .clone()
            .filter(|a| !a.trim().is_empty())
            .or_else(|| current.approved_by.clone());
        if status == LeaveStatus::Approved && approved_by.is_none() {
            return Err(EngineError::MissingApprover {
                request_id: current.id.clone(),
            });
        }

        let now = self.ctx.clock().now();
        let key = current.balance_key();
        let days_changed = applied_days != current.applied_days;
        let mut unit = UnitOfWork::new();
        match (current.status.is_debited(), status.is_debited()) {
            (true, true) if days_changed => {
                self.ledger
                    .stage_adjust(&mut unit, &key, current.applied_days, applied_days)
                    .await?;
            }
            (true, false) => {
                self.ledger
                    .stage_credit(&mut unit, &key, current.applied_days)
                    .await?;
            }
            (false, true) => {
                self.ledger.stage_debit(&mut unit, &key, applied_days).await?;
            }
            (false, false) if days_changed && status == LeaveStatus::Pending => {
                self.ledger.check_capacity(&key, applied_days).await?;
            }
            _ => {}
        }

        let updated = LeaveRequest {
            start_date,
            end_date,
            applied_days,
            half_day,
            half_day_side: if half_day {
                changes.half_day_side.or(current.half_day_side)
            } else {
                None
            },
            status,
            approved_by,
            reason: changes
                .reason
                .clone()
                .unwrap_or_else(|| current.reason.clone()),
            attachment: changes
                .attachment
                .clone()
                .or_else(|| current.attachment.clone()),
            updated_at: now,
            ..current.clone()
        };
        unit.update_request(updated.clone());
        self.ctx.store().commit(unit).await?;
        Ok((bumped(updated), current.status))
    }

    /// Deletes a request on behalf of `actor`, crediting its days back if it
    /// was approved.
    ///
    /// Admins may delete any request, managers the requests of their direct
    /// reports, and anyone their own pending request.
    pub async fn delete(&self, request_id: &str, actor: &Actor) -> EngineResult<LeaveRequest> {
        let this = self;
        let deleted = retry_on_conflict(self.retry_limit(), "delete_leave", move || {
            this.delete_once(request_id, actor)
        })
        .await?;

        info!(
            request_id = %deleted.id,
            employee_id = %deleted.employee_id,
            actor_id = %actor.id,
            status = %deleted.status,
            "Leave request deleted"
        );
        self.notify(&deleted.employee_id, NotificationKind::LeaveDeleted, &deleted)
            .await;
        Ok(deleted)
    }

    async fn delete_once(&self, request_id: &str, actor: &Actor) -> EngineResult<LeaveRequest> {
        let request = self.request(request_id).await?;
        let employee = self.ctx.directory().employee(&request.employee_id).await?;
        authorize_delete(actor, &request, employee.as_ref())?;

        let mut unit = UnitOfWork::new();
        if request.status.is_debited() {
            self.ledger
                .stage_credit(&mut unit, &request.balance_key(), request.applied_days)
                .await?;
        }
        unit.delete_request(&request);
        self.ctx.store().commit(unit).await?;
        Ok(request)
    }

    /// Resolves the request's attachment to a URL, if it has one.
    pub async fn attachment_url(&self, request_id: &str) -> EngineResult<Option<String>> {
        let request = self.request(request_id).await?;
        match request.attachment.as_deref() {
            Some(reference) => Ok(Some(self.ctx.attachments().resolve_url(reference).await?)),
            None => Ok(None),
        }
    }

    fn retry_limit(&self) -> u32 {
        self.ctx.settings().conflict_retry_limit
    }

    async fn employee(&self, employee_id: &str) -> EngineResult<Employee> {
        self.ctx
            .directory()
            .employee(employee_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Employee", employee_id))
    }

    async fn active_rule(
        &self,
        organization_id: &str,
        leave_type: LeaveType,
    ) -> EngineResult<Option<LeaveRule>> {
        let rules = self.ctx.store().rules_for_organization(organization_id).await?;
        Ok(rules
            .into_iter()
            .find(|r| r.is_active && r.leave_type == leave_type))
    }

    async fn check_window(
        &self,
        organization_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<()> {
        let settings = self.ctx.settings();
        if !settings.enforce_leave_window {
            return Ok(());
        }
        let verdict = validate_leave_window(
            self.ctx.store(),
            organization_id,
            start,
            end,
            settings.holiday_buffer_days,
        )
        .await?;
        if !verdict.is_valid {
            return Err(EngineError::LeaveWindowRejected {
                message: verdict.message,
            });
        }
        Ok(())
    }

    async fn notify(&self, recipient: &str, kind: NotificationKind, request: &LeaveRequest) {
        let event = NotificationEvent {
            kind,
            request_id: request.id.clone(),
            payload: json!({
                "employee_id": request.employee_id,
                "leave_type": request.leave_type,
                "start_date": request.start_date,
                "end_date": request.end_date,
                "applied_days": request.applied_days,
                "status": request.status,
                "approved_by": request.approved_by,
            }),
        };
        if let Err(err) = self.ctx.notifier().notify(recipient, event).await {
            warn!(
                recipient = %recipient,
                kind = %kind,
                request_id = %request.id,
                error = %err,
                "Failed to deliver leave notification"
            );
        }
    }
}

fn derive_days(start: NaiveDate, end: NaiveDate, half_day: bool) -> EngineResult<Decimal> {
    let days = compute_applied_days(start, end, half_day)?;
    if half_day && start != end {
        return Err(EngineError::InvalidDateRange {
            message: format!(
                "half-day leave must start and end on the same day, got {} to {}",
                start, end
            ),
        });
    }
    Ok(days)
}

fn authorize_delete(
    actor: &Actor,
    request: &LeaveRequest,
    employee: Option<&Employee>,
) -> EngineResult<()> {
    let own_pending = actor.id == request.employee_id && request.status == LeaveStatus::Pending;
    let allowed = match actor.role {
        ActorRole::Admin => true,
        ActorRole::Manager => {
            own_pending
                || employee.is_some_and(|e| e.manager_id.as_deref() == Some(actor.id.as_str()))
        }
        ActorRole::Employee => own_pending,
    };

    if allowed {
        Ok(())
    } else {
        Err(EngineError::NotAuthorized {
            actor_id: actor.id.clone(),
            action: format!("delete leave request '{}'", request.id),
        })
    }
}

fn bumped(request: LeaveRequest) -> LeaveRequest {
    LeaveRequest {
        version: request.version + 1,
        ..request
    }
}
