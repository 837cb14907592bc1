//! Approval engine: combines approver decisions under an approval mode

use chrono::{DateTime, Utc};

use super::model::{ApprovalMode, ApprovalTask, Approver, Decision, OverallStatus};
use crate::errors::{DomainError, DomainResult};
use crate::value_objects::ActorId;

/// Stateless approval policy engine
pub struct ApprovalEngine;

impl ApprovalEngine {
    /// Derive the overall status of an approver list under `mode`
    ///
    /// An empty approver list is `Waiting` in every mode.
    pub fn derive_status(approvers: &[Approver], mode: ApprovalMode) -> OverallStatus {
        if approvers.is_empty() {
            return OverallStatus::Waiting;
        }

        match mode {
            ApprovalMode::All | ApprovalMode::Sequential => {
                if approvers.iter().any(Approver::is_rejected) {
                    OverallStatus::Rejected
                } else if approvers.iter().all(Approver::is_approved) {
                    OverallStatus::Approved
                } else {
                    OverallStatus::Pending
                }
            }
            // Rejections do not count here: a single approval wins.
            ApprovalMode::Any => {
                if approvers.iter().any(Approver::is_approved) {
                    OverallStatus::Approved
                } else if approvers.iter().any(Approver::is_pending) {
                    OverallStatus::Pending
                } else {
                    OverallStatus::Waiting
                }
            }
        }
    }

    /// Whether `approver_id` may submit a decision right now
    pub fn can_act(task: &ApprovalTask, approver_id: &ActorId) -> bool {
        let Some(position) = task.approvers.iter().position(|a| &a.id == approver_id) else {
            return false;
        };
        Self::can_act_at(&task.approvers, task.mode, position)
    }

    fn can_act_at(approvers: &[Approver], mode: ApprovalMode, position: usize) -> bool {
        if !approvers[position].is_pending() {
            return false;
        }
        match mode {
            ApprovalMode::Sequential => approvers[..position].iter().all(Approver::is_approved),
            ApprovalMode::Any | ApprovalMode::All => true,
        }
    }

    /// The approver whose turn it is under sequential mode
    ///
    /// Returns `None` when the chain is complete, blocked by a rejection, or
    /// the task is not sequential.
    pub fn current_turn(task: &ApprovalTask) -> Option<&Approver> {
        if task.mode != ApprovalMode::Sequential {
            return None;
        }
        task.approvers
            .iter()
            .find(|a| !a.is_approved())
            .filter(|a| a.is_pending())
    }

    /// Approvers that have not decided yet and are allowed to act
    pub fn actionable_approvers(task: &ApprovalTask) -> Vec<&Approver> {
        (0..task.approvers.len())
            .filter(|&idx| Self::can_act_at(&task.approvers, task.mode, idx))
            .map(|idx| &task.approvers[idx])
            .collect()
    }

    /// Approvers that have not decided yet, regardless of turn order
    pub fn pending_approvers(task: &ApprovalTask) -> Vec<&Approver> {
        task.approvers.iter().filter(|a| a.is_pending()).collect()
    }

    /// Record one approver's decision and recompute the overall status
    ///
    /// Fails with `NotFound` for an unknown approver and `Permission` when the
    /// approver has already decided or, under sequential mode, it is not yet
    /// their turn. On failure the task is left untouched.
    pub fn record_decision(
        task: &mut ApprovalTask,
        approver_id: &ActorId,
        decision: Decision,
        comment: Option<String>,
        at: DateTime<Utc>,
    ) -> DomainResult<OverallStatus> {
        let position = task
            .approvers
            .iter()
            .position(|a| &a.id == approver_id)
            .ok_or_else(|| DomainError::not_found("Approver", approver_id.as_str()))?;

        if !task.approvers[position].is_pending() {
            return Err(DomainError::permission(format!(
                "Approver '{}' has already decided on task {}",
                approver_id, task.id
            )));
        }

        if !Self::can_act_at(&task.approvers, task.mode, position) {
            return Err(DomainError::permission(format!(
                "Approver '{}' must wait for earlier approvers on task {}",
                approver_id, task.id
            )));
        }

        let comment = comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let approver = &mut task.approvers[position];
        approver.decision_status = decision.into();
        approver.comment = comment.clone();
        approver.decided_at = Some(at);

        let previous = task.overall_status;
        task.overall_status = Self::derive_status(&task.approvers, task.mode);
        task.updated_at = at;
        task.activity.log_decision_recorded(approver_id, decision.as_str(), comment.as_deref(), at);

        tracing::debug!(
            task_id = %task.id,
            approver = %approver_id,
            decision = decision.as_str(),
            from = ?previous,
            to = ?task.overall_status,
            "Approval decision recorded"
        );

        Ok(task.overall_status)
    }
}
