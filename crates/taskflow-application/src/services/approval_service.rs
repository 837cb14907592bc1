//! Approval Application Service
//!
//! Runs approval-chain use cases as load, decide, save against one
//! [`ApprovalTask`] at a time.

use std::sync::Arc;

use chrono::Utc;

use crate::dto::CreateApprovalTaskCommand;
use crate::errors::{ApplicationError, ApplicationResult};
use crate::rate_limit::RateLimiter;

use taskflow_domain::{
    Actor, ActorId, ApprovalEngine, ApprovalTask, ApprovalTaskId, ApprovalTaskRepository,
    Approver, Decision, DomainResult,
};

/// Approval Application Service
///
/// Stateless apart from the injected collaborators.
pub struct ApprovalService<R>
where
    R: ApprovalTaskRepository,
{
    repository: Arc<R>,
    rate_limiter: Arc<dyn RateLimiter>,
}

impl<R> ApprovalService<R>
where
    R: ApprovalTaskRepository + 'static,
{
    pub fn new(repository: Arc<R>, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            repository,
            rate_limiter,
        }
    }

    /// Create and store a new approval task
    ///
    /// The creator's rate-limit budget is only charged for a command that
    /// validates.
    pub async fn create_approval_task(
        &self,
        cmd: CreateApprovalTaskCommand,
        creator: &Actor,
    ) -> ApplicationResult<ApprovalTask> {
        let approvers = cmd
            .approvers
            .into_iter()
            .map(|a| a.into_approver())
            .collect::<DomainResult<Vec<Approver>>>()?;

        let task = ApprovalTask::create(
            cmd.title,
            cmd.description,
            cmd.mode,
            approvers,
            cmd.priority,
            cmd.due_date,
            creator.id.clone(),
            Utc::now(),
        )?;

        if !self.rate_limiter.try_acquire(&creator.id) {
            let err = ApplicationError::rate_limited(&creator.id);
            tracing::warn!(actor = %creator.id, error = %err, "Approval task creation throttled");
            return Err(err);
        }
        let saved = self.repository.save(&task).await?;

        tracing::info!(
            task_id = %saved.id(),
            actor = %creator.id,
            mode = ?saved.mode(),
            approvers = saved.approvers().len(),
            "Approval task created"
        );
        Ok(saved)
    }

    /// Record one approver's decision
    ///
    /// The approver acts as themselves; there is no delegation.
    pub async fn decide(
        &self,
        task_id: &ApprovalTaskId,
        approver_id: &ActorId,
        decision: Decision,
        comment: Option<String>,
    ) -> ApplicationResult<ApprovalTask> {
        let result = self.try_decide(task_id, approver_id, decision, comment).await;
        match &result {
            Ok(task) => tracing::info!(
                task_id = %task_id,
                actor = %approver_id,
                decision = decision.as_str(),
                status = ?task.overall_status(),
                "Decision recorded"
            ),
            Err(err) if err.is_rejection() => tracing::warn!(
                task_id = %task_id,
                actor = %approver_id,
                error = %err,
                "Decision rejected"
            ),
            Err(err) => tracing::debug!(task_id = %task_id, error = %err, "Decision failed"),
        }
        result
    }

    async fn try_decide(
        &self,
        task_id: &ApprovalTaskId,
        approver_id: &ActorId,
        decision: Decision,
        comment: Option<String>,
    ) -> ApplicationResult<ApprovalTask> {
        let mut task = self.repository.load(task_id).await?;
        ApprovalEngine::record_decision(&mut task, approver_id, decision, comment, Utc::now())?;
        Ok(self.repository.save(&task).await?)
    }

    /// Get approval task by ID
    pub async fn get_approval_task(&self, id: &ApprovalTaskId) -> ApplicationResult<ApprovalTask> {
        tracing::debug!(task_id = %id, "Loading approval task");
        Ok(self.repository.load(id).await?)
    }

    /// List all approval tasks
    pub async fn list_approval_tasks(&self) -> ApplicationResult<Vec<ApprovalTask>> {
        Ok(self.repository.find_all().await?)
    }

    /// Tasks on which `approver` may act right now
    pub async fn list_actionable_for(
        &self,
        approver: &ActorId,
    ) -> ApplicationResult<Vec<ApprovalTask>> {
        let tasks = self.repository.find_all().await?;
        Ok(tasks
            .into_iter()
            .filter(|t| ApprovalEngine::can_act(t, approver))
            .collect())
    }

    /// Next approver under sequential mode, if any
    pub async fn current_turn(&self, id: &ApprovalTaskId) -> ApplicationResult<Option<Approver>> {
        let task = self.repository.load(id).await?;
        Ok(ApprovalEngine::current_turn(&task).cloned())
    }

    /// Delete the task together with its approvers and activity
    pub async fn delete_approval_task(&self, id: &ApprovalTaskId) -> ApplicationResult<()> {
        self.repository.delete(id).await?;
        tracing::info!(task_id = %id, "Approval task deleted");
        Ok(())
    }
}
