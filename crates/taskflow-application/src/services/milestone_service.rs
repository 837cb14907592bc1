//! Milestone Application Service
//!
//! Every mutating use case is one load, engine call, save cycle against a
//! single [`Milestone`]. A stale save surfaces as `Conflict`; retrying is
//! the caller's decision.

use std::sync::Arc;

use chrono::Utc;

use crate::dto::CreateMilestoneCommand;
use crate::errors::{ApplicationError, ApplicationResult};
use crate::rate_limit::RateLimiter;

use taskflow_domain::{
    Actor, ActorId, DomainResult, LinkedTaskId, LinkedTaskStatus, Milestone, MilestoneEngine,
    MilestoneId, MilestoneRepository, MilestoneStatus, TaskRef,
};

/// Milestone Application Service
pub struct MilestoneService<R>
where
    R: MilestoneRepository,
{
    repository: Arc<R>,
    engine: MilestoneEngine,
    rate_limiter: Arc<dyn RateLimiter>,
}

impl<R> MilestoneService<R>
where
    R: MilestoneRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        engine: MilestoneEngine,
        rate_limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            repository,
            engine,
            rate_limiter,
        }
    }

    pub fn engine(&self) -> &MilestoneEngine {
        &self.engine
    }

    /// Create and store a new milestone
    ///
    /// Only a milestone that validates is charged to the creator's budget.
    pub async fn create_milestone(
        &self,
        cmd: CreateMilestoneCommand,
        creator: &Actor,
    ) -> ApplicationResult<Milestone> {
        let milestone = Milestone::create(
            cmd.title,
            cmd.description,
            creator.id.clone(),
            ActorId::new(cmd.assigned_to),
            cmd.due_date,
            Utc::now(),
        )?;

        if !self.rate_limiter.try_acquire(&creator.id) {
            let err = ApplicationError::rate_limited(&creator.id);
            tracing::warn!(actor = %creator.id, error = %err, "Milestone creation throttled");
            return Err(err);
        }
        let saved = self.repository.save(&milestone).await?;

        tracing::info!(
            milestone_id = %saved.id(),
            actor = %creator.id,
            assignee = %saved.assigned_to(),
            "Milestone created"
        );
        Ok(saved)
    }

    /// Link a sub-task
    pub async fn link(
        &self,
        id: &MilestoneId,
        task: TaskRef,
        actor: &Actor,
    ) -> ApplicationResult<Milestone> {
        self.mutate(id, &actor.id, "link", |engine, m| {
            engine.link_task(m, task, &actor.id, Utc::now())?;
            Ok(true)
        })
        .await
    }

    /// Unlink a sub-task
    pub async fn unlink(
        &self,
        id: &MilestoneId,
        task_id: &LinkedTaskId,
        actor: &Actor,
    ) -> ApplicationResult<Milestone> {
        self.mutate(id, &actor.id, "unlink", |engine, m| {
            engine.unlink_task(m, task_id, &actor.id, Utc::now())?;
            Ok(true)
        })
        .await
    }

    /// Report a linked sub-task's completion and status
    pub async fn update_link_progress(
        &self,
        id: &MilestoneId,
        task_id: &LinkedTaskId,
        completion_percentage: i32,
        status: LinkedTaskStatus,
        actor: &Actor,
    ) -> ApplicationResult<Milestone> {
        self.mutate(id, &actor.id, "update_link_progress", |engine, m| {
            engine.update_linked_task_progress(
                m,
                task_id,
                completion_percentage,
                status,
                &actor.id,
                Utc::now(),
            )?;
            Ok(true)
        })
        .await
    }

    /// Mark achieved; `forced` skips the 100% requirement
    pub async fn achieve(
        &self,
        id: &MilestoneId,
        actor: &Actor,
        forced: bool,
    ) -> ApplicationResult<Milestone> {
        self.mutate(id, &actor.id, "achieve", |engine, m| {
            engine.mark_achieved(m, &actor.id, forced, Utc::now())?;
            Ok(true)
        })
        .await
    }

    /// Move to a non-achievement status; unchanged status is not saved
    pub async fn set_status(
        &self,
        id: &MilestoneId,
        status: MilestoneStatus,
        actor: &Actor,
    ) -> ApplicationResult<Milestone> {
        self.mutate(id, &actor.id, "set_status", |engine, m| {
            engine.set_status(m, status, &actor.id, Utc::now())
        })
        .await
    }

    /// Get milestone by ID
    pub async fn get_milestone(&self, id: &MilestoneId) -> ApplicationResult<Milestone> {
        tracing::debug!(milestone_id = %id, "Loading milestone");
        Ok(self.repository.load(id).await?)
    }

    /// List all milestones
    pub async fn list_milestones(&self) -> ApplicationResult<Vec<Milestone>> {
        Ok(self.repository.find_all().await?)
    }

    /// Milestones past their due date and not yet achieved or cancelled
    pub async fn list_overdue(&self) -> ApplicationResult<Vec<Milestone>> {
        let now = Utc::now();
        let milestones = self.repository.find_all().await?;
        Ok(milestones.into_iter().filter(|m| m.is_overdue(now)).collect())
    }

    /// Delete the milestone together with its linked tasks and activity
    pub async fn delete_milestone(&self, id: &MilestoneId) -> ApplicationResult<()> {
        self.repository.delete(id).await?;
        tracing::info!(milestone_id = %id, "Milestone deleted");
        Ok(())
    }

    /// Load, apply, save. `apply` returns false when there is nothing to persist.
    async fn mutate<F>(
        &self,
        id: &MilestoneId,
        actor: &ActorId,
        operation: &'static str,
        apply: F,
    ) -> ApplicationResult<Milestone>
    where
        F: FnOnce(&MilestoneEngine, &mut Milestone) -> DomainResult<bool> + Send,
    {
        let result = self.apply_and_save(id, apply).await;

        match &result {
            Ok(m) => tracing::info!(
                milestone_id = %id,
                actor = %actor,
                operation,
                progress = m.progress_percentage(),
                status = m.status().as_str(),
                version = m.version(),
                "Milestone updated"
            ),
            Err(err) if err.is_rejection() => tracing::warn!(
                milestone_id = %id,
                actor = %actor,
                operation,
                error = %err,
                "Milestone operation rejected"
            ),
            Err(err) => tracing::debug!(
                milestone_id = %id,
                operation,
                error = %err,
                "Milestone operation failed"
            ),
        }
        result
    }

    async fn apply_and_save<F>(&self, id: &MilestoneId, apply: F) -> ApplicationResult<Milestone>
    where
        F: FnOnce(&MilestoneEngine, &mut Milestone) -> DomainResult<bool> + Send,
    {
        let mut milestone = self.repository.load(id).await?;
        if !apply(&self.engine, &mut milestone)? {
            return Ok(milestone);
        }
        Ok(self.repository.save(&milestone).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::{TokenBucketRateLimiter, UnlimitedRateLimiter};
    use chrono::Duration;
    use taskflow_domain::{ActivityAction, AchievementAttribution, ErrorKind, Role};
    use taskflow_persistence::InMemoryMilestoneRepository;

    fn service_with(engine: MilestoneEngine) -> MilestoneService<InMemoryMilestoneRepository> {
        MilestoneService::new(
            Arc::new(InMemoryMilestoneRepository::new()),
            engine,
            Arc::new(UnlimitedRateLimiter),
        )
    }

    fn service() -> MilestoneService<InMemoryMilestoneRepository> {
        service_with(MilestoneEngine::default())
    }

    fn pm() -> Actor {
        Actor::new("pm", Role::Manager)
    }

    fn command() -> CreateMilestoneCommand {
        CreateMilestoneCommand {
            title: "Beta launch".to_string(),
            description: String::new(),
            assigned_to: "dev".to_string(),
            due_date: None,
        }
    }

    #[tokio::test]
    async fn test_link_and_progress_persist() {
        let service = service();
        let m = service.create_milestone(command(), &pm()).await.unwrap();

        service
            .link(&m.id(), TaskRef::new("t1", "Design").with_completion(50), &pm())
            .await
            .unwrap();
        let m = service
            .link(&m.id(), TaskRef::new("t2", "Build").with_completion(50), &pm())
            .await
            .unwrap();
        assert_eq!(m.progress_percentage(), 50);
        assert_eq!(m.version(), 3);

        let m = service
            .update_link_progress(&m.id(), &"t1".into(), 100, LinkedTaskStatus::Completed, &pm())
            .await
            .unwrap();
        assert_eq!(m.progress_percentage(), 75);
        assert_eq!(service.get_milestone(&m.id()).await.unwrap(), m);
    }

    #[tokio::test]
    async fn test_auto_achievement_uses_configured_attribution() {
        let engine = MilestoneEngine::new(AchievementAttribution::System)
            .with_system_actor(ActorId::new("bot"));
        let service = service_with(engine);
        let m = service.create_milestone(command(), &pm()).await.unwrap();

        let m = service
            .link(&m.id(), TaskRef::new("t1", "Only").with_completion(100), &pm())
            .await
            .unwrap();
        assert_eq!(m.status(), MilestoneStatus::Achieved);

        let achieved = m.activity().latest().unwrap();
        assert_eq!(achieved.action, ActivityAction::Achieved);
        assert_eq!(achieved.actor, ActorId::new("bot"));
    }

    #[tokio::test]
    async fn test_reopened_milestone_is_not_achieved_again() {
        let service = service();
        let m = service.create_milestone(command(), &pm()).await.unwrap();
        service
            .link(&m.id(), TaskRef::new("t1", "Only").with_completion(100), &pm())
            .await
            .unwrap();
        service
            .set_status(&m.id(), MilestoneStatus::InProgress, &pm())
            .await
            .unwrap();

        let m = service
            .update_link_progress(&m.id(), &"t1".into(), 100, LinkedTaskStatus::Completed, &pm())
            .await
            .unwrap();
        assert_eq!(m.status(), MilestoneStatus::InProgress);
        assert_eq!(m.activity().count_of(ActivityAction::Achieved), 1);
    }

    #[tokio::test]
    async fn test_invalid_create_does_not_spend_budget() {
        let service = MilestoneService::new(
            Arc::new(InMemoryMilestoneRepository::new()),
            MilestoneEngine::default(),
            Arc::new(TokenBucketRateLimiter::new(1, 1)),
        );
        let mut blank = command();
        blank.title = String::new();
        let err = service.create_milestone(blank, &pm()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        service.create_milestone(command(), &pm()).await.unwrap();
        let err = service.create_milestone(command(), &pm()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimited);
    }

    #[tokio::test]
    async fn test_invalid_percentage_is_rejected_without_write() {
        let service = service();
        let m = service.create_milestone(command(), &pm()).await.unwrap();
        let m = service
            .link(&m.id(), TaskRef::new("t1", "Design"), &pm())
            .await
            .unwrap();

        let err = service
            .update_link_progress(&m.id(), &"t1".into(), 101, LinkedTaskStatus::InProgress, &pm())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(service.get_milestone(&m.id()).await.unwrap().version(), m.version());
    }

    #[tokio::test]
    async fn test_achieve_requires_force_below_full() {
        let service = service();
        let m = service.create_milestone(command(), &pm()).await.unwrap();
        service
            .link(&m.id(), TaskRef::new("t1", "Design").with_completion(40), &pm())
            .await
            .unwrap();

        let err = service.achieve(&m.id(), &pm(), false).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);

        let m = service.achieve(&m.id(), &pm(), true).await.unwrap();
        assert_eq!(m.status(), MilestoneStatus::Achieved);
        assert!(m.achieved_at().is_some());
    }

    #[tokio::test]
    async fn test_set_status_unchanged_skips_save() {
        let service = service();
        let m = service.create_milestone(command(), &pm()).await.unwrap();

        let same = service.set_status(&m.id(), MilestoneStatus::Open, &pm()).await.unwrap();
        assert_eq!(same.version(), m.version());

        let moved = service
            .set_status(&m.id(), MilestoneStatus::InProgress, &pm())
            .await
            .unwrap();
        assert_eq!(moved.version(), m.version() + 1);
        assert_eq!(moved.activity().count_of(ActivityAction::StatusChanged), 1);
    }

    #[tokio::test]
    async fn test_unlink_missing_is_not_found() {
        let service = service();
        let m = service.create_milestone(command(), &pm()).await.unwrap();
        let err = service.unlink(&m.id(), &"nope".into(), &pm()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_overdue() {
        let service = service();
        let mut cmd = command();
        cmd.due_date = Some(Utc::now() - Duration::days(1));
        let late = service.create_milestone(cmd, &pm()).await.unwrap();
        service.create_milestone(command(), &pm()).await.unwrap();

        let overdue = service.list_overdue().await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id(), late.id());
    }

    #[tokio::test]
    async fn test_operations_on_missing_milestone() {
        let service = service();
        let err = service
            .link(&MilestoneId::new(), TaskRef::new("t", "T"), &pm())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
