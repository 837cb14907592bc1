//! Application Services
//!
//! Services orchestrate use cases by coordinating aggregates and the
//! repositories that store them. They hold no mutable state of their own.

mod approval_service;
mod milestone_service;

pub use approval_service::ApprovalService;
pub use milestone_service::MilestoneService;

use std::sync::Arc;

use taskflow_config::EngineConfig;
use taskflow_domain::{ApprovalTaskRepository, MilestoneRepository};

use crate::rate_limit;

/// Both services wired from one [`EngineConfig`]
///
/// The services share a single rate limiter, so an actor's creation budget
/// covers approval tasks and milestones together.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskflow_application::{CreateMilestoneCommand, TaskflowServices};
/// use taskflow_config::EngineConfig;
/// use taskflow_domain::{Actor, Role, TaskRef};
/// use taskflow_persistence::{InMemoryApprovalTaskRepository, InMemoryMilestoneRepository};
///
/// # tokio_test::block_on(async {
/// let services = TaskflowServices::from_config(
///     &EngineConfig::default(),
///     Arc::new(InMemoryApprovalTaskRepository::new()),
///     Arc::new(InMemoryMilestoneRepository::new()),
/// );
/// let pm = Actor::new("pm", Role::Manager);
/// let cmd = CreateMilestoneCommand {
///     title: "Launch".into(),
///     description: String::new(),
///     assigned_to: "dev".into(),
///     due_date: None,
/// };
/// let milestone = services.milestones.create_milestone(cmd, &pm).await.unwrap();
/// let milestone = services
///     .milestones
///     .link(&milestone.id(), TaskRef::new("t1", "Ship it").with_completion(60), &pm)
///     .await
///     .unwrap();
/// assert_eq!(milestone.progress_percentage(), 60);
/// # });
/// ```
pub struct TaskflowServices<AR, MR>
where
    AR: ApprovalTaskRepository,
    MR: MilestoneRepository,
{
    pub approvals: ApprovalService<AR>,
    pub milestones: MilestoneService<MR>,
}

impl<AR, MR> TaskflowServices<AR, MR>
where
    AR: ApprovalTaskRepository + 'static,
    MR: MilestoneRepository + 'static,
{
    pub fn from_config(
        config: &EngineConfig,
        approval_repository: Arc<AR>,
        milestone_repository: Arc<MR>,
    ) -> Self {
        let limiter = rate_limit::from_config(&config.rate_limit);
        tracing::debug!(
            attribution = ?config.achievement_attribution,
            rate_limited = config.rate_limit.enabled,
            "Wiring taskflow services"
        );
        Self {
            approvals: ApprovalService::new(approval_repository, Arc::clone(&limiter)),
            milestones: MilestoneService::new(
                milestone_repository,
                config.milestone_engine(),
                limiter,
            ),
        }
    }
}
