//! Milestone engine: progress aggregation and automatic achievement

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::{LinkedTask, LinkedTaskStatus, Milestone, MilestoneStatus, TaskRef};
use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{ActorId, LinkedTaskId};

/// Who the automatic "achieved" activity entry is attributed to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementAttribution {
    /// The milestone's assignee
    #[default]
    Assignee,
    /// A dedicated system actor
    System,
}

const AUTO_ACHIEVED: &str = "auto-achieved";
const MANUALLY_MARKED: &str = "manually marked";
const FORCED: &str = "forced";

/// Maintains derived progress and lifecycle state of milestones
#[derive(Debug, Clone)]
pub struct MilestoneEngine {
    attribution: AchievementAttribution,
    system_actor: ActorId,
}

impl Default for MilestoneEngine {
    fn default() -> Self {
        Self::new(AchievementAttribution::default())
    }
}

impl MilestoneEngine {
    pub fn new(attribution: AchievementAttribution) -> Self {
        Self {
            attribution,
            system_actor: ActorId::system(),
        }
    }

    /// Use a custom id for system-attributed entries
    pub fn with_system_actor(mut self, system_actor: ActorId) -> Self {
        self.system_actor = system_actor;
        self
    }

    pub fn attribution(&self) -> AchievementAttribution {
        self.attribution
    }

    /// Rounded mean completion of `linked_tasks`, or 0 when there are none
    ///
    /// Halves round up, so 45.5 becomes 46.
    pub fn recompute_progress(linked_tasks: &[LinkedTask]) -> u8 {
        if linked_tasks.is_empty() {
            return 0;
        }
        let n = linked_tasks.len() as u64;
        let sum: u64 = linked_tasks
            .iter()
            .map(|t| u64::from(t.completion_percentage))
            .sum();
        // round(sum / n) for non-negative integers
        let rounded = (2 * sum + n) / (2 * n);
        rounded.min(100) as u8
    }

    /// Store the recomputed progress on the milestone
    ///
    /// Returns whether the stored value changed; an unchanged value is not written.
    pub fn apply_progress(milestone: &mut Milestone) -> bool {
        let progress = Self::recompute_progress(&milestone.linked_tasks);
        if progress == milestone.progress_percentage {
            return false;
        }
        milestone.progress_percentage = progress;
        true
    }

    /// Check a completion percentage supplied by a caller
    pub fn validate_percentage(completion_percentage: i32) -> DomainResult<u8> {
        u8::try_from(completion_percentage)
            .ok()
            .filter(|pct| *pct <= 100)
            .ok_or_else(|| {
                DomainError::validation(
                    "completion_percentage",
                    format!("{} is outside 0..=100", completion_percentage),
                )
            })
    }

    /// Achieve the milestone if progress reached 100 and it is still open
    ///
    /// Returns whether the transition fired. Never fires twice: an achieved or
    /// cancelled milestone is left alone.
    pub fn evaluate_auto_achievement(&self, milestone: &mut Milestone, at: DateTime<Utc>) -> bool {
        if milestone.progress_percentage < 100 || milestone.status.is_terminal() {
            return false;
        }

        let actor = match self.attribution {
            AchievementAttribution::Assignee => milestone.assigned_to.clone(),
            AchievementAttribution::System => self.system_actor.clone(),
        };

        milestone.status = MilestoneStatus::Achieved;
        milestone.achieved_at = Some(at);
        milestone.updated_at = at;
        milestone.activity.log_achieved(&actor, AUTO_ACHIEVED, at);

        tracing::info!(
            milestone_id = %milestone.id,
            actor = %actor,
            "Milestone auto-achieved"
        );
        true
    }

    /// Recompute progress and auto-achieve on the climb to 100
    ///
    /// A milestone already sitting at 100 (for example one a manager reopened)
    /// is not achieved again by an update that leaves progress at 100.
    fn refresh(&self, milestone: &mut Milestone, at: DateTime<Utc>) {
        let previous = milestone.progress_percentage;
        if Self::apply_progress(milestone) {
            tracing::debug!(
                milestone_id = %milestone.id,
                progress = milestone.progress_percentage,
                "Milestone progress recomputed"
            );
        }
        if previous < 100 {
            self.evaluate_auto_achievement(milestone, at);
        }
    }

    /// Attach a sub-task to the milestone
    pub fn link_task(
        &self,
        milestone: &mut Milestone,
        task: TaskRef,
        actor: &ActorId,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        if task.task_id.as_str().trim().is_empty() {
            return Err(DomainError::validation("task_id", "Task id cannot be empty"));
        }
        let completion_percentage = Self::validate_percentage(task.completion_percentage)?;

        if milestone.linked_task(&task.task_id).is_some() {
            return Err(DomainError::conflict(format!(
                "Task {} is already linked to milestone {}",
                task.task_id, milestone.id
            )));
        }

        milestone.activity.log_task_linked(actor, &task.task_id, &task.task_title, at);
        milestone.linked_tasks.push(LinkedTask {
            task_id: task.task_id,
            task_title: task.task_title,
            task_type: task.task_type,
            status: task.status,
            completion_percentage,
            linked_at: at,
        });
        milestone.updated_at = at;

        self.refresh(milestone, at);
        Ok(())
    }

    /// Detach a sub-task and return the removed record
    pub fn unlink_task(
        &self,
        milestone: &mut Milestone,
        task_id: &LinkedTaskId,
        actor: &ActorId,
        at: DateTime<Utc>,
    ) -> DomainResult<LinkedTask> {
        let position = milestone
            .linked_tasks
            .iter()
            .position(|t| &t.task_id == task_id)
            .ok_or_else(|| DomainError::not_found("LinkedTask", task_id.as_str()))?;

        let removed = milestone.linked_tasks.remove(position);
        milestone.activity.log_task_unlinked(actor, &removed.task_id, &removed.task_title, at);
        milestone.updated_at = at;

        self.refresh(milestone, at);
        Ok(removed)
    }

    /// Update a linked sub-task's status and completion
    pub fn update_linked_task_progress(
        &self,
        milestone: &mut Milestone,
        task_id: &LinkedTaskId,
        completion_percentage: i32,
        status: LinkedTaskStatus,
        actor: &ActorId,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let completion_percentage = Self::validate_percentage(completion_percentage)?;

        let task = milestone
            .linked_tasks
            .iter_mut()
            .find(|t| &t.task_id == task_id)
            .ok_or_else(|| DomainError::not_found("LinkedTask", task_id.as_str()))?;

        let previous = task.completion_percentage;
        task.completion_percentage = completion_percentage;
        task.status = status;
        let title = task.task_title.clone();

        if completion_percentage == 100 && previous < 100 {
            milestone.activity.log_task_completed(actor, task_id, &title, at);
        }
        milestone.updated_at = at;

        self.refresh(milestone, at);
        Ok(())
    }

    /// Mark the milestone achieved on request
    ///
    /// Without `forced`, progress must already be 100.
    pub fn mark_achieved(
        &self,
        milestone: &mut Milestone,
        actor: &ActorId,
        forced: bool,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        if !forced && milestone.progress_percentage < 100 {
            return Err(DomainError::precondition(format!(
                "Milestone {} is at {}%; achieving it requires 100% or force",
                milestone.id, milestone.progress_percentage
            )));
        }

        milestone.status = MilestoneStatus::Achieved;
        milestone.achieved_at.get_or_insert(at);
        milestone.updated_at = at;
        milestone.activity.log_achieved(actor, if forced { FORCED } else { MANUALLY_MARKED }, at);
        Ok(())
    }

    /// Write a non-achievement status
    ///
    /// Clears `achieved_at`. Achievement itself only happens through
    /// [`MilestoneEngine::mark_achieved`] or automatically. Returns whether the
    /// status changed.
    pub fn set_status(
        &self,
        milestone: &mut Milestone,
        status: MilestoneStatus,
        actor: &ActorId,
        at: DateTime<Utc>,
    ) -> DomainResult<bool> {
        if status == MilestoneStatus::Achieved {
            return Err(DomainError::validation(
                "status",
                "ACHIEVED can only be reached by achieving the milestone",
            ));
        }
        if status == milestone.status {
            return Ok(false);
        }

        let previous = milestone.status;
        milestone.status = status;
        milestone.achieved_at = None;
        milestone.updated_at = at;
        milestone.activity.log_status_changed(actor, previous.as_str(), status.as_str(), at);
        Ok(true)
    }
}
