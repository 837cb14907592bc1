//! Milestone aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::engine::MilestoneEngine;
use crate::activity::ActivityFeed;
use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{ActorId, LinkedTaskId, MilestoneId};

/// Milestone lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MilestoneStatus {
    Open,
    InProgress,
    Achieved,
    Cancelled,
}

impl MilestoneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneStatus::Open => "OPEN",
            MilestoneStatus::InProgress => "INPROGRESS",
            MilestoneStatus::Achieved => "ACHIEVED",
            MilestoneStatus::Cancelled => "CANCELLED",
        }
    }

    /// Achieved and cancelled milestones never auto-transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, MilestoneStatus::Achieved | MilestoneStatus::Cancelled)
    }
}

/// Status of a linked sub-task as reported by its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkedTaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

/// A sub-task attached to a milestone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedTask {
    pub task_id: LinkedTaskId,
    pub task_title: String,
    pub task_type: String,
    pub status: LinkedTaskStatus,
    /// Always within 0..=100
    pub completion_percentage: u8,
    pub linked_at: DateTime<Utc>,
}

/// Caller-supplied reference used to link a sub-task
///
/// `completion_percentage` is unvalidated input and is checked when linking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRef {
    pub task_id: LinkedTaskId,
    pub task_title: String,
    #[serde(default = "default_task_type")]
    pub task_type: String,
    #[serde(default = "default_task_status")]
    pub status: LinkedTaskStatus,
    #[serde(default)]
    pub completion_percentage: i32,
}

fn default_task_type() -> String {
    "task".to_string()
}

fn default_task_status() -> LinkedTaskStatus {
    LinkedTaskStatus::Pending
}

impl TaskRef {
    /// Reference to a fresh sub-task at 0% completion
    pub fn new(task_id: impl Into<String>, task_title: impl Into<String>) -> Self {
        Self {
            task_id: LinkedTaskId::new(task_id),
            task_title: task_title.into(),
            task_type: default_task_type(),
            status: default_task_status(),
            completion_percentage: 0,
        }
    }

    pub fn with_completion(mut self, completion_percentage: i32) -> Self {
        self.completion_percentage = completion_percentage;
        self
    }

    pub fn with_status(mut self, status: LinkedTaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = task_type.into();
        self
    }
}

/// Milestone aggregate root
///
/// `progress_percentage` is derived from `linked_tasks` and `achieved_at` is
/// set exactly while `status` is `Achieved`. Only the [`MilestoneEngine`]
/// mutates a milestone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Milestone {
    pub(crate) id: MilestoneId,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) creator: ActorId,
    pub(crate) assigned_to: ActorId,
    pub(crate) status: MilestoneStatus,
    pub(crate) linked_tasks: Vec<LinkedTask>,
    pub(crate) progress_percentage: u8,
    pub(crate) due_date: Option<DateTime<Utc>>,
    pub(crate) achieved_at: Option<DateTime<Utc>>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) activity: ActivityFeed,
    /// Concurrency version for optimistic locking
    pub(crate) version: u64,
}

impl Milestone {
    /// Create a new open milestone with no linked tasks
    pub fn create(
        title: String,
        description: String,
        creator: ActorId,
        assigned_to: ActorId,
        due_date: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(DomainError::validation(
                "title",
                "Milestone title cannot be empty",
            ));
        }
        if assigned_to.is_empty() {
            return Err(DomainError::validation(
                "assigned_to",
                "Milestone must be assigned to someone",
            ));
        }

        let mut activity = ActivityFeed::new();
        activity.log_created(&creator, &title, at);

        Ok(Self {
            id: MilestoneId::new(),
            title,
            description,
            creator,
            assigned_to,
            status: MilestoneStatus::Open,
            linked_tasks: Vec::new(),
            progress_percentage: 0,
            due_date,
            achieved_at: None,
            created_at: at,
            updated_at: at,
            activity,
            version: 0,
        })
    }

    /// Reconstitute a milestone from persistence
    ///
    /// Progress is derived again from the linked tasks, and a stored
    /// `achieved_at` is dropped unless the status is `Achieved`.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: MilestoneId,
        title: String,
        description: String,
        creator: ActorId,
        assigned_to: ActorId,
        status: MilestoneStatus,
        linked_tasks: Vec<LinkedTask>,
        due_date: Option<DateTime<Utc>>,
        achieved_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        activity: ActivityFeed,
        version: u64,
    ) -> Self {
        let progress_percentage = MilestoneEngine::recompute_progress(&linked_tasks);
        let achieved_at = if status == MilestoneStatus::Achieved {
            achieved_at
        } else {
            None
        };
        Self {
            id,
            title,
            description,
            creator,
            assigned_to,
            status,
            linked_tasks,
            progress_percentage,
            due_date,
            achieved_at,
            created_at,
            updated_at,
            activity,
            version,
        }
    }

    pub fn id(&self) -> MilestoneId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn creator(&self) -> &ActorId {
        &self.creator
    }

    pub fn assigned_to(&self) -> &ActorId {
        &self.assigned_to
    }

    pub fn status(&self) -> MilestoneStatus {
        self.status
    }

    pub fn linked_tasks(&self) -> &[LinkedTask] {
        &self.linked_tasks
    }

    /// Look up a linked task by id
    pub fn linked_task(&self, task_id: &LinkedTaskId) -> Option<&LinkedTask> {
        self.linked_tasks.iter().find(|t| &t.task_id == task_id)
    }

    pub fn progress_percentage(&self) -> u8 {
        self.progress_percentage
    }

    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    pub fn achieved_at(&self) -> Option<DateTime<Utc>> {
        self.achieved_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn activity(&self) -> &ActivityFeed {
        &self.activity
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the milestone is past due and not yet achieved or cancelled
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_terminal() && self.due_date.is_some_and(|due| due < now)
    }
}
