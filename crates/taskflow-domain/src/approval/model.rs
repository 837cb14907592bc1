//! Approval task aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::engine::ApprovalEngine;
use crate::activity::ActivityFeed;
use crate::actor::Role;
use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{ActorId, ApprovalTaskId, Priority};

/// An individual approver's decision state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionStatus {
    Pending,
    Approved,
    Rejected,
}

/// A decision an approver can submit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Rejected => "rejected",
        }
    }
}

impl From<Decision> for DecisionStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => DecisionStatus::Approved,
            Decision::Rejected => DecisionStatus::Rejected,
        }
    }
}

/// Policy combining individual decisions into one outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalMode {
    /// One approval is enough
    Any,
    /// Everybody has to approve
    All,
    /// Everybody has to approve, one after another in list order
    Sequential,
}

/// Derived outcome of an approval task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Pending,
    Approved,
    Rejected,
    Waiting,
}

/// A participant whose decision contributes to the task outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approver {
    pub id: ActorId,
    pub display_name: String,
    pub role: Role,
    pub decision_status: DecisionStatus,
    pub comment: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl Approver {
    /// Create an approver that has not decided yet
    pub fn new(id: impl Into<ActorId>, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            role,
            decision_status: DecisionStatus::Pending,
            comment: None,
            decided_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.decision_status == DecisionStatus::Pending
    }

    pub fn is_approved(&self) -> bool {
        self.decision_status == DecisionStatus::Approved
    }

    pub fn is_rejected(&self) -> bool {
        self.decision_status == DecisionStatus::Rejected
    }
}

/// Approval task aggregate root
///
/// `overall_status` is never written directly: it is recomputed from the
/// approver list by [`ApprovalEngine::derive_status`] after every mutation,
/// and again when the aggregate is reconstituted from storage. For the same
/// reason the aggregate only implements `Serialize`; loading goes through
/// [`ApprovalTask::reconstitute`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalTask {
    pub(crate) id: ApprovalTaskId,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) mode: ApprovalMode,
    pub(crate) approvers: Vec<Approver>,
    pub(crate) overall_status: OverallStatus,
    pub(crate) priority: Priority,
    pub(crate) due_date: Option<DateTime<Utc>>,
    pub(crate) creator: ActorId,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) activity: ActivityFeed,
    /// Concurrency version for optimistic locking
    pub(crate) version: u64,
}

impl ApprovalTask {
    /// Create a new approval task
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        title: String,
        description: String,
        mode: ApprovalMode,
        approvers: Vec<Approver>,
        priority: Priority,
        due_date: Option<DateTime<Utc>>,
        creator: ActorId,
        at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(DomainError::validation(
                "title",
                "Approval task title cannot be empty",
            ));
        }

        for (idx, approver) in approvers.iter().enumerate() {
            if approver.id.is_empty() {
                return Err(DomainError::validation(
                    "approvers",
                    format!("Approver at position {} has an empty id", idx),
                ));
            }
            if approvers[..idx].iter().any(|a| a.id == approver.id) {
                return Err(DomainError::validation(
                    "approvers",
                    format!("Approver '{}' listed more than once", approver.id),
                ));
            }
            let undecided = approver.decision_status == DecisionStatus::Pending
                && approver.comment.is_none()
                && approver.decided_at.is_none();
            if !undecided {
                return Err(DomainError::validation(
                    "approvers",
                    format!("Approver '{}' already carries a decision", approver.id),
                ));
            }
        }

        let overall_status = ApprovalEngine::derive_status(&approvers, mode);
        let mut activity = ActivityFeed::new();
        activity.log_created(&creator, &title, at);

        Ok(Self {
            id: ApprovalTaskId::new(),
            title,
            description,
            mode,
            approvers,
            overall_status,
            priority,
            due_date,
            creator,
            created_at: at,
            updated_at: at,
            activity,
            version: 0,
        })
    }

    /// Reconstitute an approval task from persistence
    ///
    /// The overall status is derived again rather than trusted from storage.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: ApprovalTaskId,
        title: String,
        description: String,
        mode: ApprovalMode,
        approvers: Vec<Approver>,
        priority: Priority,
        due_date: Option<DateTime<Utc>>,
        creator: ActorId,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        activity: ActivityFeed,
        version: u64,
    ) -> Self {
        let overall_status = ApprovalEngine::derive_status(&approvers, mode);
        Self {
            id,
            title,
            description,
            mode,
            approvers,
            overall_status,
            priority,
            due_date,
            creator,
            created_at,
            updated_at,
            activity,
            version,
        }
    }

    pub fn id(&self) -> ApprovalTaskId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn mode(&self) -> ApprovalMode {
        self.mode
    }

    pub fn approvers(&self) -> &[Approver] {
        &self.approvers
    }

    /// Look up an approver by id
    pub fn approver(&self, id: &ActorId) -> Option<&Approver> {
        self.approvers.iter().find(|a| &a.id == id)
    }

    pub fn overall_status(&self) -> OverallStatus {
        self.overall_status
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    pub fn creator(&self) -> &ActorId {
        &self.creator
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

    /// Number of approvers in each decision state: (pending, approved, rejected)
    pub fn decision_counts(&self) -> (usize, usize, usize) {
        self.approvers
            .iter()
            .fold((0, 0, 0), |(p, a, r), approver| match approver.decision_status {
                DecisionStatus::Pending => (p + 1, a, r),
                DecisionStatus::Approved => (p, a + 1, r),
                DecisionStatus::Rejected => (p, a, r + 1),
            })
    }
}
