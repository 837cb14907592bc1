//! Append-only activity feed owned by each aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ActorId, LinkedTaskId};

/// Activity feed entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// What happened
    pub action: ActivityAction,
    /// Who it is attributed to
    pub actor: ActorId,
    /// Human readable details
    pub details: String,
    /// When it happened
    pub timestamp: DateTime<Utc>,
    /// Additional context
    #[serde(default)]
    pub context: serde_json::Value,
}

/// Kind of action recorded in the feed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    /// Aggregate created
    Created,
    /// An approver decided
    DecisionRecorded,
    /// Sub-task linked to a milestone
    TaskLinked,
    /// Sub-task removed from a milestone
    TaskUnlinked,
    /// Sub-task reached 100%
    TaskCompleted,
    /// Milestone achieved, automatically or manually
    Achieved,
    /// Milestone status written outside of achievement
    StatusChanged,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Created => "created",
            ActivityAction::DecisionRecorded => "decision_recorded",
            ActivityAction::TaskLinked => "task_linked",
            ActivityAction::TaskUnlinked => "task_unlinked",
            ActivityAction::TaskCompleted => "task_completed",
            ActivityAction::Achieved => "achieved",
            ActivityAction::StatusChanged => "status_changed",
        }
    }
}

/// Append-only list of activity entries
///
/// Entries are never removed or rewritten; the only mutation is [`ActivityFeed::record`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityFeed {
    entries: Vec<ActivityEntry>,
}

impl ActivityFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn record(
        &mut self,
        action: ActivityAction,
        actor: &ActorId,
        details: impl Into<String>,
        context: serde_json::Value,
        at: DateTime<Utc>,
    ) {
        self.entries.push(ActivityEntry {
            action,
            actor: actor.clone(),
            details: details.into(),
            timestamp: at,
            context,
        });
    }

    pub(crate) fn log_created(&mut self, actor: &ActorId, title: &str, at: DateTime<Utc>) {
        self.record(
            ActivityAction::Created,
            actor,
            format!("'{}' created", title),
            serde_json::json!({ "title": title }),
            at,
        );
    }

    pub(crate) fn log_decision_recorded(
        &mut self,
        approver: &ActorId,
        decision: &str,
        comment: Option<&str>,
        at: DateTime<Utc>,
    ) {
        let details = match comment {
            Some(c) if !c.is_empty() => format!("{}: {}", decision, c),
            _ => decision.to_string(),
        };
        self.record(
            ActivityAction::DecisionRecorded,
            approver,
            details,
            serde_json::json!({ "decision": decision, "comment": comment }),
            at,
        );
    }

    pub(crate) fn log_task_linked(
        &mut self,
        actor: &ActorId,
        task_id: &LinkedTaskId,
        task_title: &str,
        at: DateTime<Utc>,
    ) {
        self.record(
            ActivityAction::TaskLinked,
            actor,
            format!("Task '{}' linked", task_title),
            serde_json::json!({ "task_id": task_id, "task_title": task_title }),
            at,
        );
    }

    pub(crate) fn log_task_unlinked(
        &mut self,
        actor: &ActorId,
        task_id: &LinkedTaskId,
        task_title: &str,
        at: DateTime<Utc>,
    ) {
        self.record(
            ActivityAction::TaskUnlinked,
            actor,
            format!("Task '{}' unlinked", task_title),
            serde_json::json!({ "task_id": task_id, "task_title": task_title }),
            at,
        );
    }

    pub(crate) fn log_task_completed(
        &mut self,
        actor: &ActorId,
        task_id: &LinkedTaskId,
        task_title: &str,
        at: DateTime<Utc>,
    ) {
        self.record(
            ActivityAction::TaskCompleted,
            actor,
            format!("Task '{}' completed", task_title),
            serde_json::json!({ "task_id": task_id, "task_title": task_title }),
            at,
        );
    }

    pub(crate) fn log_achieved(&mut self, actor: &ActorId, details: &str, at: DateTime<Utc>) {
        self.record(
            ActivityAction::Achieved,
            actor,
            details,
            serde_json::json!({}),
            at,
        );
    }

    pub(crate) fn log_status_changed(
        &mut self,
        actor: &ActorId,
        from: &str,
        to: &str,
        at: DateTime<Utc>,
    ) {
        self.record(
            ActivityAction::StatusChanged,
            actor,
            format!("{} -> {}", from, to),
            serde_json::json!({ "from": from, "to": to }),
            at,
        );
    }

    /// All entries in insertion order
    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    /// Entries of a single action kind
    pub fn entries_by_action(&self, action: ActivityAction) -> Vec<&ActivityEntry> {
        self.entries.iter().filter(|e| e.action == action).collect()
    }

    pub fn count_of(&self, action: ActivityAction) -> usize {
        self.entries.iter().filter(|e| e.action == action).count()
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&ActivityEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
