//! Repository interfaces for aggregate persistence
//!
//! Implementations live in infrastructure crates. Every implementation must
//! make `save` a conditional write: it succeeds only when the stored version
//! equals the version the caller loaded, and fails with
//! [`DomainError::Conflict`] otherwise. Callers decide whether to retry.

use async_trait::async_trait;

use crate::{
    approval::ApprovalTask,
    errors::*,
    milestone::Milestone,
    value_objects::{ApprovalTaskId, MilestoneId},
};

/// An aggregate carrying an optimistic-concurrency version
pub trait Versioned {
    /// Name used in error messages
    const ENTITY_TYPE: &'static str;

    /// Version the aggregate was loaded at; 0 for a never-stored aggregate
    fn version(&self) -> u64;

    /// Called by repositories after a successful conditional write
    fn set_version(&mut self, version: u64);
}

impl Versioned for ApprovalTask {
    const ENTITY_TYPE: &'static str = "ApprovalTask";

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

impl Versioned for Milestone {
    const ENTITY_TYPE: &'static str = "Milestone";

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

/// Repository for approval task aggregates
#[async_trait]
pub trait ApprovalTaskRepository: Send + Sync {
    /// Conditionally save a task, returning it at its new version
    async fn save(&self, task: &ApprovalTask) -> DomainResult<ApprovalTask>;

    /// Find task by ID
    async fn find_by_id(&self, id: &ApprovalTaskId) -> DomainResult<Option<ApprovalTask>>;

    /// Find all tasks
    async fn find_all(&self) -> DomainResult<Vec<ApprovalTask>>;

    /// Delete the whole aggregate; deleting a missing task succeeds
    async fn delete(&self, id: &ApprovalTaskId) -> DomainResult<()>;

    /// Check if task exists
    async fn exists(&self, id: &ApprovalTaskId) -> DomainResult<bool>;

    /// Load a task, failing with `NotFound` when absent
    async fn load(&self, id: &ApprovalTaskId) -> DomainResult<ApprovalTask> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(ApprovalTask::ENTITY_TYPE, id.to_string()))
    }
}

/// Repository for milestone aggregates
#[async_trait]
pub trait MilestoneRepository: Send + Sync {
    /// Conditionally save a milestone, returning it at its new version
    async fn save(&self, milestone: &Milestone) -> DomainResult<Milestone>;

    /// Find milestone by ID
    async fn find_by_id(&self, id: &MilestoneId) -> DomainResult<Option<Milestone>>;

    /// Find all milestones
    async fn find_all(&self) -> DomainResult<Vec<Milestone>>;

    /// Delete the whole aggregate; deleting a missing milestone succeeds
    async fn delete(&self, id: &MilestoneId) -> DomainResult<()>;

    /// Check if milestone exists
    async fn exists(&self, id: &MilestoneId) -> DomainResult<bool>;

    /// Load a milestone, failing with `NotFound` when absent
    async fn load(&self, id: &MilestoneId) -> DomainResult<Milestone> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(Milestone::ENTITY_TYPE, id.to_string()))
    }
}
