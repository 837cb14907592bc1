//! In-Memory Approval Task Repository Implementation
//!
//! Memory backend for tests and single-process deployments

use async_trait::async_trait;

use taskflow_domain::{
    approval::ApprovalTask, errors::DomainResult, repositories::ApprovalTaskRepository,
    value_objects::ApprovalTaskId,
};

use super::versioned_store::VersionedStore;

/// Thread-safe in-memory implementation of ApprovalTaskRepository
///
/// Stores cloned ApprovalTask instances to maintain isolation. Saves are
/// conditional on the aggregate version.
///
/// # Example
///
/// ```ignore
/// use taskflow_persistence::memory::InMemoryApprovalTaskRepository;
/// use taskflow_domain::repositories::ApprovalTaskRepository;
/// use std::sync::Arc;
///
/// let repo: Arc<dyn ApprovalTaskRepository> = Arc::new(InMemoryApprovalTaskRepository::new());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryApprovalTaskRepository {
    tasks: VersionedStore<ApprovalTaskId, ApprovalTask>,
}

impl InMemoryApprovalTaskRepository {
    /// Create a new empty in-memory approval task repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current count of tasks (for testing)
    pub fn count(&self) -> usize {
        self.tasks.len()
    }

    /// Clear all tasks (for testing)
    pub fn clear(&self) {
        self.tasks.clear();
    }
}

#[async_trait]
impl ApprovalTaskRepository for InMemoryApprovalTaskRepository {
    async fn save(&self, task: &ApprovalTask) -> DomainResult<ApprovalTask> {
        let saved = self.tasks.save(&task.id(), task)?;
        tracing::debug!(task_id = %saved.id(), version = saved.version(), "Approval task saved");
        Ok(saved)
    }

    async fn find_by_id(&self, id: &ApprovalTaskId) -> DomainResult<Option<ApprovalTask>> {
        Ok(self.tasks.get(id))
    }

    async fn find_all(&self) -> DomainResult<Vec<ApprovalTask>> {
        Ok(self.tasks.all())
    }

    async fn delete(&self, id: &ApprovalTaskId) -> DomainResult<()> {
        if self.tasks.remove(id) {
            tracing::debug!(task_id = %id, "Approval task deleted");
        }
        Ok(())
    }

    async fn exists(&self, id: &ApprovalTaskId) -> DomainResult<bool> {
        Ok(self.tasks.contains(id))
    }
}
