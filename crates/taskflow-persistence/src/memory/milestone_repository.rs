//! In-Memory Milestone Repository Implementation

use async_trait::async_trait;

use taskflow_domain::{
    errors::DomainResult, milestone::Milestone, repositories::MilestoneRepository,
    value_objects::MilestoneId,
};

use super::versioned_store::VersionedStore;

/// Thread-safe in-memory implementation of MilestoneRepository
#[derive(Debug, Default)]
pub struct InMemoryMilestoneRepository {
    milestones: VersionedStore<MilestoneId, Milestone>,
}

impl InMemoryMilestoneRepository {
    /// Create a new empty in-memory milestone repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current count of milestones (for testing)
    pub fn count(&self) -> usize {
        self.milestones.len()
    }

    /// Clear all milestones (for testing)
    pub fn clear(&self) {
        self.milestones.clear();
    }
}

#[async_trait]
impl MilestoneRepository for InMemoryMilestoneRepository {
    async fn save(&self, milestone: &Milestone) -> DomainResult<Milestone> {
        let saved = self.milestones.save(&milestone.id(), milestone)?;
        tracing::debug!(milestone_id = %saved.id(), version = saved.version(), "Milestone saved");
        Ok(saved)
    }

    async fn find_by_id(&self, id: &MilestoneId) -> DomainResult<Option<Milestone>> {
        Ok(self.milestones.get(id))
    }

    async fn find_all(&self) -> DomainResult<Vec<Milestone>> {
        Ok(self.milestones.all())
    }

    async fn delete(&self, id: &MilestoneId) -> DomainResult<()> {
        if self.milestones.remove(id) {
            tracing::debug!(milestone_id = %id, "Milestone deleted");
        }
        Ok(())
    }

    async fn exists(&self, id: &MilestoneId) -> DomainResult<bool> {
        Ok(self.milestones.contains(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use taskflow_domain::{ActorId, DomainError, LinkedTaskStatus, MilestoneEngine, TaskRef};

    fn create_test_milestone() -> Milestone {
        Milestone::create(
            "Release 2.0".into(),
            String::new(),
            ActorId::new("pm"),
            ActorId::new("dev"),
            None,
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_save_increments_version() {
        let repo = InMemoryMilestoneRepository::new();
        let m = repo.save(&create_test_milestone()).await.unwrap();
        assert_eq!(m.version(), 1);

        let m = repo.save(&m).await.unwrap();
        assert_eq!(m.version(), 2);
        assert_eq!(repo.load(&m.id()).await.unwrap().version(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_progress_updates_conflict() {
        let repo = InMemoryMilestoneRepository::new();
        let engine = MilestoneEngine::default();
        let actor = ActorId::new("pm");

        let mut m = create_test_milestone();
        engine.link_task(&mut m, TaskRef::new("a", "A"), &actor, Utc::now()).unwrap();
        engine.link_task(&mut m, TaskRef::new("b", "B"), &actor, Utc::now()).unwrap();
        let m = repo.save(&m).await.unwrap();

        let mut first = repo.load(&m.id()).await.unwrap();
        let mut second = repo.load(&m.id()).await.unwrap();
        engine
            .update_linked_task_progress(
                &mut first,
                &"a".into(),
                100,
                LinkedTaskStatus::Completed,
                &actor,
                Utc::now(),
            )
            .unwrap();
        engine
            .update_linked_task_progress(
                &mut second,
                &"b".into(),
                100,
                LinkedTaskStatus::Completed,
                &actor,
                Utc::now(),
            )
            .unwrap();

        repo.save(&first).await.unwrap();
        let err = repo.save(&second).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
        assert_eq!(repo.load(&m.id()).await.unwrap().progress_percentage(), 50);
    }

    #[tokio::test]
    async fn test_delete_and_exists() {
        let repo = InMemoryMilestoneRepository::new();
        let m = repo.save(&create_test_milestone()).await.unwrap();
        assert!(repo.exists(&m.id()).await.unwrap());

        repo.delete(&m.id()).await.unwrap();
        assert!(!repo.exists(&m.id()).await.unwrap());
        assert_eq!(repo.count(), 0);
    }
}
