//! In-Memory Repository Implementations
//!
//! Thread-safe in-memory implementations of domain repository interfaces
//! with optimistic concurrency.

mod approval_task_repository;
mod milestone_repository;
mod versioned_store;

pub use approval_task_repository::InMemoryApprovalTaskRepository;
pub use milestone_repository::InMemoryMilestoneRepository;
