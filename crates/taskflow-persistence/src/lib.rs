//! Taskflow Persistence Layer
//!
//! Infrastructure layer providing repository implementations for domain aggregates.
//! This crate implements the repository interfaces defined in `taskflow-domain`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Infrastructure Layer                          │
//! │  memory/                                                         │
//! │  InMemoryApprovalTaskRepository   InMemoryMilestoneRepository    │
//! └─────────────────────────────────────────────────────────────────┘
//!                              ▲
//!                              │ implements
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Domain Layer                               │
//! │        ApprovalTaskRepository, MilestoneRepository               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `save` is a conditional write keyed on the aggregate version: a
//! writer holding a stale copy gets a `Conflict` and must reload.
//!
//! ## Usage
//!
//! ```ignore
//! use taskflow_persistence::memory::InMemoryMilestoneRepository;
//! use taskflow_domain::repositories::MilestoneRepository;
//! use std::sync::Arc;
//!
//! let repo: Arc<dyn MilestoneRepository> = Arc::new(InMemoryMilestoneRepository::new());
//! ```

pub mod error;
pub mod memory;

pub use error::PersistenceError;

pub use memory::{InMemoryApprovalTaskRepository, InMemoryMilestoneRepository};
