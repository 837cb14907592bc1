//! Taskflow Domain
//!
//! Aggregates and the status-derivation engines behind approval chains and
//! milestone progress tracking.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ApprovalEngine              │  MilestoneEngine               │
//! │  derive_status / can_act     │  recompute_progress            │
//! │  record_decision             │  link / unlink / update        │
//! │                              │  auto + manual achievement     │
//! ├──────────────────────────────┴───────────────────────────────┤
//! │  ApprovalTask, Milestone (aggregates)  │  ActivityFeed         │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ApprovalTaskRepository, MilestoneRepository (ports)           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Engines are pure with respect to storage: they mutate an in-memory
//! aggregate and append to its activity feed. Loading and conditional saving
//! belong to the caller.

pub mod activity;
pub mod actor;
pub mod approval;
pub mod errors;
pub mod milestone;
pub mod repositories;
pub mod value_objects;

pub use activity::{ActivityAction, ActivityEntry, ActivityFeed};
pub use actor::{Actor, Role, RoleClaim};
pub use approval::{
    ApprovalEngine, ApprovalMode, ApprovalTask, Approver, Decision, DecisionStatus, OverallStatus,
};
pub use errors::{DomainError, DomainResult, ErrorKind};
pub use milestone::{
    AchievementAttribution, LinkedTask, LinkedTaskStatus, Milestone, MilestoneEngine,
    MilestoneStatus, TaskRef,
};
pub use repositories::{ApprovalTaskRepository, MilestoneRepository, Versioned};
pub use value_objects::{ActorId, ApprovalTaskId, LinkedTaskId, MilestoneId, Priority};
