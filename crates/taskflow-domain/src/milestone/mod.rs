//! Milestone progress aggregation

mod engine;
mod model;

pub use engine::{AchievementAttribution, MilestoneEngine};
pub use model::{LinkedTask, LinkedTaskStatus, Milestone, MilestoneStatus, TaskRef};
