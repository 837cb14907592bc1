//! Multi-party approval chains

mod engine;
mod model;

pub use engine::ApprovalEngine;
pub use model::{ApprovalMode, ApprovalTask, Approver, Decision, DecisionStatus, OverallStatus};
