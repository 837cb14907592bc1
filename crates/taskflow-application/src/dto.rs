//! Command DTOs accepted by the application services
//!
//! Commands arrive already authenticated but not yet normalized: approver
//! roles are raw [`RoleClaim`]s and are resolved here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskflow_domain::{ApprovalMode, Approver, DomainResult, Priority, RoleClaim};

/// One approver as submitted by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproverInput {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    pub role: RoleClaim,
}

impl ApproverInput {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, role: RoleClaim) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            role,
        }
    }

    /// Normalize the role claim into a pending approver
    pub fn into_approver(self) -> DomainResult<Approver> {
        let role = self.role.normalize()?;
        Ok(Approver::new(self.id, self.display_name, role))
    }
}

/// Command to create an approval task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateApprovalTaskCommand {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub mode: ApprovalMode,
    pub approvers: Vec<ApproverInput>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

/// Command to create a milestone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMilestoneCommand {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub assigned_to: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}
