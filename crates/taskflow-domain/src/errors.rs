//! Domain errors for Taskflow

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core domain errors
///
/// Every engine operation either applies in full or fails with one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Permission denied: {reason}")]
    Permission { reason: String },

    #[error("Conflict: {resource}")]
    Conflict { resource: String },

    #[error("Precondition failed: {rule}")]
    Precondition { rule: String },

    /// Raised by persistence gateways for transient storage failures
    #[error("Storage failure: {reason}")]
    Storage { reason: String },
}

/// Stable error classification for transport-level translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Permission,
    Conflict,
    Precondition,
    RateLimited,
    Storage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Permission => "permission",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Precondition => "precondition",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Storage => "storage",
        }
    }
}

impl DomainError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn permission(reason: impl Into<String>) -> Self {
        Self::Permission {
            reason: reason.into(),
        }
    }

    pub fn conflict(resource: impl Into<String>) -> Self {
        Self::Conflict {
            resource: resource.into(),
        }
    }

    pub fn precondition(rule: impl Into<String>) -> Self {
        Self::Precondition { rule: rule.into() }
    }

    pub fn storage(reason: impl Into<String>) -> Self {
        Self::Storage {
            reason: reason.into(),
        }
    }

    /// Classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation { .. } => ErrorKind::Validation,
            DomainError::NotFound { .. } => ErrorKind::NotFound,
            DomainError::Permission { .. } => ErrorKind::Permission,
            DomainError::Conflict { .. } => ErrorKind::Conflict,
            DomainError::Precondition { .. } => ErrorKind::Precondition,
            DomainError::Storage { .. } => ErrorKind::Storage,
        }
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
