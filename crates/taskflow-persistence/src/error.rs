//! Persistence Layer Error Types
//!
//! Error mapping to domain types

use thiserror::Error;

use taskflow_domain::errors::DomainError;

/// Errors that can occur during persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Concurrency conflict (optimistic locking)
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    /// Backend unavailable or failed
    #[error("Database error: {0}")]
    Database(String),
}

impl PersistenceError {
    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create a concurrency conflict error
    pub fn concurrency_conflict(message: impl Into<String>) -> Self {
        Self::ConcurrencyConflict(message.into())
    }
}

/// Convert persistence errors to domain errors
impl From<PersistenceError> for DomainError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound { entity_type, id } => DomainError::NotFound {
                entity_type: entity_type.to_string(),
                id,
            },
            PersistenceError::ConcurrencyConflict(msg) => DomainError::Conflict { resource: msg },
            PersistenceError::Database(msg) => DomainError::Storage { reason: msg },
        }
    }
}
