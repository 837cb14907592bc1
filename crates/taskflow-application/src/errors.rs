//! Application layer error types
//!
//! Domain failures pass through unchanged so callers can translate them by
//! [`ErrorKind`]; the application layer only adds throttling.

use taskflow_domain::{ActorId, DomainError, ErrorKind};
use thiserror::Error;

/// Application layer result type
pub type ApplicationResult<T> = Result<T, ApplicationError>;

/// Application layer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplicationError {
    /// Wrapped domain error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The actor exhausted its creation budget
    #[error("Rate limit exceeded for actor {actor}")]
    RateLimited { actor: String },
}

impl ApplicationError {
    pub fn rate_limited(actor: &ActorId) -> Self {
        ApplicationError::RateLimited {
            actor: actor.to_string(),
        }
    }

    /// Stable code for transport translation
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApplicationError::Domain(err) => err.kind(),
            ApplicationError::RateLimited { .. } => ErrorKind::RateLimited,
        }
    }

    /// Whether this is a rejection worth a warning rather than bad input
    pub(crate) fn is_rejection(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Permission
                | ErrorKind::Conflict
                | ErrorKind::Precondition
                | ErrorKind::RateLimited
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_is_transparent() {
        let err: ApplicationError = DomainError::precondition("needs 100%").into();
        assert_eq!(err.to_string(), "Precondition failed: needs 100%");
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert!(err.is_rejection());
    }

    #[test]
    fn test_rate_limited_display() {
        let err = ApplicationError::rate_limited(&ActorId::new("alice"));
        assert_eq!(err.to_string(), "Rate limit exceeded for actor alice");
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert_eq!(err.kind().as_str(), "rate_limited");
    }

    #[test]
    fn test_validation_is_not_a_rejection() {
        let err: ApplicationError = DomainError::validation("title", "empty").into();
        assert!(!err.is_rejection());
    }
}
