//! Domain-level error types.

use thiserror::Error;
use uuid::Uuid;

use crate::ports::{RateLimitError, RateLimitInfo};

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The subject has no quota left in the current window.
    #[error("Rate limit exceeded, resets at {}", .info.reset_at.to_rfc3339())]
    RateLimitExceeded { info: RateLimitInfo },

    /// Quota could not be determined, so the action is rejected.
    #[error("Check limit error: {0}")]
    LimitCheck(#[source] RateLimitError),

    #[error(transparent)]
    Repository(#[from] RepoError),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}
