//! Domain Layer - Core Entity Trait and Errors
//!
//! This trait defines the basic contract for all domain entities.
//! All entities must have a unique ID and be thread-safe.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Clone + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// Generate a fresh opaque identifier (UUID v4)
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Rejected input. Nothing was changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ValidationError {
    #[error("Please enter your name.")]
    MissingName,
    #[error("You can only add {limit} entries to this bowl.")]
    LimitReached { limit: u32 },
    #[error("\"{0}\" is already in the bowl.")]
    DuplicateEntry(String),
    #[error("Entry text cannot be empty.")]
    EmptyEntry,
    #[error("There is nothing in the bowl to juggle.")]
    EmptySource,
    #[error("At least {required} members are needed, the bowl has {found}.")]
    InsufficientMembers { required: usize, found: usize },
}

/// The requester may not perform the operation. Nothing was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum AuthorizationError {
    #[error("Only the bowl owner can do that.")]
    NotOwner,
    #[error("Only bowl members can do that.")]
    NotMember,
}

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Store error: {0}")]
    Store(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DomainError {
    /// Wrap a collaborator failure (database, serialization, ...)
    pub fn store(err: impl std::fmt::Display) -> Self {
        DomainError::Store(err.to_string())
    }

    /// Whether retrying the same operation later can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Conflict(_) | DomainError::Store(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_is_unique() {
        assert_ne!(new_id(), new_id());
    }

    #[test]
    fn test_user_facing_messages() {
        let err: DomainError = ValidationError::MissingName.into();
        assert_eq!(err.to_string(), "Please enter your name.");

        let err: DomainError = ValidationError::LimitReached { limit: 2 }.into();
        assert_eq!(err.to_string(), "You can only add 2 entries to this bowl.");

        let err: DomainError = AuthorizationError::NotOwner.into();
        assert_eq!(err.to_string(), "Only the bowl owner can do that.");
    }

    #[test]
    fn test_retryable() {
        assert!(DomainError::Conflict("x".into()).is_retryable());
        assert!(DomainError::store("disk").is_retryable());
        assert!(!DomainError::from(ValidationError::EmptySource).is_retryable());
    }
}
