//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO external dependencies (except serde, thiserror and uuid ids).

mod bowl;
mod entity;
mod entry;
mod user;

pub use bowl::{Bowl, BowlSummary, BowlType};
pub use entity::{new_id, AuthorizationError, DomainError, DomainResult, Entity, ValidationError};
pub use entry::Entry;
pub use user::{Member, User};
