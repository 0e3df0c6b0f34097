//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for data access.
//! Implementations can use SQLite, in-memory, etc.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::domain::{Bowl, DomainResult};

/// The whole bowl collection keyed by id, as pushed to subscribers
pub type BowlSnapshot = Arc<BTreeMap<String, Bowl>>;

/// Shared store of bowl documents
///
/// Writes replace whole documents. `replace` is a compare-and-swap on
/// `Bowl::revision`.
#[async_trait]
pub trait BowlRepository: Send + Sync {
    /// Find bowl by ID
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Bowl>>;

    /// List all bowls
    async fn list(&self) -> DomainResult<Vec<Bowl>>;

    /// Store a new bowl; `Conflict` if the id is taken
    async fn insert(&self, bowl: &Bowl) -> DomainResult<Bowl>;

    /// Overwrite a bowl if its stored revision is still `expected_revision`.
    ///
    /// Returns the stored document with its revision bumped.
    async fn replace(&self, bowl: &Bowl, expected_revision: u64) -> DomainResult<Bowl>;

    /// Delete bowl by ID (absent ids are ignored)
    async fn delete(&self, id: &str) -> DomainResult<()>;

    /// Live snapshots of the whole collection, one per write
    fn subscribe(&self) -> broadcast::Receiver<BowlSnapshot>;
}

/// Local secure key-value storage of one device
#[async_trait]
pub trait DeviceStore: Send + Sync {
    async fn get(&self, key: &str) -> DomainResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> DomainResult<()>;

    async fn remove(&self, key: &str) -> DomainResult<()>;
}

/// Device store keys
pub mod keys {
    pub const DEVICE_ID: &str = "deviceId";
    pub const USER_NAME: &str = "userName";
    pub const MY_BOWLS: &str = "listMyBowls";
    pub const PENDING_BOWL_ID: &str = "pendingBowlId";
}
