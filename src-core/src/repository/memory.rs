//! In-memory stores
//!
//! Same contracts as the SQLite stores, nothing persisted. Used for
//! ephemeral sessions and tests.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use crate::domain::{Bowl, DomainError, DomainResult};
use super::traits::{BowlRepository, BowlSnapshot, DeviceStore};

const SUBSCRIBER_BUFFER: usize = 16;

/// Bowls in insertion order, like the SQLite store's rowid order
pub struct InMemoryBowlRepository {
    bowls: Mutex<Vec<Bowl>>,
    changes: broadcast::Sender<BowlSnapshot>,
}

impl InMemoryBowlRepository {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(SUBSCRIBER_BUFFER);
        Self {
            bowls: Mutex::new(Vec::new()),
            changes,
        }
    }

    fn publish(&self, bowls: &[Bowl]) {
        if self.changes.receiver_count() > 0 {
            let snapshot: BTreeMap<String, Bowl> = bowls
                .iter()
                .map(|bowl| (bowl.id.clone(), bowl.clone()))
                .collect();
            let _ = self.changes.send(Arc::new(snapshot));
        }
    }
}

impl Default for InMemoryBowlRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BowlRepository for InMemoryBowlRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Bowl>> {
        Ok(self.bowls.lock().await.iter().find(|b| b.id == id).cloned())
    }

    async fn list(&self) -> DomainResult<Vec<Bowl>> {
        Ok(self.bowls.lock().await.clone())
    }

    async fn insert(&self, bowl: &Bowl) -> DomainResult<Bowl> {
        let mut bowls = self.bowls.lock().await;
        if bowls.iter().any(|b| b.id == bowl.id) {
            return Err(DomainError::Conflict(format!("bowl {} already exists", bowl.id)));
        }

        let stored = Bowl {
            revision: 0,
            ..bowl.clone()
        };
        bowls.push(stored.clone());
        self.publish(&bowls);
        Ok(stored)
    }

    async fn replace(&self, bowl: &Bowl, expected_revision: u64) -> DomainResult<Bowl> {
        let mut bowls = self.bowls.lock().await;
        let current = bowls
            .iter_mut()
            .find(|b| b.id == bowl.id)
            .ok_or_else(|| DomainError::NotFound(format!("bowl {}", bowl.id)))?;
        if current.revision != expected_revision {
            return Err(DomainError::Conflict(format!(
                "bowl {} is at revision {}, expected {}",
                bowl.id, current.revision, expected_revision
            )));
        }

        let stored = Bowl {
            revision: expected_revision + 1,
            ..bowl.clone()
        };
        *current = stored.clone();
        self.publish(&bowls);
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let mut bowls = self.bowls.lock().await;
        let before = bowls.len();
        bowls.retain(|b| b.id != id);
        if bowls.len() != before {
            self.publish(&bowls);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<BowlSnapshot> {
        self.changes.subscribe()
    }
}

#[derive(Default)]
pub struct InMemoryDeviceStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeviceStore for InMemoryDeviceStore {
    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> DomainResult<()> {
        self.values.lock().await.remove(key);
        Ok(())
    }
}
