//! Device Store Repository
//!
//! Persists the device's own settings (identity, name, joined bowls).

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult};
use super::traits::DeviceStore;

pub struct SqliteDeviceStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDeviceStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl DeviceStore for SqliteDeviceStore {
    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        let conn = self.conn.lock().await;

        conn.query_row("SELECT value FROM device_kv WHERE key = ?1", params![key], |row| {
            row.get::<_, String>(0)
        })
        .optional()
        .map_err(DomainError::store)
    }

    async fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        let conn = self.conn.lock().await;

        conn.execute(
            "INSERT OR REPLACE INTO device_kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .map_err(DomainError::store)?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> DomainResult<()> {
        let conn = self.conn.lock().await;

        conn.execute("DELETE FROM device_kv WHERE key = ?1", params![key])
            .map_err(DomainError::store)?;

        Ok(())
    }
}
