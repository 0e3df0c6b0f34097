//! Bowl Repository Implementation
//!
//! SQLite-backed implementation of BowlRepository. Each bowl is one JSON
//! document row; the revision column guards replaces.
//!
//! Writes made through this repository are published right away. Writes
//! from other connections (another process on the same file) are picked
//! up by polling `PRAGMA data_version` while anyone is subscribed.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};

use crate::domain::{Bowl, DomainError, DomainResult};
use super::traits::{BowlRepository, BowlSnapshot};

const SUBSCRIBER_BUFFER: usize = 16;

/// How often a subscribed repository checks for commits by other connections.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// SQLite implementation of Bowl repository
pub struct SqliteBowlRepository {
    conn: Arc<Mutex<Connection>>,
    changes: broadcast::Sender<BowlSnapshot>,
    polling: Arc<AtomicBool>,
    poll_interval: Duration,
}

impl SqliteBowlRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self::with_poll_interval(conn, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_poll_interval(conn: Arc<Mutex<Connection>>, poll_interval: Duration) -> Self {
        let (changes, _) = broadcast::channel(SUBSCRIBER_BUFFER);
        Self {
            conn,
            changes,
            polling: Arc::new(AtomicBool::new(false)),
            poll_interval,
        }
    }

    /// Push a snapshot after a committed write. The write already landed,
    /// so a failed reload is only logged.
    fn publish(&self, conn: &Connection) {
        if self.changes.receiver_count() == 0 {
            return;
        }
        publish_snapshot(conn, &self.changes);
    }

    fn start_polling(&self) {
        if self.polling.swap(true, Ordering::SeqCst) {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            log::warn!("no async runtime; changes from other connections will not be seen");
            self.polling.store(false, Ordering::SeqCst);
            return;
        };
        handle.spawn(watch_other_connections(
            self.conn.clone(),
            self.changes.clone(),
            self.polling.clone(),
            self.poll_interval,
        ));
    }
}

fn publish_snapshot(conn: &Connection, changes: &broadcast::Sender<BowlSnapshot>) {
    match load_all(conn) {
        Ok(bowls) => {
            let snapshot: BTreeMap<String, Bowl> = bowls
                .into_iter()
                .map(|bowl| (bowl.id.clone(), bowl))
                .collect();
            let _ = changes.send(Arc::new(snapshot));
        }
        Err(e) => log::warn!("failed to load bowls for subscribers: {}", e),
    }
}

fn data_version(conn: &Connection) -> DomainResult<i64> {
    conn.query_row("PRAGMA data_version", [], |row| row.get(0))
        .map_err(DomainError::store)
}

/// Runs while there are subscribers. `data_version` only moves when another
/// connection commits, so writes through this repository are not sent twice.
async fn watch_other_connections(
    conn: Arc<Mutex<Connection>>,
    changes: broadcast::Sender<BowlSnapshot>,
    polling: Arc<AtomicBool>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    let mut last_version: Option<i64> = None;

    loop {
        ticker.tick().await;

        if changes.receiver_count() == 0 {
            polling.store(false, Ordering::SeqCst);
            // A subscriber may have arrived between the check and the store.
            if changes.receiver_count() == 0 || polling.swap(true, Ordering::SeqCst) {
                break;
            }
        }

        let guard = conn.lock().await;
        let version = match data_version(&guard) {
            Ok(version) => version,
            Err(e) => {
                log::warn!("bowl change poll failed: {}", e);
                continue;
            }
        };
        if last_version.replace(version).is_some_and(|prev| prev != version) {
            log::debug!("bowls changed by another connection");
            publish_snapshot(&guard, &changes);
        }
    }
}

fn row_to_bowl(document: &str, revision: i64) -> DomainResult<Bowl> {
    let mut bowl: Bowl = serde_json::from_str(document).map_err(DomainError::store)?;
    bowl.revision = revision as u64;
    Ok(bowl)
}

fn load_all(conn: &Connection) -> DomainResult<Vec<Bowl>> {
    let mut stmt = conn
        .prepare("SELECT document, revision FROM bowls ORDER BY rowid ASC")
        .map_err(DomainError::store)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
        .map_err(DomainError::store)?;

    let mut bowls = Vec::new();
    for row in rows {
        let (document, revision) = row.map_err(DomainError::store)?;
        bowls.push(row_to_bowl(&document, revision)?);
    }
    Ok(bowls)
}

fn stored_revision(conn: &Connection, id: &str) -> DomainResult<Option<u64>> {
    conn.query_row("SELECT revision FROM bowls WHERE id = ?1", params![id], |row| {
        row.get::<_, i64>(0)
    })
    .optional()
    .map(|rev| rev.map(|r| r as u64))
    .map_err(DomainError::store)
}

#[async_trait]
impl BowlRepository for SqliteBowlRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Bowl>> {
        let conn = self.conn.lock().await;

        let row = conn
            .query_row(
                "SELECT document, revision FROM bowls WHERE id = ?1",
                params![id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()
            .map_err(DomainError::store)?;

        row.map(|(document, revision)| row_to_bowl(&document, revision))
            .transpose()
    }

    async fn list(&self) -> DomainResult<Vec<Bowl>> {
        let conn = self.conn.lock().await;
        load_all(&conn)
    }

    async fn insert(&self, bowl: &Bowl) -> DomainResult<Bowl> {
        let conn = self.conn.lock().await;

        if stored_revision(&conn, &bowl.id)?.is_some() {
            return Err(DomainError::Conflict(format!("bowl {} already exists", bowl.id)));
        }

        let stored = Bowl {
            revision: 0,
            ..bowl.clone()
        };
        let document = serde_json::to_string(&stored).map_err(DomainError::store)?;
        conn.execute(
            "INSERT INTO bowls (id, revision, document, updated_at) VALUES (?1, 0, ?2, ?3)",
            params![stored.id, document, chrono::Utc::now().timestamp()],
        )
        .map_err(DomainError::store)?;

        self.publish(&conn);
        Ok(stored)
    }

    async fn replace(&self, bowl: &Bowl, expected_revision: u64) -> DomainResult<Bowl> {
        let conn = self.conn.lock().await;

        let stored = Bowl {
            revision: expected_revision + 1,
            ..bowl.clone()
        };
        let document = serde_json::to_string(&stored).map_err(DomainError::store)?;
        let changed = conn
            .execute(
                "UPDATE bowls SET document = ?1, revision = ?2, updated_at = ?3
                 WHERE id = ?4 AND revision = ?5",
                params![
                    document,
                    stored.revision as i64,
                    chrono::Utc::now().timestamp(),
                    stored.id,
                    expected_revision as i64
                ],
            )
            .map_err(DomainError::store)?;

        if changed == 0 {
            return match stored_revision(&conn, &bowl.id)? {
                Some(actual) => Err(DomainError::Conflict(format!(
                    "bowl {} is at revision {}, expected {}",
                    bowl.id, actual, expected_revision
                ))),
                None => Err(DomainError::NotFound(format!("bowl {}", bowl.id))),
            };
        }

        self.publish(&conn);
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let conn = self.conn.lock().await;

        let changed = conn
            .execute("DELETE FROM bowls WHERE id = ?1", params![id])
            .map_err(DomainError::store)?;

        if changed > 0 {
            self.publish(&conn);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<BowlSnapshot> {
        let receiver = self.changes.subscribe();
        self.start_polling();
        receiver
    }
}
