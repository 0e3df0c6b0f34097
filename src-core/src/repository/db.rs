//! Database Connection and Setup
//!
//! Manages SQLite database connection and migrations.

use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult};

/// Database state wrapper
#[derive(Clone)]
pub struct DbState {
    conn: Arc<Mutex<Connection>>,
}

impl DbState {
    /// Shared connection handle for repositories
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }
}

/// Initialize database with path (":memory:" for a throwaway database)
pub async fn init_db(db_path: &Path) -> DomainResult<DbState> {
    let conn = Connection::open(db_path)
        .map_err(|e| DomainError::Store(format!("Failed to open db: {}", e)))?;

    run_migrations(&conn)?;
    log::info!("database ready at {}", db_path.display());

    Ok(DbState {
        conn: Arc::new(Mutex::new(conn)),
    })
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> DomainResult<bool> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", table))
        .map_err(DomainError::store)?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(DomainError::store)?;

    for name in names {
        if name.map_err(DomainError::store)? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS bowls (
            id TEXT PRIMARY KEY,
            revision INTEGER NOT NULL DEFAULT 0,
            document TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS device_kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )
    .map_err(DomainError::store)?;

    // Added after the first release
    if !column_exists(conn, "bowls", "updated_at")? {
        conn.execute("ALTER TABLE bowls ADD COLUMN updated_at INTEGER", [])
            .map_err(|e| DomainError::Store(format!("Failed to add updated_at: {}", e)))?;
    }

    Ok(())
}
