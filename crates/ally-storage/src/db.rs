//! SQLite handle shared by the transcript, booking, and consultation
//! repositories.
//!
//! Every repository call takes the one connection for the length of a
//! single statement (or short read), so a chat request never holds the
//! lock across the remote model call.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use ally_core::error::AllyError;

use crate::migrations;

/// The process-wide SQLite connection.
///
/// Concurrent sessions share nothing else mutable; their appends queue on
/// this lock and land in insertion-id order.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open `ally.db` (or any path), creating parent directories, switching
    /// to WAL, and bringing the schema up to date.
    pub fn new(path: &Path) -> Result<Self, AllyError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AllyError::Storage(format!("Failed to open database: {}", e)))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )
        .map_err(|e| AllyError::Storage(format!("Failed to set pragmas: {}", e)))?;

        info!("Database opened at {}", path.display());

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// Fresh in-memory database with the full schema. Used by tests and the
    /// API integration suite.
    pub fn in_memory() -> Result<Self, AllyError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AllyError::Storage(format!("Failed to open in-memory db: {}", e)))?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| AllyError::Storage(format!("Failed to set pragmas: {}", e)))?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// Run `f` against the connection while holding the lock. A poisoned
    /// lock becomes `AllyError::Storage`.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, AllyError>
    where
        F: FnOnce(&Connection) -> Result<T, AllyError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| AllyError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}
