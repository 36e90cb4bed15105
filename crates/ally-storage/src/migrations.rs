//! Database schema migrations.
//!
//! Applies the initial schema: conversations, bookings, consultations, and
//! the schema_migrations tracking table.

use rusqlite::Connection;
use tracing::info;

use ally_core::error::AllyError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), AllyError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| AllyError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| AllyError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<(), AllyError> {
    conn.execute_batch(
        "
        -- Session transcript log. Insertion id is the chronological order.
        CREATE TABLE IF NOT EXISTS conversations (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id  TEXT NOT NULL,
            role        TEXT NOT NULL CHECK (role IN ('user', 'model')),
            content     TEXT NOT NULL,
            timestamp   DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_conversations_session
            ON conversations (session_id, id);

        -- Marketplace bookings.
        CREATE TABLE IF NOT EXISTS bookings (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            provider_id     INTEGER NOT NULL,
            provider_name   TEXT NOT NULL,
            service         TEXT NOT NULL,
            date            TEXT NOT NULL,
            time            TEXT NOT NULL,
            booked_by       TEXT NOT NULL,
            status          TEXT DEFAULT 'Pending',
            timestamp       DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Telemedicine consultations.
        CREATE TABLE IF NOT EXISTS consultations (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            doctor_id   INTEGER NOT NULL,
            doctor_name TEXT,
            start_time  DATETIME DEFAULT CURRENT_TIMESTAMP,
            end_time    DATETIME,
            duration    INTEGER,
            status      TEXT DEFAULT 'Active'
        );

        CREATE INDEX IF NOT EXISTS idx_consultations_doctor_status
            ON consultations (doctor_id, status);

        INSERT INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| AllyError::Storage(format!("Migration v1 failed: {}", e)))?;

    Ok(())
}
