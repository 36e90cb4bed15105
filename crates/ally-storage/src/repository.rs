//! Repository implementations for SQLite-backed persistence.
//!
//! Provides the session transcript store plus the booking and consultation
//! records, all operating on the Database struct using raw SQL.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use ally_core::error::AllyError;
use ally_core::types::{Role, Turn};

use crate::db::Database;

// =============================================================================
// Session store
// =============================================================================

/// Per-session transcript storage.
///
/// Turns are returned oldest-first in the order they were appended.
pub trait SessionStore: Send + Sync {
    /// Append one turn to the end of a session's transcript.
    fn append(&self, session_id: &str, role: Role, text: &str) -> Result<(), AllyError>;

    /// Read the last `limit` turns of a session, oldest first.
    fn read(&self, session_id: &str, limit: usize) -> Result<Vec<Turn>, AllyError>;
}

/// SQLite transcript log on the `conversations` table.
pub struct ConversationRepository {
    db: Arc<Database>,
}

impl ConversationRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl SessionStore for ConversationRepository {
    fn append(&self, session_id: &str, role: Role, text: &str) -> Result<(), AllyError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO conversations (session_id, role, content) VALUES (?1, ?2, ?3)",
                rusqlite::params![session_id, role.as_str(), text],
            )
            .map_err(|e| AllyError::Storage(format!("Failed to save message: {}", e)))?;
            Ok(())
        })
    }

    fn read(&self, session_id: &str, limit: usize) -> Result<Vec<Turn>, AllyError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT role, content FROM (
                         SELECT id, role, content FROM conversations
                         WHERE session_id = ?1
                         ORDER BY id DESC
                         LIMIT ?2
                     )
                     ORDER BY id ASC",
                )
                .map_err(|e| AllyError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![session_id, limit as i64], |row| {
                    let role: String = row.get(0)?;
                    let content: String = row.get(1)?;
                    Ok((role, content))
                })
                .map_err(|e| AllyError::Storage(e.to_string()))?;

            let mut turns = Vec::new();
            for row in rows {
                let (role, content) = row.map_err(|e| AllyError::Storage(e.to_string()))?;
                turns.push(Turn::new(role.parse()?, content));
            }
            Ok(turns)
        })
    }
}

// =============================================================================
// Bookings
// =============================================================================

/// Fields required to create a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub provider_id: i64,
    pub provider_name: String,
    pub service: String,
    pub date: String,
    pub time: String,
    pub booked_by: String,
}

/// A stored booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub provider_name: String,
    pub service: String,
    pub date: String,
    pub time: String,
    pub status: String,
    pub booked_by: String,
}

/// Repository for caregiver bookings.
pub struct BookingRepository {
    db: Arc<Database>,
}

impl BookingRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a booking with status `Pending` and return its id.
    pub fn add(&self, booking: &NewBooking) -> Result<i64, AllyError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO bookings (provider_id, provider_name, service, date, time, booked_by, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'Pending')",
                rusqlite::params![
                    booking.provider_id,
                    booking.provider_name,
                    booking.service,
                    booking.date,
                    booking.time,
                    booking.booked_by,
                ],
            )
            .map_err(|e| AllyError::Storage(format!("Failed to save booking: {}", e)))?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// All bookings, newest first.
    pub fn list(&self) -> Result<Vec<Booking>, AllyError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, provider_name, service, date, time, status, booked_by
                     FROM bookings
                     ORDER BY timestamp DESC, id DESC",
                )
                .map_err(|e| AllyError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map([], |row| {
                    Ok(Booking {
                        id: row.get(0)?,
                        provider_name: row.get(1)?,
                        service: row.get(2)?,
                        date: row.get(3)?,
                        time: row.get(4)?,
                        status: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                        booked_by: row.get(6)?,
                    })
                })
                .map_err(|e| AllyError::Storage(e.to_string()))?;

            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| AllyError::Storage(e.to_string()))
        })
    }
}

// =============================================================================
// Consultations
// =============================================================================

/// Repository for telemedicine consultations.
pub struct ConsultationRepository {
    db: Arc<Database>,
}

impl ConsultationRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Open an `Active` consultation and return its id.
    pub fn start(&self, doctor_id: i64, doctor_name: Option<&str>) -> Result<i64, AllyError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO consultations (doctor_id, doctor_name, status) VALUES (?1, ?2, 'Active')",
                rusqlite::params![doctor_id, doctor_name],
            )
            .map_err(|e| AllyError::Storage(format!("Failed to start consultation: {}", e)))?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Mark every active consultation for `doctor_id` as `Completed`.
    ///
    /// Returns the number of consultations closed.
    pub fn end(&self, doctor_id: i64, duration: Option<i64>) -> Result<usize, AllyError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE consultations
                 SET status = 'Completed', end_time = CURRENT_TIMESTAMP, duration = ?1
                 WHERE doctor_id = ?2 AND status = 'Active'",
                rusqlite::params![duration, doctor_id],
            )
            .map_err(|e| AllyError::Storage(format!("Failed to end consultation: {}", e)))
        })
    }

    /// Status of a consultation, if it exists.
    pub fn status(&self, id: i64) -> Result<Option<String>, AllyError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT status FROM consultations WHERE id = ?1")
                .map_err(|e| AllyError::Storage(e.to_string()))?;
            let mut rows = stmt
                .query(rusqlite::params![id])
                .map_err(|e| AllyError::Storage(e.to_string()))?;
            match rows.next().map_err(|e| AllyError::Storage(e.to_string()))? {
                Some(row) => row
                    .get::<_, Option<String>>(0)
                    .map_err(|e| AllyError::Storage(e.to_string())),
                None => Ok(None),
            }
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Arc<Database> {
        Arc::new(Database::in_memory().unwrap())
    }

    fn booking(provider_id: i64, date: &str) -> NewBooking {
        NewBooking {
            provider_id,
            provider_name: "Sarah Jenkins".to_string(),
            service: "Medical Care".to_string(),
            date: date.to_string(),
            time: "10:00".to_string(),
            booked_by: "family".to_string(),
        }
    }

    // ---- Conversations ----

    #[test]
    fn test_append_and_read_in_order() {
        let repo = ConversationRepository::new(db());
        repo.append("s1", Role::User, "Hello").unwrap();
        repo.append("s1", Role::Model, "Hi there").unwrap();
        repo.append("s1", Role::User, "How are you?").unwrap();

        let turns = repo.read("s1", 10).unwrap();
        assert_eq!(
            turns,
            vec![
                Turn::user("Hello"),
                Turn::model("Hi there"),
                Turn::user("How are you?"),
            ]
        );
    }

    #[test]
    fn test_read_returns_last_limit_oldest_first() {
        let repo = ConversationRepository::new(db());
        for i in 0..12 {
            repo.append("s1", Role::User, &format!("m{}", i)).unwrap();
        }
        let turns = repo.read("s1", 10).unwrap();
        assert_eq!(turns.len(), 10);
        assert_eq!(turns[0].text, "m2");
        assert_eq!(turns[9].text, "m11");
    }

    #[test]
    fn test_sessions_are_isolated() {
        let repo = ConversationRepository::new(db());
        repo.append("a", Role::User, "for a").unwrap();
        repo.append("b", Role::User, "for b").unwrap();
        assert_eq!(repo.read("a", 10).unwrap(), vec![Turn::user("for a")]);
        assert_eq!(repo.read("b", 10).unwrap(), vec![Turn::user("for b")]);
    }

    #[test]
    fn test_read_unknown_session_empty() {
        let repo = ConversationRepository::new(db());
        assert!(repo.read("missing", 10).unwrap().is_empty());
    }

    #[test]
    fn test_read_zero_limit() {
        let repo = ConversationRepository::new(db());
        repo.append("s", Role::User, "x").unwrap();
        assert!(repo.read("s", 0).unwrap().is_empty());
    }

    #[test]
    fn test_store_is_object_safe() {
        let store: Box<dyn SessionStore> = Box::new(ConversationRepository::new(db()));
        store.append("s", Role::Model, "ok").unwrap();
        assert_eq!(store.read("s", 1).unwrap()[0].role, Role::Model);
    }

    // ---- Bookings ----

    #[test]
    fn test_add_booking_returns_id_and_pending() {
        let repo = BookingRepository::new(db());
        let id = repo.add(&booking(1, "2026-11-01")).unwrap();
        assert!(id > 0);
        let all = repo.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        assert_eq!(all[0].status, "Pending");
        assert_eq!(all[0].provider_name, "Sarah Jenkins");
    }

    #[test]
    fn test_list_newest_first() {
        let repo = BookingRepository::new(db());
        let first = repo.add(&booking(1, "2026-11-01")).unwrap();
        let second = repo.add(&booking(2, "2026-11-02")).unwrap();
        let ids: Vec<i64> = repo.list().unwrap().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn test_booking_serializes_camel_case() {
        let json = serde_json::to_value(Booking {
            id: 1,
            provider_name: "A".into(),
            service: "S".into(),
            date: "D".into(),
            time: "T".into(),
            status: "Pending".into(),
            booked_by: "B".into(),
        })
        .unwrap();
        assert_eq!(json["providerName"], "A");
        assert_eq!(json["bookedBy"], "B");
    }

    // ---- Consultations ----

    #[test]
    fn test_start_and_end_consultation() {
        let repo = ConsultationRepository::new(db());
        let id = repo.start(7, Some("Dr. Rao")).unwrap();
        assert_eq!(repo.status(id).unwrap().as_deref(), Some("Active"));

        let closed = repo.end(7, Some(300)).unwrap();
        assert_eq!(closed, 1);
        assert_eq!(repo.status(id).unwrap().as_deref(), Some("Completed"));
    }

    #[test]
    fn test_end_only_touches_matching_doctor() {
        let repo = ConsultationRepository::new(db());
        let a = repo.start(1, None).unwrap();
        let b = repo.start(2, Some("Dr. B")).unwrap();
        assert_eq!(repo.end(1, None).unwrap(), 1);
        assert_eq!(repo.status(a).unwrap().as_deref(), Some("Completed"));
        assert_eq!(repo.status(b).unwrap().as_deref(), Some("Active"));
    }

    #[test]
    fn test_end_without_active_is_zero() {
        let repo = ConsultationRepository::new(db());
        assert_eq!(repo.end(99, Some(10)).unwrap(), 0);
    }

    #[test]
    fn test_status_unknown_id() {
        let repo = ConsultationRepository::new(db());
        assert!(repo.status(42).unwrap().is_none());
    }
}
