//! Ally Storage crate - SQLite persistence for conversations, bookings,
//! and consultations.
//!
//! Provides a WAL-mode SQLite database with migrations and repositories
//! for the session transcript log and the marketplace/telemedicine records.

pub mod db;
pub mod migrations;
pub mod repository;

pub use db::Database;
pub use repository::{
    Booking, BookingRepository, ConsultationRepository, ConversationRepository, NewBooking,
    SessionStore,
};
