//! Shared foundation for the SeniorCare Ally workspace.
//!
//! Holds configuration, the top-level error type, the conversation data
//! model, and the static language tables used for localization.

pub mod config;
pub mod error;
pub mod language;
pub mod types;

pub use config::AllyConfig;
pub use error::{AllyError, Result};
pub use types::{Role, Turn};
