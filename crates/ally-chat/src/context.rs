//! Conversation context building.
//!
//! Converts prior turns plus the new user message into the `contents`
//! sequence the generation service expects.

use ally_core::types::{Role, Turn};

use crate::types::{Content, Part};

// =============================================================================
// ContextBuilder
// =============================================================================

/// Builds request `contents` from a transcript.
///
/// Pure transformation: order and text are preserved and nothing is
/// truncated. Window enforcement happens before this is called.
pub struct ContextBuilder;

impl ContextBuilder {
    /// Map each historical turn to `{role, parts:[{text}]}` and append the
    /// new message as a final `user` turn.
    pub fn build(history: &[Turn], new_message: &str) -> Vec<Content> {
        let mut contents: Vec<Content> = history.iter().map(content_for).collect();
        contents.push(Content {
            role: Role::User.as_str().to_string(),
            parts: vec![Part::text(new_message)],
        });
        contents
    }
}

fn content_for(turn: &Turn) -> Content {
    Content {
        role: turn.role.as_str().to_string(),
        parts: vec![Part::text(turn.text.clone())],
    }
}

// =============================================================================
// Tests
// =============================================================================
