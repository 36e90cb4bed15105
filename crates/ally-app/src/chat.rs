//! Interactive terminal conversation.
//!
//! Keeps the transcript in memory for the life of the process; nothing is
//! written to the session store.

use std::sync::Arc;

use ally_chat::ConversationOrchestrator;
use ally_core::language;
use ally_core::types::Turn;

/// What the terminal loop should do with one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Print and speak the reply, then keep reading.
    Reply(String),
    /// Print and speak the farewell, then stop.
    Farewell(&'static str),
    /// Blank input; read again.
    Skip,
}

pub struct TerminalChat {
    orchestrator: Arc<ConversationOrchestrator>,
    lang_code: &'static str,
    history: Vec<Turn>,
}

impl TerminalChat {
    /// Start a conversation. The history is seeded with a user turn noting
    /// the start time (`YYYY-MM-DD HH:MM`).
    pub fn new(
        orchestrator: Arc<ConversationOrchestrator>,
        lang_code: &'static str,
        started_at: &str,
    ) -> Self {
        Self {
            orchestrator,
            lang_code,
            history: vec![Turn::user(format!("Conversation started at {}.", started_at))],
        }
    }

    pub fn lang_code(&self) -> &'static str {
        self.lang_code
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Handle one line of user input.
    pub async fn step(&mut self, input: &str) -> Step {
        let message = input.trim();
        if matches!(message.to_lowercase().as_str(), "exit" | "quit") {
            return Step::Farewell(language::farewell_for(self.lang_code));
        }
        if message.is_empty() {
            return Step::Skip;
        }

        let reply = self
            .orchestrator
            .ask(&mut self.history, message, self.lang_code)
            .await;
        self.history.push(Turn::user(message));
        self.history.push(Turn::model(reply.clone()));
        Step::Reply(reply)
    }
}

/// Capitalized display name for the language menu.
pub fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
