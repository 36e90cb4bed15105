//! Conversation orchestrator: the single path from a user utterance to a
//! reply string.
//!
//! Per call: truncate the history window, wait out the cooldown, build the
//! envelope, invoke the model once, and normalize the response. Any failure
//! yields the localized fallback for the requested language. The
//! orchestrator holds no per-session state; persistence belongs to the
//! caller.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use ally_core::config::{ChatConfig, LlmConfig};
use ally_core::language;
use ally_core::types::Turn;

use crate::context::ContextBuilder;
use crate::model::GenerativeModel;
use crate::response::{extract_reply, Extraction};
use crate::types::RequestEnvelope;

/// Maximum prior turns sent with a request.
pub const MAX_TURNS: usize = 6;

/// Fixed delay before every remote call.
pub const COOLDOWN: Duration = Duration::from_millis(1200);

/// Persona and safety framing sent with every request.
pub const SYSTEM_INSTRUCTION: &str = "\
You are a Senior Care Assistant chatbot called 'SeniorCare Ally'.

Goals:
- Help older adults and family caregivers with daily questions.
- Be calm, polite, and easy to understand.
- Encourage safety, dignity, and independence.

Rules:
- You are NOT a doctor and cannot diagnose or prescribe.
- For serious symptoms (chest pain, breathing trouble, confusion, falls, suicidal thoughts),
  clearly advise contacting a doctor or emergency services immediately.
- Use short paragraphs and simple language.
- Offer practical advice: routines, reminders, fall prevention, medication organization,
  emotional well-being, light exercise, and diet.
- If unsure, say so and suggest professional help.

Style:
- Respectful, supportive, non-judgmental.";

/// Guardrail and generation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    pub max_turns: usize,
    pub cooldown: Duration,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_turns: MAX_TURNS,
            cooldown: COOLDOWN,
            max_output_tokens: 200,
            temperature: 0.6,
        }
    }
}

impl OrchestratorSettings {
    pub fn from_config(chat: &ChatConfig, llm: &LlmConfig) -> Self {
        Self {
            max_turns: chat.max_turns,
            cooldown: Duration::from_millis(chat.cooldown_ms),
            max_output_tokens: llm.max_output_tokens,
            temperature: llm.temperature,
        }
    }
}

/// Stateless coordinator between callers and the generation service.
pub struct ConversationOrchestrator {
    model: Arc<dyn GenerativeModel>,
    settings: OrchestratorSettings,
}

impl ConversationOrchestrator {
    pub fn new(model: Arc<dyn GenerativeModel>, settings: OrchestratorSettings) -> Self {
        Self { model, settings }
    }

    /// Produce a reply for `user_message` given the prior turns.
    ///
    /// `history` is truncated in place to the most recent `max_turns`
    /// entries. The returned string is never empty: it is either the
    /// trimmed model reply or exactly `language::fallback_for(lang_code)`.
    #[instrument(skip_all, fields(lang = lang_code))]
    pub async fn ask(
        &self,
        history: &mut Vec<Turn>,
        user_message: &str,
        lang_code: &str,
    ) -> String {
        enforce_window(history, self.settings.max_turns);

        if !self.settings.cooldown.is_zero() {
            tokio::time::sleep(self.settings.cooldown).await;
        }

        let envelope = self.envelope_for(history, user_message, lang_code);
        debug!(
            lang = lang_code,
            contents = envelope.contents.len(),
            "Sending generation request"
        );

        let response = match self.model.generate(&envelope).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, lang = lang_code, "Generation failed; using fallback reply");
                return language::fallback_for(lang_code).to_string();
            }
        };

        match extract_reply(&response) {
            Extraction::Reply { text, path } => {
                debug!(path, reply_len = text.len(), "Reply extracted");
                text
            }
            Extraction::Empty => {
                warn!(lang = lang_code, "Generation returned no text; using fallback reply");
                language::fallback_for(lang_code).to_string()
            }
        }
    }

    /// Assemble the request for `history` (already windowed) plus the new
    /// message.
    pub fn envelope_for(
        &self,
        history: &[Turn],
        user_message: &str,
        lang_code: &str,
    ) -> RequestEnvelope {
        RequestEnvelope {
            system_instruction: format!(
                "{}\n\n{}",
                SYSTEM_INSTRUCTION,
                language::instruction_for(lang_code)
            ),
            contents: ContextBuilder::build(history, user_message),
            max_output_tokens: self.settings.max_output_tokens,
            temperature: self.settings.temperature,
        }
    }
}

/// Keep only the most recent `max_turns` entries.
pub fn enforce_window(history: &mut Vec<Turn>, max_turns: usize) {
    if history.len() > max_turns {
        let excess = history.len() - max_turns;
        history.drain(..excess);
    }
}

// =============================================================================
// Tests
// =============================================================================
