//! Conversation engine for SeniorCare Ally.
//!
//! Builds model requests from prior turns, enforces the turn window and
//! cooldown, normalizes the remote service's reply (or substitutes a
//! localized fallback), and renders replies to speech.

pub mod context;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod response;
pub mod types;
pub mod voice;

pub use context::ContextBuilder;
pub use error::ChatError;
pub use model::{GeminiClient, GenerativeModel};
pub use orchestrator::{ConversationOrchestrator, OrchestratorSettings};
pub use response::{extract_reply, Extraction, ReplyExtractor};
pub use types::{Candidate, CandidateContent, Content, GenerateResponse, Part, RequestEnvelope};
pub use voice::{
    clean_for_speech, SpeechOutcome, SpeechSynthesizer, TranslateTtsSynthesizer, VoiceInterface,
};
