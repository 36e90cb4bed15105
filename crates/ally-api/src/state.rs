//! Application state shared across all route handlers.
//!
//! AppState holds references to all services and shared resources.
//! It is passed to handlers via axum's State extractor.

use std::sync::Arc;
use std::time::Instant;

use ally_chat::{
    ConversationOrchestrator, GenerativeModel, OrchestratorSettings, SpeechSynthesizer,
    VoiceInterface,
};
use ally_core::config::AllyConfig;
use ally_storage::{
    BookingRepository, ConsultationRepository, ConversationRepository, Database, SessionStore,
};

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks. The
/// orchestrator is stateless; per-session history lives in `sessions`.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AllyConfig>,
    /// Per-session transcript store.
    pub sessions: Arc<dyn SessionStore>,
    pub bookings: Arc<BookingRepository>,
    pub consultations: Arc<ConsultationRepository>,
    /// Reply generation with guardrails.
    pub orchestrator: Arc<ConversationOrchestrator>,
    /// Best-effort speech rendering for replies.
    pub voice: Arc<VoiceInterface>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Wire the services together from config and the two remote seams.
    pub fn new(
        config: AllyConfig,
        database: Database,
        model: Arc<dyn GenerativeModel>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        let database = Arc::new(database);
        let settings = OrchestratorSettings::from_config(&config.chat, &config.llm);
        let voice = VoiceInterface::new(synthesizer, config.speech.enabled);

        Self {
            sessions: Arc::new(ConversationRepository::new(Arc::clone(&database))),
            bookings: Arc::new(BookingRepository::new(Arc::clone(&database))),
            consultations: Arc::new(ConsultationRepository::new(Arc::clone(&database))),
            orchestrator: Arc::new(ConversationOrchestrator::new(model, settings)),
            voice: Arc::new(voice),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }
}
