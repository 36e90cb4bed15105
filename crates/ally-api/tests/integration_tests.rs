//! Integration tests for the Ally API.
//!
//! Each test builds its own in-memory state with a scripted generation
//! service and a scripted speech synthesizer, then drives the router with
//! `oneshot` requests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;
use tower::ServiceExt;

use ally_api::create_router;
use ally_api::handlers::{ChatResponse, HealthResponse, HistoryResponse};
use ally_api::state::AppState;
use ally_chat::{ChatError, GenerateResponse, GenerativeModel, RequestEnvelope, SpeechSynthesizer};
use ally_core::config::AllyConfig;
use ally_core::language;
use ally_core::types::Role;
use ally_storage::Database;

// =============================================================================
// Helpers
// =============================================================================

/// Generation service that replies with a fixed text or always fails.
struct ScriptedModel {
    reply: Option<String>,
    seen: Mutex<Vec<RequestEnvelope>>,
}

impl ScriptedModel {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(text.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, envelope: &RequestEnvelope) -> Result<GenerateResponse, ChatError> {
        self.seen.lock().unwrap().push(envelope.clone());
        match &self.reply {
            Some(text) => Ok(GenerateResponse {
                text: Some(text.clone()),
                candidates: Vec::new(),
            }),
            None => Err(ChatError::Remote("HTTP 503".to_string())),
        }
    }
}

/// Synthesizer returning fixed bytes, or failing when `bytes` is None.
struct ScriptedSpeech {
    bytes: Option<Vec<u8>>,
}

#[async_trait]
impl SpeechSynthesizer for ScriptedSpeech {
    async fn synthesize(&self, _text: &str, _lang_code: &str) -> Result<Vec<u8>, ChatError> {
        self.bytes
            .clone()
            .ok_or_else(|| ChatError::Speech("offline".to_string()))
    }
}

fn test_config(speech_enabled: bool) -> AllyConfig {
    let mut config = AllyConfig::default();
    config.chat.cooldown_ms = 0;
    config.speech.enabled = speech_enabled;
    config
}

fn make_state_with(
    model: Arc<ScriptedModel>,
    audio: Option<Vec<u8>>,
    speech_enabled: bool,
) -> AppState {
    AppState::new(
        test_config(speech_enabled),
        Database::in_memory().unwrap(),
        model,
        Arc::new(ScriptedSpeech { bytes: audio }),
    )
}

fn make_state() -> AppState {
    make_state_with(ScriptedModel::replying("Hello friend"), Some(b"mp3".to_vec()), true)
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(resp: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = create_router(make_state());
    let resp = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let health: HealthResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(health.status, "healthy");
    assert!(!health.version.is_empty());
}

// =============================================================================
// Chat
// =============================================================================

#[tokio::test]
async fn test_chat_returns_reply_and_audio() {
    let app = create_router(make_state());
    let resp = app
        .oneshot(post_json("/api/chat", r#"{"message":"Hi","session_id":"s1"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let chat: ChatResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(chat.reply, "Hello friend");
    assert_eq!(chat.audio.as_deref(), Some(BASE64.encode(b"mp3").as_str()));
    assert!(chat.error.is_none());
}

#[tokio::test]
async fn test_chat_alias_route() {
    let app = create_router(make_state());
    let resp = app
        .oneshot(post_json("/chat", r#"{"message":"Hi"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_chat_empty_message_rejected() {
    let model = ScriptedModel::replying("unused");
    let state = make_state_with(Arc::clone(&model), None, true);
    let app = create_router(state.clone());

    let resp = app
        .oneshot(post_json("/api/chat", r#"{"message":"   "}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let json = body_json(resp).await;
    assert_eq!(json["reply"], "");
    assert_eq!(json["error"], "Empty message");
    assert!(model.seen.lock().unwrap().is_empty());
    assert!(state.sessions.read("default", 10).unwrap().is_empty());
}

#[tokio::test]
async fn test_chat_missing_message_rejected() {
    let app = create_router(make_state());
    let resp = app.oneshot(post_json("/api/chat", "{}")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_persists_user_then_model() {
    let state = make_state();
    let app = create_router(state.clone());
    app.oneshot(post_json("/api/chat", r#"{"message":" Hello ","session_id":"s1"}"#))
        .await
        .unwrap();

    let turns = state.sessions.read("s1", 10).unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[0].text, "Hello");
    assert_eq!(turns[1].role, Role::Model);
    assert_eq!(turns[1].text, "Hello friend");
}

#[tokio::test]
async fn test_chat_failure_returns_localized_fallback() {
    let state = make_state_with(ScriptedModel::failing(), Some(b"mp3".to_vec()), true);
    let app = create_router(state.clone());
    let resp = app
        .oneshot(post_json(
            "/api/chat",
            r#"{"message":"Namaste","language":"Hindi","session_id":"h"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let chat: ChatResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(chat.reply, language::fallback_for("hi"));

    // The fallback is stored like any other reply.
    let turns = state.sessions.read("h", 10).unwrap();
    assert_eq!(turns[1].text, language::fallback_for("hi"));
}

#[tokio::test]
async fn test_chat_unknown_language_uses_english() {
    let model = ScriptedModel::replying("ok");
    let app = create_router(make_state_with(Arc::clone(&model), None, false));
    app.oneshot(post_json("/api/chat", r#"{"message":"Hi","language":"Klingon"}"#))
        .await
        .unwrap();

    let seen = model.seen.lock().unwrap();
    assert!(seen[0]
        .system_instruction
        .ends_with(language::instruction_for("en")));
}

#[tokio::test]
async fn test_chat_speech_failure_gives_empty_audio() {
    let app = create_router(make_state_with(ScriptedModel::replying("Hi"), None, true));
    let resp = app
        .oneshot(post_json("/api/chat", r#"{"message":"Hi"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["reply"], "Hi");
    assert_eq!(json["audio"], "");
}

#[tokio::test]
async fn test_chat_speech_disabled_omits_audio() {
    let app = create_router(make_state_with(
        ScriptedModel::replying("Hi"),
        Some(b"mp3".to_vec()),
        false,
    ));
    let resp = app
        .oneshot(post_json("/api/chat", r#"{"message":"Hi"}"#))
        .await
        .unwrap();

    let json = body_json(resp).await;
    assert!(json.get("audio").is_none());
}

#[tokio::test]
async fn test_chat_sends_stored_history() {
    let model = ScriptedModel::replying("again");
    let state = make_state_with(Arc::clone(&model), None, false);
    for i in 0..5 {
        let app = create_router(state.clone());
        app.oneshot(post_json(
            "/api/chat",
            &format!(r#"{{"message":"m{}","session_id":"w"}}"#, i),
        ))
        .await
        .unwrap();
    }

    let seen = model.seen.lock().unwrap();
    // First call has only the new message.
    assert_eq!(seen[0].contents.len(), 1);
    // Later calls are capped at six prior turns plus the new message.
    assert_eq!(seen[4].contents.len(), 7);
    assert_eq!(seen[4].contents[6].parts[0].text.as_deref(), Some("m4"));
}

#[tokio::test]
async fn test_chat_history_endpoint() {
    let state = make_state();
    create_router(state.clone())
        .oneshot(post_json("/api/chat", r#"{"message":"Hi","session_id":"abc"}"#))
        .await
        .unwrap();

    let resp = create_router(state)
        .oneshot(get("/api/chat/history?session_id=abc&limit=1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let history: HistoryResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(history.session_id, "abc");
    assert_eq!(history.turns.len(), 1);
    assert_eq!(history.turns[0].role, Role::Model);
}

// =============================================================================
// Marketplace
// =============================================================================

#[tokio::test]
async fn test_caregivers_list() {
    let app = create_router(make_state());
    let resp = app
        .oneshot(get("/api/marketplace/caregivers"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    let list = json.as_array().unwrap();
    assert_eq!(list.len(), 4);
    assert_eq!(list[0]["name"], "Sarah Jenkins");
    assert_eq!(list[0]["trustScore"], 98);
    assert_eq!(list[3]["specialty"], "Emergency");
}

#[tokio::test]
async fn test_book_and_list() {
    let state = make_state();
    let resp = create_router(state.clone())
        .oneshot(post_json(
            "/api/marketplace/book",
            r#"{"providerId":1,"providerName":"Sarah Jenkins","service":"Medical Care",
                "date":"2026-12-25","time":"10:00","bookedBy":"Test User"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Booking request sent successfully!");
    assert!(json["bookingId"].as_i64().unwrap() > 0);

    let resp = create_router(state)
        .oneshot(get("/api/marketplace/bookings"))
        .await
        .unwrap();
    let json = body_json(resp).await;
    let list = json.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["providerName"], "Sarah Jenkins");
    assert_eq!(list[0]["status"], "Pending");
}

#[tokio::test]
async fn test_book_missing_fields() {
    let state = make_state();
    let resp = create_router(state.clone())
        .oneshot(post_json(
            "/api/marketplace/book",
            r#"{"providerName":"Sarah Jenkins","date":"2026-12-25"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Missing required fields");

    let resp = create_router(state.clone())
        .oneshot(post_json("/api/marketplace/book", r#"{"providerId":2}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(state.bookings.list().unwrap().is_empty());
}

// =============================================================================
// Telemedicine
// =============================================================================

#[tokio::test]
async fn test_telemedicine_start_and_end() {
    let state = make_state();
    let resp = create_router(state.clone())
        .oneshot(post_json(
            "/api/telemedicine/start",
            r#"{"doctorId":3,"doctorName":"Dr. Patel"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    let call_id = json["callId"].as_i64().unwrap();

    let resp = create_router(state.clone())
        .oneshot(post_json(
            "/api/telemedicine/end",
            r#"{"doctorId":3,"duration":120}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["success"], true);

    assert_eq!(
        state.consultations.status(call_id).unwrap().as_deref(),
        Some("Completed")
    );
}

#[tokio::test]
async fn test_telemedicine_start_requires_doctor() {
    let app = create_router(make_state());
    let resp = app
        .oneshot(post_json("/api/telemedicine/start", r#"{"doctorName":"X"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "bad_request");
}

#[tokio::test]
async fn test_telemedicine_end_without_doctor_is_noop() {
    let state = make_state();
    let call_id = state.consultations.start(5, Some("Dr. Okafor")).unwrap();

    let resp = create_router(state.clone())
        .oneshot(post_json("/api/telemedicine/end", r#"{"duration":30}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["success"], true);

    // Nothing was closed.
    assert_eq!(
        state.consultations.status(call_id).unwrap().as_deref(),
        Some("Active")
    );
}
