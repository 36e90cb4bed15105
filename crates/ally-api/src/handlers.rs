//! Route handler functions for all API endpoints.
//!
//! Each handler extracts query parameters or JSON bodies via axum
//! extractors, interacts with AppState services, and returns JSON responses.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ally_core::language;
use ally_core::types::{Role, Turn};
use ally_storage::{Booking, NewBooking};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Chat
// =============================================================================

/// Request body for POST /chat.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub language: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    /// Base64 MP3; empty when rendering failed, absent when speech is off.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /chat - answer one user message within a session.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<(StatusCode, Json<ChatResponse>), ApiError> {
    let message = req.message.as_deref().unwrap_or("").trim().to_string();
    if message.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ChatResponse {
                reply: String::new(),
                audio: None,
                error: Some("Empty message".to_string()),
            }),
        ));
    }

    let language = req
        .language
        .as_deref()
        .filter(|l| !l.trim().is_empty())
        .unwrap_or(state.config.chat.default_language.as_str());
    let lang_code = language::resolve_code(language);
    let session_id = req
        .session_id
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "default".to_string());

    let mut history = state
        .sessions
        .read(&session_id, state.config.chat.history_limit)?;
    debug!(session = %session_id, turns = history.len(), lang = lang_code, "Chat request");

    let reply = state
        .orchestrator
        .ask(&mut history, &message, lang_code)
        .await;

    state.sessions.append(&session_id, Role::User, &message)?;
    state.sessions.append(&session_id, Role::Model, &reply)?;

    let audio = if state.voice.enabled {
        Some(state.voice.render(&reply, lang_code).await.to_base64())
    } else {
        None
    };

    Ok((
        StatusCode::OK,
        Json(ChatResponse {
            reply,
            audio,
            error: None,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub session_id: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub turns: Vec<Turn>,
}

/// GET /api/chat/history - last turns of a session, oldest first.
pub async fn chat_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let session_id = params.session_id.unwrap_or_else(|| "default".to_string());
    let limit = params.limit.unwrap_or(state.config.chat.history_limit);
    let turns = state.sessions.read(&session_id, limit)?;
    Ok(Json(HistoryResponse { session_id, turns }))
}

// =============================================================================
// Marketplace
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caregiver {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub rate: String,
    pub trust_score: u8,
    pub specialty: String,
}

const CAREGIVERS: [(i64, &str, &str, &str, u8, &str); 4] = [
    (1, "Sarah Jenkins", "Certified Nurse", "$25/hr", 98, "Medical Care"),
    (2, "David Chen", "Physiotherapist", "$40/hr", 95, "Therapy"),
    (3, "Maria Rodriguez", "Home Companion", "$18/hr", 92, "Companionship"),
    (4, "James Wilson", "Emergency EMT", "$50/hr", 99, "Emergency"),
];

/// GET /api/marketplace/caregivers - the provider directory.
pub async fn caregivers() -> Json<Vec<Caregiver>> {
    Json(
        CAREGIVERS
            .iter()
            .map(|&(id, name, role, rate, trust_score, specialty)| Caregiver {
                id,
                name: name.to_string(),
                role: role.to_string(),
                rate: rate.to_string(),
                trust_score,
                specialty: specialty.to_string(),
            })
            .collect(),
    )
}

/// Request body for POST /api/marketplace/book.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub provider_id: Option<i64>,
    pub provider_name: Option<String>,
    pub service: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub booked_by: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub success: bool,
    pub booking_id: i64,
    pub message: String,
}

/// POST /api/marketplace/book - request a caregiver visit.
pub async fn book(
    State(state): State<AppState>,
    Json(req): Json<BookRequest>,
) -> Result<Response, ApiError> {
    let (Some(provider_id), Some(date)) = (
        req.provider_id.filter(|id| *id != 0),
        req.date.filter(|d| !d.is_empty()),
    ) else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Missing required fields" })),
        )
            .into_response());
    };

    let booking = NewBooking {
        provider_id,
        provider_name: req.provider_name.unwrap_or_default(),
        service: req.service.unwrap_or_default(),
        date,
        time: req.time.unwrap_or_default(),
        booked_by: req.booked_by.unwrap_or_default(),
    };
    let booking_id = state.bookings.add(&booking)?;
    info!(booking_id, provider_id, "Booking created");

    Ok(Json(BookResponse {
        success: true,
        booking_id,
        message: "Booking request sent successfully!".to_string(),
    })
    .into_response())
}

/// GET /api/marketplace/bookings - all bookings, newest first.
pub async fn bookings(State(state): State<AppState>) -> Result<Json<Vec<Booking>>, ApiError> {
    Ok(Json(state.bookings.list()?))
}

// =============================================================================
// Telemedicine
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCallRequest {
    pub doctor_id: Option<i64>,
    pub doctor_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCallResponse {
    pub success: bool,
    pub call_id: i64,
}

/// POST /api/telemedicine/start - open a consultation.
pub async fn telemedicine_start(
    State(state): State<AppState>,
    Json(req): Json<StartCallRequest>,
) -> Result<Json<StartCallResponse>, ApiError> {
    let doctor_id = req
        .doctor_id
        .ok_or_else(|| ApiError::BadRequest("doctorId is required".to_string()))?;
    let call_id = state
        .consultations
        .start(doctor_id, req.doctor_name.as_deref())?;
    info!(call_id, doctor_id, "Consultation started");
    Ok(Json(StartCallResponse {
        success: true,
        call_id,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndCallRequest {
    pub doctor_id: Option<i64>,
    pub duration: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// POST /api/telemedicine/end - close the doctor's active consultations.
///
/// Without a `doctorId` there is nothing to close; the call still succeeds.
pub async fn telemedicine_end(
    State(state): State<AppState>,
    Json(req): Json<EndCallRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    match req.doctor_id {
        Some(doctor_id) => {
            let closed = state.consultations.end(doctor_id, req.duration)?;
            info!(doctor_id, closed, "Consultation ended");
        }
        None => debug!("End call without doctorId; nothing to close"),
    }
    Ok(Json(SuccessResponse { success: true }))
}

// =============================================================================
// Health
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// GET /health - liveness and uptime.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
