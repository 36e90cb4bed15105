//! Error types for the conversation engine.

/// Errors from the chat engine and its remote collaborators.
///
/// None of these cross the orchestrator boundary: generation failures turn
/// into the localized fallback reply and speech failures into a skipped
/// [`SpeechOutcome`](crate::voice::SpeechOutcome).
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("remote service error: {0}")]
    Remote(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("speech error: {0}")]
    Speech(String),
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ChatError::MalformedResponse(err.to_string())
        } else {
            ChatError::Remote(err.to_string())
        }
    }
}
