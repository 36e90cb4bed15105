//! Speech output for replies.
//!
//! Replies are sanitized for speech, rendered to MP3 through a
//! [`SpeechSynthesizer`], and optionally played in the terminal chat.
//! Speech is best-effort: every failure becomes [`SpeechOutcome::Skipped`]
//! and never reaches the text reply path.

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use regex::Regex;
use reqwest::Client;
use tracing::{debug, warn};

use ally_core::config::SpeechConfig;

use crate::error::ChatError;

/// Markup characters that would be read aloud or mispronounced.
static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*#_`~>|<={}\[\]();]").expect("Invalid markup regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Longest text accepted by one translate TTS request.
const TTS_CHUNK_CHARS: usize = 100;

// =============================================================================
// Sanitizer
// =============================================================================

/// Strip markup and formatting from `text` before speech synthesis.
///
/// Removes `* # _ ` ~ > | < = { } [ ] ( ) ;`, turns colons into periods and
/// hyphens into spaces, then collapses whitespace runs and trims.
pub fn clean_for_speech(text: &str) -> String {
    let stripped = MARKUP.replace_all(text, "");
    let paused = stripped.replace(':', ".").replace('-', " ");
    WHITESPACE.replace_all(&paused, " ").trim().to_string()
}

/// Split `text` into chunks of at most `max_chars` characters, breaking on
/// spaces where possible.
pub fn split_for_tts(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { word_len + 1 };
        if current_len + needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

// =============================================================================
// Synthesizers
// =============================================================================

/// Text-to-speech backend: `(clean text, language code) -> audio bytes`.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, lang_code: &str) -> Result<Vec<u8>, ChatError>;
}

/// Google Translate TTS endpoint, returning concatenated MP3 frames.
pub struct TranslateTtsSynthesizer {
    client: Client,
    endpoint: String,
}

impl TranslateTtsSynthesizer {
    pub fn from_config(config: &SpeechConfig) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChatError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for TranslateTtsSynthesizer {
    async fn synthesize(&self, text: &str, lang_code: &str) -> Result<Vec<u8>, ChatError> {
        let chunks = split_for_tts(text, TTS_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(ChatError::Speech("no text to synthesize".to_string()));
        }

        let total = chunks.len().to_string();
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let idx = idx.to_string();
            let textlen = chunk.chars().count().to_string();
            let response = self
                .client
                .get(&self.endpoint)
                .query(&[
                    ("ie", "UTF-8"),
                    ("q", chunk.as_str()),
                    ("tl", lang_code),
                    ("client", "tw-ob"),
                    ("idx", idx.as_str()),
                    ("total", total.as_str()),
                    ("textlen", textlen.as_str()),
                ])
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(ChatError::Speech(format!("TTS HTTP {}", status)));
            }
            audio.extend_from_slice(&response.bytes().await?);
        }
        Ok(audio)
    }
}

// =============================================================================
// VoiceInterface
// =============================================================================

/// Outcome of a best-effort speech attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechOutcome {
    /// Audio was produced (and played, for [`VoiceInterface::speak`]).
    Rendered(Vec<u8>),
    /// The attempt was abandoned; the reason is kept for logs and tests.
    Skipped(String),
}

impl SpeechOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, SpeechOutcome::Rendered(_))
    }

    /// Base64 audio, or an empty string when skipped.
    pub fn to_base64(&self) -> String {
        match self {
            SpeechOutcome::Rendered(bytes) => BASE64.encode(bytes),
            SpeechOutcome::Skipped(_) => String::new(),
        }
    }
}

/// Sanitizes, renders, and plays replies.
pub struct VoiceInterface {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    /// Whether speech is rendered at all.
    pub enabled: bool,
    /// Player command for terminal playback (program plus optional args).
    pub player: Option<String>,
    /// Directory for temporary audio files.
    pub scratch_dir: PathBuf,
}

impl VoiceInterface {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, enabled: bool) -> Self {
        Self {
            synthesizer,
            enabled,
            player: None,
            scratch_dir: std::env::temp_dir(),
        }
    }

    pub fn with_player(mut self, player: Option<String>) -> Self {
        self.player = player.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn with_scratch_dir(mut self, dir: PathBuf) -> Self {
        self.scratch_dir = dir;
        self
    }

    /// Sanitize `text` and synthesize it in `lang_code`.
    pub async fn render(&self, text: &str, lang_code: &str) -> SpeechOutcome {
        if !self.enabled {
            return SpeechOutcome::Skipped("speech disabled".to_string());
        }

        let clean = clean_for_speech(text);
        if clean.is_empty() {
            return SpeechOutcome::Skipped("nothing to speak".to_string());
        }

        match self.synthesizer.synthesize(&clean, lang_code).await {
            Ok(bytes) if bytes.is_empty() => {
                SpeechOutcome::Skipped("synthesizer returned no audio".to_string())
            }
            Ok(bytes) => {
                debug!(lang = lang_code, bytes = bytes.len(), "Speech rendered");
                SpeechOutcome::Rendered(bytes)
            }
            Err(e) => {
                warn!(error = %e, lang = lang_code, "Speech synthesis failed");
                SpeechOutcome::Skipped(e.to_string())
            }
        }
    }

    /// Render `text` and play it through the configured player.
    ///
    /// Audio goes to a uniquely named temporary file that is removed once
    /// playback ends, whether or not the player succeeded.
    pub async fn speak(&self, text: &str, lang_code: &str) -> SpeechOutcome {
        let bytes = match self.render(text, lang_code).await {
            SpeechOutcome::Rendered(bytes) => bytes,
            skipped => return skipped,
        };

        let Some(player) = self.player.as_deref() else {
            return SpeechOutcome::Skipped("no audio player configured".to_string());
        };

        match self.play(player, &bytes).await {
            Ok(()) => SpeechOutcome::Rendered(bytes),
            Err(e) => {
                warn!(error = %e, player, "Speech playback failed");
                SpeechOutcome::Skipped(e.to_string())
            }
        }
    }

    async fn play(&self, player: &str, bytes: &[u8]) -> Result<(), ChatError> {
        let mut parts = player.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| ChatError::Speech("empty player command".to_string()))?;

        let mut file = tempfile::Builder::new()
            .prefix("voice_")
            .suffix(".mp3")
            .tempfile_in(&self.scratch_dir)
            .map_err(|e| ChatError::Speech(format!("temp file: {}", e)))?;
        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|e| ChatError::Speech(format!("temp file: {}", e)))?;

        let status = tokio::process::Command::new(program)
            .args(parts)
            .arg(file.path())
            .status()
            .await
            .map_err(|e| ChatError::Speech(format!("player '{}': {}", program, e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(ChatError::Speech(format!("player exited with {}", status)))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
