use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// Top-level configuration for the Ally application.
///
/// Loaded from `~/.ally/config.toml` by default. Missing sections and keys
/// fall back to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllyConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
}

impl AllyConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AllyConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the SQLite database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Address the HTTP server binds to.
    pub bind_address: String,
    /// HTTP server port.
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.ally/data".to_string(),
            log_level: "info".to_string(),
            bind_address: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Remote text-generation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model identifier sent to the service.
    pub model_name: String,
    /// Base URL of the generative language API.
    pub endpoint: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Upper bound on generated tokens per reply.
    pub max_output_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// HTTP timeout for one generation call, in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model_name: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            max_output_tokens: 200,
            temperature: 0.6,
            timeout_secs: 30,
        }
    }
}

/// Conversation guardrails.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum prior turns sent with each request.
    pub max_turns: usize,
    /// Fixed delay before every remote call, in milliseconds.
    pub cooldown_ms: u64,
    /// Turns loaded from the session store per HTTP request.
    pub history_limit: usize,
    /// Display name used when a request carries no language.
    pub default_language: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_turns: 6,
            cooldown_ms: 1200,
            history_limit: 10,
            default_language: "english".to_string(),
        }
    }
}

/// Text-to-speech settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Whether replies are rendered to audio.
    pub enabled: bool,
    /// Translate TTS endpoint.
    pub endpoint: String,
    /// Command used to play audio files in the terminal chat.
    pub player: Option<String>,
    /// HTTP timeout for one synthesis request, in seconds.
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://translate.google.com/translate_tts".to_string(),
            player: None,
            timeout_secs: 10,
        }
    }
}
