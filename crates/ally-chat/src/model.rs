//! Remote text-generation service.
//!
//! [`GenerativeModel`] is the single seam between the orchestrator and the
//! remote service. [`GeminiClient`] speaks the generative language REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use ally_core::config::LlmConfig;

use crate::error::ChatError;
use crate::types::{GenerateContentBody, GenerateResponse, RequestEnvelope};

/// A request/response text-completion service.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Send one envelope and return the raw response.
    async fn generate(&self, envelope: &RequestEnvelope) -> Result<GenerateResponse, ChatError>;
}

/// Client for the `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model_name: String,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Build a client from config, reading the API key from the configured
    /// environment variable.
    ///
    /// A missing key is not an error here; calls fail with
    /// [`ChatError::Configuration`] instead so the caller still gets a
    /// fallback reply.
    pub fn from_config(config: &LlmConfig) -> Result<Self, ChatError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!(
                env = %config.api_key_env,
                "API key not set; generation requests will return the fallback reply"
            );
        }
        Self::new(config, api_key)
    }

    /// Build a client with an explicit API key.
    pub fn new(config: &LlmConfig, api_key: Option<String>) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChatError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model_name: config.model_name.clone(),
            api_key,
        })
    }

    /// Full `generateContent` URL for the configured model.
    pub fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model_name
        )
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, envelope: &RequestEnvelope) -> Result<GenerateResponse, ChatError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ChatError::Configuration("generation API key is not configured".to_string())
        })?;

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&GenerateContentBody::from(envelope))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ChatError::Remote(format!("HTTP {}: {}", status, error_text)));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ChatError::MalformedResponse(e.to_string()))
    }
}
