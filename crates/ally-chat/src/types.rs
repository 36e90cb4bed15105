//! Request envelope and response wire types for the generation service.
//!
//! Field names follow the generative language REST API (camelCase on the
//! wire). Response types default every field so that partial or unexpected
//! bodies still deserialize and can be judged by the extractors.

use serde::{Deserialize, Serialize};

/// One text fragment of a message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// One role-tagged message in the request `contents`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

/// Fully assembled request for one generation call. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    pub system_instruction: String,
    pub contents: Vec<Content>,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentBody<'a> {
    pub system_instruction: SystemInstruction<'a>,
    pub contents: &'a [Content],
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct SystemInstruction<'a> {
    pub parts: [TextRef<'a>; 1],
}

#[derive(Debug, Serialize)]
pub(crate) struct TextRef<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl<'a> From<&'a RequestEnvelope> for GenerateContentBody<'a> {
    fn from(envelope: &'a RequestEnvelope) -> Self {
        Self {
            system_instruction: SystemInstruction {
                parts: [TextRef {
                    text: &envelope.system_instruction,
                }],
            },
            contents: &envelope.contents,
            generation_config: GenerationConfig {
                max_output_tokens: envelope.max_output_tokens,
                temperature: envelope.temperature,
            },
        }
    }
}

/// Response from the generation service.
///
/// Either shape may be present: a direct `text` field (returned by SDK-style
/// proxies) or the nested `candidates[0].content.parts` structure.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default)]
    pub role: Option<String>,
}
