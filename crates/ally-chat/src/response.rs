//! Reply extraction from generation responses.
//!
//! The service may answer with a direct `text` field or only with the
//! nested candidate/parts structure. Each shape has its own extractor and
//! the extractors are tried in a fixed order; the first one that yields
//! non-empty trimmed text wins.

use crate::types::GenerateResponse;

/// One strategy for pulling reply text out of a response.
pub trait ReplyExtractor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Raw (untrimmed) text for this shape, if present.
    fn extract(&self, response: &GenerateResponse) -> Option<String>;
}

/// Reads the top-level `text` field.
pub struct DirectText;

impl ReplyExtractor for DirectText {
    fn name(&self) -> &'static str {
        "direct_text"
    }

    fn extract(&self, response: &GenerateResponse) -> Option<String> {
        response.text.clone()
    }
}

/// Concatenates `candidates[0].content.parts[*].text`, skipping parts
/// without text.
pub struct CandidateParts;

impl ReplyExtractor for CandidateParts {
    fn name(&self) -> &'static str {
        "candidate_parts"
    }

    fn extract(&self, response: &GenerateResponse) -> Option<String> {
        let content = response.candidates.first()?.content.as_ref()?;
        Some(
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<String>(),
        )
    }
}

/// Extractors in the order they are tried.
pub static EXTRACTORS: [&dyn ReplyExtractor; 2] = [&DirectText, &CandidateParts];

/// Result of running the extractor chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Non-empty trimmed reply and the extractor that produced it.
    Reply { text: String, path: &'static str },
    /// No extractor produced text.
    Empty,
}

/// Run [`EXTRACTORS`] in order and return the first non-empty trimmed text.
pub fn extract_reply(response: &GenerateResponse) -> Extraction {
    for extractor in EXTRACTORS.iter() {
        if let Some(raw) = extractor.extract(response) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Extraction::Reply {
                    text: trimmed.to_string(),
                    path: extractor.name(),
                };
            }
        }
    }
    Extraction::Empty
}

// =============================================================================
// Tests
// =============================================================================
