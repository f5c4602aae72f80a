//! Wire types for the Generative Language `generateContent` endpoint, plus
//! response classification and model-name validation.

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::types::{InferenceReply, InferenceRequest};

// ──────────────────────────────────────────────
// Request
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

/// Base64-encoded attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Sampling options. Low temperature: the summary should be reproducible.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_output_tokens: 4096,
        }
    }
}

impl GenerateContentRequest {
    /// One user turn: the prompt text, then the image if any.
    pub fn from_inference(request: &InferenceRequest) -> Self {
        let mut parts = vec![Part {
            text: Some(request.prompt.clone()),
            inline_data: None,
        }];
        if let Some(image) = &request.image {
            parts.push(Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: image.mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(&image.data),
                }),
            });
        }

        Self {
            contents: vec![Content {
                role: Some("user".into()),
                parts,
            }],
            generation_config: Some(GenerationConfig::default()),
        }
    }
}

// ──────────────────────────────────────────────
// Response
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Finish reasons meaning the model refused for policy reasons. Deterministic
/// for the same input.
pub const POLICY_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
    "RECITATION",
    "IMAGE_SAFETY",
];

impl GenerateContentResponse {
    /// Classify the payload.
    ///
    /// 1. A prompt-level `blockReason` is a block, whatever else is present.
    /// 2. Non-blank text in the first candidate is an answer.
    /// 3. No text plus a policy finish reason is a block.
    /// 4. Anything else is empty.
    pub fn into_reply(self) -> InferenceReply {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return InferenceReply::Blocked { reason };
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            return InferenceReply::Empty;
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if !text.trim().is_empty() {
            return InferenceReply::Text(text.trim().to_string());
        }

        match candidate.finish_reason {
            Some(reason) if POLICY_FINISH_REASONS.contains(&reason.as_str()) => {
                InferenceReply::Blocked { reason }
            }
            _ => InferenceReply::Empty,
        }
    }
}

// ──────────────────────────────────────────────
// Error envelope
// ──────────────────────────────────────────────

/// Google API error body: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Turn a non-2xx body into a single description, keeping the status token
/// (e.g. `RESOURCE_EXHAUSTED`) since classification keys off it.
pub fn describe_error_body(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(status) => format!("{status}: {}", envelope.error.message),
            None => envelope.error.message,
        },
        Err(_) => body.trim().to_string(),
    }
}

// ──────────────────────────────────────────────
// Validators
// ──────────────────────────────────────────────

/// Model identifiers end up in the URL path. Accept `gemini-1.5-flash`,
/// `gemini-2.0-flash-001`, `models/gemini-pro`; reject anything with path
/// traversal, query characters or whitespace.
pub fn validate_model_name(name: &str) -> bool {
    let name = name.strip_prefix("models/").unwrap_or(name);
    !name.is_empty()
        && name.len() <= 128
        && !name.starts_with(&['.', '-'][..])
        && !name.contains("..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
