use serde::Serialize;
use uuid::Uuid;

use super::InferenceError;
use crate::pipeline::preparation::{ImageHandle, Modality, PreparationError, PreparedContent};

// ──────────────────────────────────────────────
// Request
// ──────────────────────────────────────────────

/// One submitted report. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    id: Uuid,
    content: PreparedContent,
}

impl AnalysisRequest {
    pub fn image(handle: ImageHandle) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: PreparedContent::Image(handle),
        }
    }

    /// Text requests must carry at least one non-whitespace character.
    pub fn text(text: &str) -> Result<Self, PreparationError> {
        if text.trim().is_empty() {
            return Err(PreparationError::NoTextFound);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            content: PreparedContent::Text(text.to_string()),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn content(&self) -> &PreparedContent {
        &self.content
    }

    pub fn modality(&self) -> Modality {
        self.content.modality()
    }
}

// ──────────────────────────────────────────────
// Outcome
// ──────────────────────────────────────────────

/// Why an analysis ended in a non-retryable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FatalCause {
    /// Rate limit or quota exhausted at the remote service.
    QuotaExceeded,
    /// Bad model identifier, rejected key, malformed request.
    Configuration,
}

/// Terminal classification of one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    Blocked,
    Fallback,
    FatalError(FatalCause),
}

/// The single result produced for an `AnalysisRequest`. `body` is always a
/// non-empty, displayable string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisOutcome {
    pub request_id: Uuid,
    pub kind: OutcomeKind,
    pub body: String,
    /// Whether resubmitting the same report later may produce a different result.
    pub retryable: bool,
    /// Remote calls made, bounded by the retry policy.
    pub attempts: u32,
}

impl AnalysisOutcome {
    pub fn new(request_id: Uuid, kind: OutcomeKind, body: String, attempts: u32) -> Self {
        let retryable = matches!(
            kind,
            OutcomeKind::Fallback | OutcomeKind::FatalError(FatalCause::QuotaExceeded)
        );
        Self {
            request_id,
            kind,
            body,
            retryable,
            attempts,
        }
    }
}

// ──────────────────────────────────────────────
// Remote inference seam
// ──────────────────────────────────────────────

/// Image attached alongside the prompt.
#[derive(Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl std::fmt::Debug for InlineImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineImage")
            .field("mime_type", &self.mime_type)
            .field("size", &self.data.len())
            .finish()
    }
}

/// What goes over the wire for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceRequest {
    pub prompt: String,
    pub image: Option<InlineImage>,
}

/// A successful round trip, before outcome classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferenceReply {
    Text(String),
    /// The service declined to answer for policy/safety reasons.
    Blocked { reason: String },
    /// No usable text (no candidates, empty parts).
    Empty,
}

/// Remote generative-language client abstraction (allows mocking).
pub trait InferenceClient {
    fn generate(
        &self,
        model: &str,
        request: &InferenceRequest,
    ) -> Result<InferenceReply, InferenceError>;
}
