use super::InferenceError;

/// Taxonomy of remote-call failures, as seen by the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Rate or quota exhausted. Waiting inside this call cannot help.
    QuotaExceeded,
    /// Model not found/deprecated, rejected key, malformed request.
    Configuration,
    /// Anything else: connection drops, timeouts, 5xx, unparseable bodies.
    Transient,
}

const QUOTA_MARKERS: &[&str] = &[
    "quota",
    "rate limit",
    "rate-limit",
    "ratelimit",
    "resource_exhausted",
    "resource exhausted",
    "too many requests",
];

const CONFIGURATION_MARKERS: &[&str] = &[
    "not found",
    "not_found",
    "deprecated",
    "is not supported for generatecontent",
    "invalid_argument",
    "invalid argument",
    "api key not valid",
    "api_key_invalid",
    "permission_denied",
    "permission denied",
    "unauthenticated",
];

/// Classify a raw status code plus error description.
///
/// Quota wins over configuration when both match, since a 429 body may
/// also mention the model it was throttled on.
pub fn classify_error_message(status: Option<u16>, message: &str) -> FailureClass {
    let lower = message.to_lowercase();

    if status == Some(429) || QUOTA_MARKERS.iter().any(|m| lower.contains(m)) {
        return FailureClass::QuotaExceeded;
    }

    if matches!(status, Some(400 | 401 | 403 | 404))
        || CONFIGURATION_MARKERS.iter().any(|m| lower.contains(m))
    {
        return FailureClass::Configuration;
    }

    FailureClass::Transient
}

/// Classify a client error.
pub fn classify_error(error: &InferenceError) -> FailureClass {
    match error {
        InferenceError::Api { status, message } => classify_error_message(Some(*status), message),
        InferenceError::InvalidModelName(_) => FailureClass::Configuration,
        InferenceError::Network(message) => classify_error_message(None, message),
        InferenceError::Connection(_)
        | InferenceError::Timeout(_)
        | InferenceError::ResponseParsing(_) => FailureClass::Transient,
    }
}
