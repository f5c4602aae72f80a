use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "labread";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Google Generative Language API, v1beta surface.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Multimodal model used when `LABREAD_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Per-request HTTP timeout. The remote call has no other deadline.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF_SECS: u64 = 2;

/// Default tracing directive when `RUST_LOG` is absent.
pub fn default_log_filter() -> &'static str {
    "warn,labread_lib=info,labread=info"
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No API key configured: set GOOGLE_API_KEY (or GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

// ──────────────────────────────────────────────
// Language
// ──────────────────────────────────────────────

/// Language of the prompt, the disclaimer and every user-facing message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    Italian,
    English,
}

impl Language {
    /// Parse a short language code. Accepts `it`/`en` and their long names.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "it" | "ita" | "italian" | "italiano" => Some(Self::Italian),
            "en" | "eng" | "english" => Some(Self::English),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Italian => "it",
            Self::English => "en",
        }
    }
}

// ──────────────────────────────────────────────
// Retry policy
// ──────────────────────────────────────────────

/// Bounds for the analysis retry loop. Fixed delay, no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one call.
    pub fn new(max_attempts: u32, backoff_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff_delay(&self) -> Duration {
        self.backoff_delay
    }

    /// Worst-case time spent sleeping between attempts. Saturates instead of
    /// overflowing on absurd backoff settings.
    pub fn worst_case_wait(&self) -> Duration {
        self.backoff_delay.saturating_mul(self.max_attempts - 1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            Duration::from_secs(DEFAULT_BACKOFF_SECS),
        )
    }
}

// ──────────────────────────────────────────────
// Analyzer configuration
// ──────────────────────────────────────────────

/// Everything the orchestrator and the remote client need, passed in
/// explicitly at construction.
#[derive(Clone)]
pub struct AnalyzerConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub language: Language,
}

impl std::fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("request_timeout", &self.request_timeout)
            .field("retry", &self.retry)
            .field("language", &self.language)
            .finish()
    }
}

impl AnalyzerConfig {
    /// Configuration with defaults for everything but the key.
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            language: Language::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Build from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` delegates here so the
    /// parsing rules can be tested without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("GOOGLE_API_KEY")
            .or_else(|| non_empty("GEMINI_API_KEY"))
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key.trim());

        if let Some(model) = non_empty("LABREAD_MODEL") {
            config.model = model.trim().to_string();
        }
        if let Some(endpoint) = non_empty("LABREAD_ENDPOINT") {
            config.endpoint = endpoint.trim().trim_end_matches('/').to_string();
        }
        if let Some(raw) = non_empty("LABREAD_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(parse_number("LABREAD_TIMEOUT_SECS", &raw)?);
        }

        let max_attempts = match non_empty("LABREAD_MAX_ATTEMPTS") {
            Some(raw) => parse_number("LABREAD_MAX_ATTEMPTS", &raw)?,
            None => DEFAULT_MAX_ATTEMPTS,
        };
        let backoff_secs = match non_empty("LABREAD_BACKOFF_SECS") {
            Some(raw) => parse_number("LABREAD_BACKOFF_SECS", &raw)?,
            None => DEFAULT_BACKOFF_SECS,
        };
        config.retry = RetryPolicy::new(max_attempts, Duration::from_secs(backoff_secs));

        if let Some(raw) = non_empty("LABREAD_LANG") {
            config.language = Language::from_code(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: "LABREAD_LANG".into(),
                value: raw.clone(),
            })?;
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn app_name_is_labread() {
        assert_eq!(APP_NAME, "labread");
    }

    #[test]
    fn default_retry_policy_is_three_attempts_two_seconds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.backoff_delay(), Duration::from_secs(2));
        assert_eq!(policy.worst_case_wait(), Duration::from_secs(4));
    }

    #[test]
    fn retry_policy_clamps_zero_attempts() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.worst_case_wait(), Duration::ZERO);
    }

    #[test]
    fn worst_case_wait_saturates_on_huge_backoff() {
        let policy = RetryPolicy::new(3, Duration::from_secs(u64::MAX));
        assert_eq!(policy.worst_case_wait(), Duration::MAX);
    }

    #[test]
    fn huge_backoff_from_env_is_accepted() {
        let config = AnalyzerConfig::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "k"),
            ("LABREAD_BACKOFF_SECS", "18446744073709551615"),
        ]))
        .unwrap();
        assert_eq!(config.retry.worst_case_wait(), Duration::MAX);
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let result = AnalyzerConfig::from_lookup(lookup_from(&[]));
        assert_eq!(result.unwrap_err(), ConfigError::MissingApiKey);
    }

    #[test]
    fn blank_api_key_is_treated_as_missing() {
        let result = AnalyzerConfig::from_lookup(lookup_from(&[("GOOGLE_API_KEY", "   ")]));
        assert_eq!(result.unwrap_err(), ConfigError::MissingApiKey);
    }

    #[test]
    fn gemini_key_is_accepted_as_fallback() {
        let config =
            AnalyzerConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "abc")])).unwrap();
        assert_eq!(config.api_key, "abc");
    }

    #[test]
    fn defaults_applied_when_only_key_present() {
        let config =
            AnalyzerConfig::from_lookup(lookup_from(&[("GOOGLE_API_KEY", "k")])).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.language, Language::Italian);
    }

    #[test]
    fn overrides_are_read() {
        let config = AnalyzerConfig::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "k"),
            ("LABREAD_MODEL", "gemini-2.0-flash"),
            ("LABREAD_ENDPOINT", "http://127.0.0.1:9000/v1beta/"),
            ("LABREAD_TIMEOUT_SECS", "30"),
            ("LABREAD_MAX_ATTEMPTS", "5"),
            ("LABREAD_BACKOFF_SECS", "1"),
            ("LABREAD_LANG", "en"),
        ]))
        .unwrap();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.endpoint, "http://127.0.0.1:9000/v1beta");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.retry.max_attempts(), 5);
        assert_eq!(config.retry.backoff_delay(), Duration::from_secs(1));
        assert_eq!(config.language, Language::English);
    }

    #[test]
    fn non_numeric_timeout_is_rejected() {
        let err = AnalyzerConfig::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "k"),
            ("LABREAD_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "LABREAD_TIMEOUT_SECS".into(),
                value: "soon".into()
            }
        );
    }

    #[test]
    fn unknown_language_is_rejected() {
        let err = AnalyzerConfig::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "k"),
            ("LABREAD_LANG", "klingon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "LABREAD_LANG"));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = AnalyzerConfig::new("super-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn language_codes_round_trip() {
        assert_eq!(Language::from_code("IT"), Some(Language::Italian));
        assert_eq!(Language::from_code("english"), Some(Language::English));
        assert_eq!(Language::Italian.code(), "it");
        assert_eq!(Language::from_code("fr"), None);
    }
}
