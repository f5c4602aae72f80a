use super::classify::{classify_error, FailureClass};
use super::fallback::fallback;
use super::messages::{blocked_message, configuration_message, quota_message, with_disclaimer};
use super::prompt::build_prompt;
use super::types::{
    AnalysisOutcome, AnalysisRequest, FatalCause, InferenceClient, InferenceReply, OutcomeKind,
};
use crate::config::AnalyzerConfig;

/// Orchestrates one report analysis:
/// prompt → remote call (bounded retries) → classify → disclaimer or fallback.
///
/// Holds no per-request state; independent requests may be analyzed
/// concurrently from several threads.
pub struct Analyzer {
    client: Box<dyn InferenceClient + Send + Sync>,
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(client: Box<dyn InferenceClient + Send + Sync>, config: AnalyzerConfig) -> Self {
        Self { client, config }
    }

    /// Run the analysis. Always returns exactly one terminal outcome with a
    /// displayable body; no error escapes this boundary.
    ///
    /// Worst-case blocking time is `max_attempts` request timeouts plus
    /// [`RetryPolicy::worst_case_wait`](crate::config::RetryPolicy::worst_case_wait).
    pub fn analyze(&self, request: &AnalysisRequest) -> AnalysisOutcome {
        let _span = tracing::info_span!(
            "analyze_report",
            request_id = %request.id(),
            modality = request.modality().as_str(),
            model = %self.config.model,
        )
        .entered();
        let start = std::time::Instant::now();

        let language = self.config.language;
        let policy = self.config.retry;
        let inference = build_prompt(request.content(), language);
        tracing::debug!(
            max_attempts = policy.max_attempts(),
            worst_case_wait_secs = policy.worst_case_wait().as_secs(),
            "Starting analysis"
        );

        let mut attempts: u32 = 0;
        while attempts < policy.max_attempts() {
            if attempts > 0 && !policy.backoff_delay().is_zero() {
                std::thread::sleep(policy.backoff_delay());
            }
            attempts += 1;

            match self.client.generate(&self.config.model, &inference) {
                Ok(InferenceReply::Text(text)) => {
                    tracing::info!(
                        attempts,
                        elapsed_ms = %start.elapsed().as_millis(),
                        response_len = text.len(),
                        "Analysis complete"
                    );
                    return AnalysisOutcome::new(
                        request.id(),
                        OutcomeKind::Success,
                        with_disclaimer(&text, language),
                        attempts,
                    );
                }
                Ok(InferenceReply::Blocked { reason }) => {
                    tracing::warn!(attempts, reason = %reason, "Analysis blocked by content policy");
                    return AnalysisOutcome::new(
                        request.id(),
                        OutcomeKind::Blocked,
                        with_disclaimer(blocked_message(language), language),
                        attempts,
                    );
                }
                Ok(InferenceReply::Empty) => {
                    tracing::warn!(
                        attempt = attempts,
                        max_attempts = policy.max_attempts(),
                        "Empty response from inference service"
                    );
                }
                Err(e) => match classify_error(&e) {
                    FailureClass::QuotaExceeded => {
                        tracing::error!(attempts, error = %e, "Inference quota exceeded");
                        return AnalysisOutcome::new(
                            request.id(),
                            OutcomeKind::FatalError(FatalCause::QuotaExceeded),
                            with_disclaimer(quota_message(language), language),
                            attempts,
                        );
                    }
                    FailureClass::Configuration => {
                        tracing::error!(attempts, error = %e, "Inference service misconfigured");
                        return AnalysisOutcome::new(
                            request.id(),
                            OutcomeKind::FatalError(FatalCause::Configuration),
                            with_disclaimer(configuration_message(language), language),
                            attempts,
                        );
                    }
                    FailureClass::Transient => {
                        tracing::warn!(
                            attempt = attempts,
                            max_attempts = policy.max_attempts(),
                            error = %e,
                            "Inference call failed, retrying"
                        );
                    }
                },
            }
        }

        tracing::warn!(
            attempts,
            elapsed_ms = %start.elapsed().as_millis(),
            "Retry budget exhausted, returning local fallback"
        );
        AnalysisOutcome::new(
            request.id(),
            OutcomeKind::Fallback,
            fallback(request.content(), language),
            attempts,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Language, RetryPolicy};
    use crate::pipeline::analysis::gemini::MockInferenceClient;
    use crate::pipeline::analysis::messages::disclaimer_suffix;
    use crate::pipeline::analysis::{InferenceError, InferenceRequest};
    use crate::pipeline::preparation::ImageHandle;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    /// Shares a mock with the analyzer so call counts stay observable.
    struct Shared(Arc<MockInferenceClient>);

    impl InferenceClient for Shared {
        fn generate(
            &self,
            model: &str,
            request: &InferenceRequest,
        ) -> Result<InferenceReply, InferenceError> {
            self.0.generate(model, request)
        }
    }

    fn config(language: Language) -> AnalyzerConfig {
        AnalyzerConfig::new("test-key")
            .with_language(language)
            .with_retry(RetryPolicy::new(3, Duration::ZERO))
    }

    fn analyzer_with(
        script: Vec<Result<InferenceReply, InferenceError>>,
        language: Language,
    ) -> (Analyzer, Arc<MockInferenceClient>) {
        let mock = Arc::new(MockInferenceClient::new(script));
        let analyzer = Analyzer::new(Box::new(Shared(mock.clone())), config(language));
        (analyzer, mock)
    }

    fn transient() -> Result<InferenceReply, InferenceError> {
        Err(InferenceError::Api {
            status: 503,
            message: "UNAVAILABLE: The model is overloaded.".into(),
        })
    }

    fn text_request(text: &str) -> AnalysisRequest {
        AnalysisRequest::text(text).unwrap()
    }

    #[test]
    fn hemoglobin_scenario_succeeds_first_attempt() {
        let (analyzer, mock) = analyzer_with(
            vec![Ok(InferenceReply::Text("Hemoglobin low, consult physician.".into()))],
            Language::English,
        );
        let request = text_request("Hemoglobin 10 g/dL (ref 13-17)*");

        let outcome = analyzer.analyze(&request);

        assert_eq!(outcome.kind, OutcomeKind::Success);
        assert_eq!(
            outcome.body,
            format!(
                "Hemoglobin low, consult physician.{}",
                disclaimer_suffix(Language::English)
            )
        );
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.request_id, request.id());
        assert!(!outcome.retryable);
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn text_content_reaches_prompt() {
        let (analyzer, mock) = analyzer_with(
            vec![Ok(InferenceReply::Text("ok".into()))],
            Language::Italian,
        );
        analyzer.analyze(&text_request("Ferritina 8 ng/mL *"));

        let sent = mock.recorded_requests();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].prompt.contains("Ferritina 8 ng/mL *"));
        assert!(sent[0].image.is_none());
    }

    #[test]
    fn image_content_is_attached() {
        let (analyzer, mock) = analyzer_with(
            vec![Ok(InferenceReply::Text("ok".into()))],
            Language::Italian,
        );
        let handle = ImageHandle::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg", 2, 2);
        analyzer.analyze(&AnalysisRequest::image(handle));

        let sent = mock.recorded_requests();
        let image = sent[0].image.as_ref().unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn policy_block_short_circuits_on_first_attempt() {
        let (analyzer, mock) = analyzer_with(
            vec![Ok(InferenceReply::Blocked {
                reason: "SAFETY".into(),
            })],
            Language::Italian,
        );
        let outcome = analyzer.analyze(&text_request("Emoglobina 10"));

        assert_eq!(outcome.kind, OutcomeKind::Blocked);
        assert_eq!(
            outcome.body,
            with_disclaimer(blocked_message(Language::Italian), Language::Italian)
        );
        assert_eq!(outcome.attempts, 1);
        assert!(!outcome.retryable);
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn quota_exceeded_short_circuits_on_first_attempt() {
        let (analyzer, mock) = analyzer_with(
            vec![Err(InferenceError::Api {
                status: 429,
                message: "RESOURCE_EXHAUSTED: Resource has been exhausted (e.g. check quota)."
                    .into(),
            })],
            Language::English,
        );
        let outcome = analyzer.analyze(&text_request("TSH 5.2"));

        assert_eq!(outcome.kind, OutcomeKind::FatalError(FatalCause::QuotaExceeded));
        assert_eq!(
            outcome.body,
            with_disclaimer(quota_message(Language::English), Language::English)
        );
        assert!(outcome.retryable);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn model_not_found_is_fatal_configuration() {
        let (analyzer, mock) = analyzer_with(
            vec![Err(InferenceError::Api {
                status: 404,
                message: "NOT_FOUND: models/gemini-pro-vision is not found for API version v1beta"
                    .into(),
            })],
            Language::Italian,
        );
        let outcome = analyzer.analyze(&text_request("Glucosio 98"));

        assert_eq!(outcome.kind, OutcomeKind::FatalError(FatalCause::Configuration));
        assert_eq!(
            outcome.body,
            with_disclaimer(configuration_message(Language::Italian), Language::Italian)
        );
        assert!(!outcome.retryable);
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn transient_failures_then_success_adds_single_disclaimer() {
        let (analyzer, mock) = analyzer_with(
            vec![
                transient(),
                Ok(InferenceReply::Empty),
                Ok(InferenceReply::Text("Colesterolo alto.".into())),
            ],
            Language::Italian,
        );
        let outcome = analyzer.analyze(&text_request("Colesterolo 240 *"));

        let suffix = disclaimer_suffix(Language::Italian);
        assert_eq!(outcome.kind, OutcomeKind::Success);
        assert_eq!(outcome.body, format!("Colesterolo alto.{suffix}"));
        assert_eq!(outcome.body.matches(suffix.trim_start()).count(), 1);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(mock.call_count(), 3);
    }

    #[test]
    fn exhausted_retries_return_fallback_with_word_count() {
        let text = "Emoglobina 10 g/dL Ferritina 8 ng/mL";
        let (analyzer, mock) = analyzer_with(vec![transient()], Language::Italian);
        let request = text_request(text);

        let outcome = analyzer.analyze(&request);

        assert_eq!(outcome.kind, OutcomeKind::Fallback);
        assert_eq!(outcome.attempts, 3);
        assert!(outcome.retryable);
        assert_eq!(mock.call_count(), 3);
        assert_eq!(outcome.body, fallback(request.content(), Language::Italian));
        let words = text.split_whitespace().count();
        assert!(outcome.body.contains(&format!("contiene {words} parole")));
    }

    #[test]
    fn always_empty_responses_exhaust_to_fallback() {
        let (analyzer, mock) = analyzer_with(vec![Ok(InferenceReply::Empty)], Language::English);
        let handle = ImageHandle::new(vec![1], "image/png", 1, 1);
        let request = AnalysisRequest::image(handle);

        let outcome = analyzer.analyze(&request);

        assert_eq!(outcome.kind, OutcomeKind::Fallback);
        assert_eq!(outcome.body, fallback(request.content(), Language::English));
        assert_eq!(mock.call_count(), 3);
    }

    #[test]
    fn connection_errors_are_retried() {
        let (analyzer, mock) = analyzer_with(
            vec![
                Err(InferenceError::Connection("https://x".into())),
                Err(InferenceError::Timeout(120)),
                Ok(InferenceReply::Text("fine".into())),
            ],
            Language::English,
        );
        let outcome = analyzer.analyze(&text_request("x"));
        assert_eq!(outcome.kind, OutcomeKind::Success);
        assert_eq!(mock.call_count(), 3);
    }

    #[test]
    fn quota_after_transient_stops_immediately() {
        let (analyzer, mock) = analyzer_with(
            vec![
                transient(),
                Err(InferenceError::Api {
                    status: 429,
                    message: "Too Many Requests".into(),
                }),
                Ok(InferenceReply::Text("never reached".into())),
            ],
            Language::English,
        );
        let outcome = analyzer.analyze(&text_request("x"));
        assert_eq!(outcome.kind, OutcomeKind::FatalError(FatalCause::QuotaExceeded));
        assert_eq!(outcome.attempts, 2);
        assert_eq!(mock.call_count(), 2);
    }

    #[test]
    fn single_attempt_policy_never_retries() {
        let mock = Arc::new(MockInferenceClient::new(vec![transient()]));
        let analyzer = Analyzer::new(
            Box::new(Shared(mock.clone())),
            AnalyzerConfig::new("k").with_retry(RetryPolicy::new(1, Duration::from_secs(60))),
        );
        let start = Instant::now();
        let outcome = analyzer.analyze(&text_request("x"));
        assert_eq!(outcome.kind, OutcomeKind::Fallback);
        assert_eq!(mock.call_count(), 1);
        // No sleep after the final attempt.
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn backoff_sleeps_between_attempts_only() {
        let delay = Duration::from_millis(20);
        let mock = Arc::new(MockInferenceClient::new(vec![transient()]));
        let analyzer = Analyzer::new(
            Box::new(Shared(mock.clone())),
            AnalyzerConfig::new("k").with_retry(RetryPolicy::new(3, delay)),
        );
        let start = Instant::now();
        analyzer.analyze(&text_request("x"));
        let elapsed = start.elapsed();
        assert!(elapsed >= delay * 2, "expected two backoff sleeps, took {elapsed:?}");
        assert_eq!(mock.call_count(), 3);
    }

    #[test]
    fn every_outcome_body_is_non_empty_and_disclaimed() {
        let scripts = vec![
            vec![Ok(InferenceReply::Text("t".into()))],
            vec![Ok(InferenceReply::Blocked { reason: "SAFETY".into() })],
            vec![Ok(InferenceReply::Empty)],
            vec![transient()],
            vec![Err(InferenceError::InvalidModelName("bad model".into()))],
            vec![Err(InferenceError::Api { status: 429, message: String::new() })],
        ];
        for script in scripts {
            let (analyzer, _) = analyzer_with(script, Language::Italian);
            let outcome = analyzer.analyze(&text_request("Piastrine 90 *"));
            assert!(!outcome.body.trim().is_empty());
            assert!(
                outcome.body.ends_with(disclaimer_suffix(Language::Italian)),
                "{:?} body lacks the disclaimer",
                outcome.kind
            );
            assert!(outcome.attempts >= 1 && outcome.attempts <= 3);
        }
    }

    #[test]
    fn concurrent_requests_are_independent() {
        let analyzer = Arc::new(Analyzer::new(
            Box::new(MockInferenceClient::text("ok")),
            config(Language::English),
        ));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let analyzer = Arc::clone(&analyzer);
                std::thread::spawn(move || {
                    let request = AnalysisRequest::text(&format!("Report {i}")).unwrap();
                    let outcome = analyzer.analyze(&request);
                    (request.id(), outcome)
                })
            })
            .collect();

        for handle in handles {
            let (id, outcome) = handle.join().unwrap();
            assert_eq!(outcome.request_id, id);
            assert_eq!(outcome.kind, OutcomeKind::Success);
            assert_eq!(outcome.attempts, 1);
        }
    }
}
