use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::gemini_types::{
    describe_error_body, validate_model_name, GenerateContentRequest, GenerateContentResponse,
};
use super::types::{InferenceClient, InferenceReply, InferenceRequest};
use super::InferenceError;
use crate::config::AnalyzerConfig;

/// Blocking HTTP client for the Generative Language `generateContent` API.
pub struct GeminiClient {
    endpoint: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    /// Create a client. `timeout` bounds each HTTP request end to end.
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self, InferenceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("labread/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| InferenceError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs: timeout.as_secs(),
        })
    }

    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, InferenceError> {
        Self::new(&config.endpoint, &config.api_key, config.request_timeout)
    }

    fn generate_url(&self, model: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/models/{}:generateContent", self.endpoint, model)
    }
}

impl InferenceClient for GeminiClient {
    fn generate(
        &self,
        model: &str,
        request: &InferenceRequest,
    ) -> Result<InferenceReply, InferenceError> {
        if !validate_model_name(model) {
            return Err(InferenceError::InvalidModelName(model.to_string()));
        }

        let url = self.generate_url(model);
        let body = GenerateContentRequest::from_inference(request);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    InferenceError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    InferenceError::Connection(self.endpoint.clone())
                } else {
                    InferenceError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(InferenceError::Api {
                status: status.as_u16(),
                message: describe_error_body(&body),
            });
        }

        let parsed: GenerateContentResponse = response.json().map_err(|e| {
            if e.is_timeout() {
                InferenceError::Timeout(self.timeout_secs)
            } else {
                InferenceError::ResponseParsing(e.to_string())
            }
        })?;

        Ok(parsed.into_reply())
    }
}

/// Scripted client for tests: returns the scripted results in order, then
/// keeps repeating the last one. Records every request it receives.
pub struct MockInferenceClient {
    script: Vec<Result<InferenceReply, InferenceError>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<InferenceRequest>>,
}

impl MockInferenceClient {
    pub fn new(script: Vec<Result<InferenceReply, InferenceError>>) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with the same result.
    pub fn always(result: Result<InferenceReply, InferenceError>) -> Self {
        Self::new(vec![result])
    }

    /// Always answer with the same text.
    pub fn text(response: &str) -> Self {
        Self::always(Ok(InferenceReply::Text(response.to_string())))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn recorded_requests(&self) -> Vec<InferenceRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl InferenceClient for MockInferenceClient {
    fn generate(
        &self,
        _model: &str,
        request: &InferenceRequest,
    ) -> Result<InferenceReply, InferenceError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        match self.script.get(n).or_else(|| self.script.last()) {
            Some(result) => result.clone(),
            None => Ok(InferenceReply::Empty),
        }
    }
}
