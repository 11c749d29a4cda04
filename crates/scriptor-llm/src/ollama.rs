//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local LLM API.
//!
//! # Features
//!
//! - Async HTTP communication with Ollama API
//! - Configurable endpoint and model
//! - Retry with exponential backoff, driven by [`RetryPolicy`]
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use scriptor_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3").unwrap();
//! ```

use crate::config::RetryPolicy;
use crate::LlmError;
use async_trait::async_trait;
use scriptor_domain::traits::LlmProvider;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for LLM requests (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Ollama API provider for local LLM inference
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// Response from Ollama tags API
#[derive(Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider with the default timeout
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new Ollama provider with a request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
            retry: RetryPolicy::default(),
        })
    }

    /// Create a provider against `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the maximum number of attempts per call
    pub fn with_max_retries(mut self, max_attempts: u32) -> Self {
        self.retry.max_attempts = max_attempts;
        self
    }

    /// Model name
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate_once(&self, body: &OllamaGenerateRequest<'_>) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<OllamaGenerateResponse>()
                .await
                .map(|r| r.response)
                .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)));
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)))
    }
}

fn is_retryable(error: &LlmError) -> bool {
    matches!(error, LlmError::Communication(_) | LlmError::RateLimitExceeded)
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    type Error = LlmError;

    fn name(&self) -> &str {
        "ollama"
    }

    /// Generate text, retrying transient failures per the retry policy
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Ollama is not running
    /// - Model is not available
    /// - Network communication fails on every attempt
    /// - Response format is invalid
    async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, Self::Error> {
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
        };

        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!(model = %self.model, attempt, prompt_len = prompt.len(), "Calling Ollama");
            match self.generate_once(&body).await {
                Ok(text) => return Ok(text),
                Err(e) if is_retryable(&e) && attempt < max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    warn!("Ollama attempt {}/{} failed: {}; retrying in {:?}", attempt, max_attempts, e, delay);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn health_check(&self) -> Result<(), Self::Error> {
        let url = format!("{}/api/tags", self.endpoint);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Ollama unreachable at {}: {}", self.endpoint, e)))?;

        if !response.status().is_success() {
            return Err(LlmError::Communication(format!(
                "Ollama health check returned HTTP {}",
                response.status()
            )));
        }

        let tags = response
            .json::<OllamaTagsResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse tags: {}", e)))?;

        let tagged = format!("{}:", self.model);
        if tags
            .models
            .iter()
            .any(|m| m.name == self.model || m.name.starts_with(&tagged))
        {
            Ok(())
        } else {
            Err(LlmError::ModelNotAvailable(self.model.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff_ms: 0,
            backoff_multiplier: 1.0,
        }
    }

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new("http://localhost:11434/", "llama3").unwrap();
        assert_eq!(provider.endpoint, "http://localhost:11434");
        assert_eq!(provider.model(), "llama3");
        assert_eq!(provider.retry, RetryPolicy::default());
    }

    #[test]
    fn test_ollama_provider_default_endpoint() {
        let provider = OllamaProvider::default_endpoint("mistral").unwrap();
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_ollama_provider_with_max_retries() {
        let provider = OllamaProvider::default_endpoint("llama3")
            .unwrap()
            .with_max_retries(5);
        assert_eq!(provider.retry.max_attempts, 5);
    }

    #[tokio::test]
    async fn test_generate_success_sends_system_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3",
                "system": "be brief",
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "Summary: ok",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(server.uri(), "llama3").unwrap();
        let text = provider.generate("hello", Some("be brief")).await.unwrap();
        assert_eq!(text, "Summary: ok");
    }

    #[tokio::test]
    async fn test_generate_model_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(server.uri(), "ghost")
            .unwrap()
            .with_retry_policy(fast_retry(3));
        let result = provider.generate("hello", None).await;
        assert!(matches!(result, Err(LlmError::ModelNotAvailable(_))));
    }

    #[tokio::test]
    async fn test_generate_retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(2)
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(server.uri(), "llama3")
            .unwrap()
            .with_retry_policy(fast_retry(2));
        let result = provider.generate("hello", None).await;
        match result {
            Err(LlmError::Communication(msg)) => assert!(msg.contains("500")),
            other => panic!("Expected Communication error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_invalid_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(server.uri(), "llama3").unwrap();
        let result = provider.generate("hello", None).await;
        assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_health_check_finds_tagged_model() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{"name": "llama3:latest"}]
            })))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(server.uri(), "llama3").unwrap();
        assert!(provider.health_check().await.is_ok());

        let missing = OllamaProvider::new(server.uri(), "mistral").unwrap();
        assert!(matches!(
            missing.health_check().await,
            Err(LlmError::ModelNotAvailable(_))
        ));
    }

    #[tokio::test]
    async fn test_ollama_error_handling() {
        // Nothing listens on port 9
        let provider = OllamaProvider::new("http://127.0.0.1:9", "llama3")
            .unwrap()
            .with_retry_policy(fast_retry(1));

        let result = provider.generate("test", None).await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }
}
