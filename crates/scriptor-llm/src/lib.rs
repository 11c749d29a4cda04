//! Scriptor LLM Provider Layer
//!
//! Pluggable LLM providers and the prompt layer that turns them into the
//! [`SummaryModel`](scriptor_domain::traits::SummaryModel) the reading
//! pipeline consumes.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//! - `ConfiguredProvider`: One of the above, chosen once from `ProviderConfig`
//!
//! # Examples
//!
//! ```
//! use scriptor_llm::MockProvider;
//! use scriptor_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let result = rt.block_on(provider.generate("test prompt", None)).unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod model;
pub mod ollama;
pub mod prompts;

use async_trait::async_trait;
use scriptor_domain::traits::LlmProvider;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use config::{ConfiguredProvider, ProviderConfig, ProviderKind, RetryPolicy};
pub use model::PromptedModel;
pub use ollama::OllamaProvider;
pub use prompts::{format_prompt, system_prompt, PromptTemplate};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Prompt template could not be rendered
    #[error("Template error: {0}")]
    Template(String),

    /// Provider misconfiguration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

type Responder = Arc<dyn Fn(&str) -> String + Send + Sync>;

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Fail,
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Scripted responses match when the prompt *contains* the registered
/// fragment; the first matching rule wins. Without a match the responder
/// (if any) is consulted, then the default response.
///
/// # Examples
///
/// ```
/// use scriptor_llm::MockProvider;
/// use scriptor_domain::traits::LlmProvider;
///
/// let mut provider = MockProvider::default();
/// provider.add_response("alpha", "response1");
/// provider.add_error("broken");
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// assert_eq!(rt.block_on(provider.generate("about alpha", None)).unwrap(), "response1");
/// assert!(rt.block_on(provider.generate("broken prompt", None)).is_err());
/// ```
#[derive(Clone)]
pub struct MockProvider {
    default_response: String,
    rules: Arc<Mutex<Vec<(String, MockReply)>>>,
    responder: Option<Responder>,
    call_count: Arc<Mutex<usize>>,
    prompts: Arc<Mutex<Vec<String>>>,
    healthy: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            rules: Arc::new(Mutex::new(Vec::new())),
            responder: None,
            call_count: Arc::new(Mutex::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            healthy: true,
        }
    }

    /// Create a MockProvider that computes each response from the prompt
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            responder: Some(Arc::new(responder)),
            ..Self::default()
        }
    }

    /// Respond with `response` to any prompt containing `fragment`
    pub fn add_response(&mut self, fragment: impl Into<String>, response: impl Into<String>) {
        lock(&self.rules).push((fragment.into(), MockReply::Text(response.into())));
    }

    /// Fail any prompt containing `fragment`
    pub fn add_error(&mut self, fragment: impl Into<String>) {
        lock(&self.rules).push((fragment.into(), MockReply::Fail));
    }

    /// Make `health_check` fail
    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count and prompt log
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
        lock(&self.prompts).clear();
    }

    /// Every prompt received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockProvider")
            .field("default_response", &self.default_response)
            .field("rules", &lock(&self.rules).len())
            .field("has_responder", &self.responder.is_some())
            .field("call_count", &self.call_count())
            .finish()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    type Error = LlmError;

    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str, _system: Option<&str>) -> Result<String, Self::Error> {
        *lock(&self.call_count) += 1;
        lock(&self.prompts).push(prompt.to_string());

        let matched = lock(&self.rules)
            .iter()
            .find(|(fragment, _)| prompt.contains(fragment.as_str()))
            .map(|(_, reply)| reply.clone());

        match matched {
            Some(MockReply::Text(response)) => Ok(response),
            Some(MockReply::Fail) => Err(LlmError::Other("Mock error".to_string())),
            None => Ok(match &self.responder {
                Some(responder) => responder(prompt),
                None => self.default_response.clone(),
            }),
        }
    }

    async fn health_check(&self) -> Result<(), Self::Error> {
        if self.healthy {
            Ok(())
        } else {
            Err(LlmError::Communication("Mock provider marked unhealthy".to_string()))
        }
    }
}
