//! Provider configuration and construction
//!
//! The provider is chosen once, from configuration, and then used through
//! [`LlmProvider`]; call sites never branch on which backend is active.

use crate::ollama::{OllamaProvider, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
use crate::{LlmError, MockProvider};
use async_trait::async_trait;
use scriptor_domain::traits::LlmProvider;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Deterministic in-process mock
    #[default]
    Mock,
    /// Local Ollama server
    Ollama,
}

/// Retry and backoff schedule for model calls
///
/// Attempt `n` (1-based) that fails is followed by a delay of
/// `initial_backoff_ms * backoff_multiplier^(n-1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first
    pub max_attempts: u32,

    /// Delay after the first failed attempt
    pub initial_backoff_ms: u64,

    /// Growth factor between delays
    pub backoff_multiplier: f64,
}

impl RetryPolicy {
    /// Delay to wait after failed attempt `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16) as i32;
        let millis = self.initial_backoff_ms as f64 * self.backoff_multiplier.max(1.0).powi(exponent);
        Duration::from_millis(millis.min(u64::MAX as f64) as u64)
    }
}

impl Default for RetryPolicy {
    /// Three attempts: 1s, then 2s between them
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 1_000,
            backoff_multiplier: 2.0,
        }
    }
}

/// Configuration for the LLM client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Backend selection
    pub kind: ProviderKind,

    /// Ollama endpoint
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// Per-request timeout (seconds)
    pub timeout_secs: u64,

    /// Retry schedule
    pub retry: RetryPolicy,

    /// Fixed response for the mock backend
    pub mock_response: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Mock,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: "llama3".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
            mock_response: "Summary: Mock summary.\nKey Concepts: [mock concept]".to_string(),
        }
    }
}

impl ProviderConfig {
    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.kind == ProviderKind::Ollama {
            if self.endpoint.trim().is_empty() {
                return Err(LlmError::Config("endpoint must not be empty".to_string()));
            }
            if self.model.trim().is_empty() {
                return Err(LlmError::Config("model must not be empty".to_string()));
            }
        }
        if self.timeout_secs == 0 {
            return Err(LlmError::Config("timeout_secs must be greater than 0".to_string()));
        }
        if self.retry.max_attempts == 0 {
            return Err(LlmError::Config("retry.max_attempts must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Load configuration from the process environment
    ///
    /// Reads `SCRIPTOR_PROVIDER`, `SCRIPTOR_OLLAMA_URL`, `SCRIPTOR_MODEL`,
    /// `SCRIPTOR_TIMEOUT_SECS` and `SCRIPTOR_MAX_RETRIES`; unset variables
    /// keep their defaults.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LlmError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(kind) = lookup("SCRIPTOR_PROVIDER") {
            config.kind = match kind.trim().to_ascii_lowercase().as_str() {
                "mock" => ProviderKind::Mock,
                "ollama" => ProviderKind::Ollama,
                other => {
                    return Err(LlmError::Config(format!("Unknown provider: {}", other)));
                }
            };
        }
        if let Some(endpoint) = lookup("SCRIPTOR_OLLAMA_URL") {
            config.endpoint = endpoint;
        }
        if let Some(model) = lookup("SCRIPTOR_MODEL") {
            config.model = model;
        }
        if let Some(timeout) = lookup("SCRIPTOR_TIMEOUT_SECS") {
            config.timeout_secs = parse_number("SCRIPTOR_TIMEOUT_SECS", &timeout)?;
        }
        if let Some(retries) = lookup("SCRIPTOR_MAX_RETRIES") {
            config.retry.max_attempts = parse_number("SCRIPTOR_MAX_RETRIES", &retries)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, LlmError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| LlmError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, LlmError> {
    value
        .trim()
        .parse()
        .map_err(|_| LlmError::Config(format!("{} must be a number, got '{}'", key, value)))
}

/// A provider selected once from [`ProviderConfig`]
#[derive(Debug, Clone)]
pub enum ConfiguredProvider {
    /// Deterministic mock
    Mock(MockProvider),
    /// Ollama HTTP client
    Ollama(OllamaProvider),
}

impl ConfiguredProvider {
    /// Build the configured backend
    pub fn from_config(config: &ProviderConfig) -> Result<Self, LlmError> {
        config.validate()?;
        match config.kind {
            ProviderKind::Mock => Ok(Self::Mock(MockProvider::new(config.mock_response.clone()))),
            ProviderKind::Ollama => {
                let provider = OllamaProvider::with_timeout(
                    config.endpoint.clone(),
                    config.model.clone(),
                    config.timeout(),
                )?
                .with_retry_policy(config.retry.clone());
                Ok(Self::Ollama(provider))
            }
        }
    }
}

#[async_trait]
impl LlmProvider for ConfiguredProvider {
    type Error = LlmError;

    fn name(&self) -> &str {
        match self {
            Self::Mock(p) => p.name(),
            Self::Ollama(p) => p.name(),
        }
    }

    async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, Self::Error> {
        match self {
            Self::Mock(p) => p.generate(prompt, system).await,
            Self::Ollama(p) => p.generate(prompt, system).await,
        }
    }

    async fn health_check(&self) -> Result<(), Self::Error> {
        match self {
            Self::Mock(p) => p.health_check().await,
            Self::Ollama(p) => p.health_check().await,
        }
    }
}
