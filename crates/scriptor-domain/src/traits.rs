//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between the reading pipeline and
//! infrastructure. Implementations live in other crates.

use crate::language::Language;
use async_trait::async_trait;
use std::fmt::Display;

/// Trait for raw LLM text generation
///
/// Implemented by the infrastructure layer (scriptor-llm). Retry and
/// timeout policy belong to the implementation; a call either returns text
/// or fails.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Error type for LLM operations
    type Error: Display + Send;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Generate a completion for `prompt`, optionally with a system prompt
    async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, Self::Error>;

    /// Check that the backend is reachable and the model is available
    async fn health_check(&self) -> Result<(), Self::Error>;
}

/// Which summary template a generation call uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryKind {
    /// A content (leaf) section
    Section,
    /// A container, reduced from its children
    Container,
    /// The whole document, reduced from top-level summaries
    Document,
}

/// Target length of a generated summary, in words
///
/// Drives prompt instructions only; responses are never truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordEnvelope {
    /// Preferred length
    pub target: usize,
    /// Lower bound
    pub min: usize,
    /// Upper bound
    pub max: usize,
}

impl Default for WordEnvelope {
    fn default() -> Self {
        Self {
            target: 250,
            min: 150,
            max: 400,
        }
    }
}

/// Input of one summary generation call
#[derive(Debug, Clone)]
pub struct SummaryRequest<'a> {
    /// Text to summarize
    pub content: &'a str,
    /// Accumulated context, empty when none applies
    pub context: &'a str,
    /// Template selector
    pub kind: SummaryKind,
    /// Output language
    pub language: Language,
    /// Title of the unit being summarized
    pub title: &'a str,
    /// Length instructions
    pub words: WordEnvelope,
}

/// The model operations the reading pipeline consumes
///
/// Every call is independently skippable: the pipeline treats an `Err` as
/// the end of that unit of work (section, container or concept) and moves on.
#[async_trait]
pub trait SummaryModel: Send + Sync {
    /// Error type for model operations
    type Error: Display + Send;

    /// Generate a summary; the response may carry labeled summary and concept lines
    async fn generate_summary(&self, request: &SummaryRequest<'_>) -> Result<String, Self::Error>;

    /// Extract key concept names from a section
    async fn extract_concepts(
        &self,
        title: &str,
        content: &str,
        language: Language,
    ) -> Result<Vec<String>, Self::Error>;

    /// Generate a raw, uncleaned definition for a concept
    async fn generate_definition(
        &self,
        concept: &str,
        context: &str,
        language: Language,
    ) -> Result<String, Self::Error>;

    /// Check that the underlying model is usable
    async fn health_check(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Trait for detecting the language of a text sample
pub trait LanguageDetector: Send + Sync {
    /// Detect the dominant language of `sample`
    fn detect(&self, sample: &str) -> Language;
}
