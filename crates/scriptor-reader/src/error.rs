//! Error types for the reading pipeline
//!
//! Per-unit model failures are recovered inside the pipeline and never
//! appear here; these are the errors a caller can actually observe.

use scriptor_domain::TreeError;
use thiserror::Error;

/// Errors that can occur while reading a document
#[derive(Error, Debug)]
pub enum ReaderError {
    /// The parsed section list violates the tree contract
    #[error("Invalid section tree: {0}")]
    Tree(#[from] TreeError),

    /// Model error surfaced by an explicit validation
    #[error("LLM error: {0}")]
    Llm(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File access error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonParse(String),
}

impl From<serde_json::Error> for ReaderError {
    fn from(e: serde_json::Error) -> Self {
        ReaderError::JsonParse(e.to_string())
    }
}

impl From<scriptor_llm::LlmError> for ReaderError {
    fn from(e: scriptor_llm::LlmError) -> Self {
        ReaderError::Llm(e.to_string())
    }
}
