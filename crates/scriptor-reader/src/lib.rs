//! Scriptor Reader
//!
//! Progressive, hierarchical summarization of structured documents.
//!
//! # Overview
//!
//! A document is parsed into a section tree and read the way a person
//! would: content sections in order, each summarized with the summaries of
//! the sections before it as context. Containers are then summarized from
//! their children, deepest first, and the document from its top-level
//! sections. Finally the key concepts of every summary are merged into a
//! bounded glossary with generated definitions.
//!
//! # Architecture
//!
//! ```text
//! Markdown → MarkdownParser → SectionTree
//!          → ProgressiveReader (leaves, accumulated context)
//!          → HierarchicalSynthesizer (containers, document)
//!          → ConceptAggregator (glossary)
//!          → DocumentKnowledge
//! ```
//!
//! Model failures never abort a document: the failed section, container or
//! concept is skipped or given a fallback and reading continues.
//!
//! # Example Usage
//!
//! ```no_run
//! use scriptor_llm::{ConfiguredProvider, PromptedModel, ProviderConfig};
//! use scriptor_reader::{render_text, DocumentPipeline, ReadingConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = ConfiguredProvider::from_config(&ProviderConfig::from_env()?)?;
//! let config = ReadingConfig::default().with_env_overrides()?;
//! let pipeline = DocumentPipeline::new(PromptedModel::new(provider), config);
//!
//! pipeline.validate().await?;
//! let knowledge = pipeline.process_file("book.md").await?;
//! println!("{}", render_text(&knowledge));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod cleaning;
mod concepts;
mod config;
mod context;
mod error;
mod language;
mod markdown;
mod pipeline;
mod progressive;
mod render;
mod response;
mod synthesizer;

#[cfg(test)]
mod tests;

pub use cleaning::{clean_definition, strip_reasoning};
pub use concepts::{collect_mentions, fallback_definition, ConceptAggregator, ConceptMention};
pub use config::ReadingConfig;
pub use context::ContextAccumulator;
pub use error::ReaderError;
pub use language::StopwordDetector;
pub use markdown::{MarkdownParser, ParsedDocument, UNTITLED};
pub use pipeline::DocumentPipeline;
pub use progressive::ProgressiveReader;
pub use render::{render_json, render_text};
pub use response::{parse_summary_response, ParsedSummary};
pub use synthesizer::{fallback, HierarchicalSynthesizer};
