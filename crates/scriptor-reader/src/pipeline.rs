//! End-to-end document reading
//!
//! Stages run once per document, in order: language detection, progressive
//! reading of leaves, container synthesis, document summary, glossary.

use crate::concepts::ConceptAggregator;
use crate::config::ReadingConfig;
use crate::error::ReaderError;
use crate::language::StopwordDetector;
use crate::markdown::{MarkdownParser, ParsedDocument, UNTITLED};
use crate::progressive::ProgressiveReader;
use crate::synthesizer::{fallback, HierarchicalSynthesizer};
use scriptor_domain::text::clean_title;
use scriptor_domain::traits::{LanguageDetector, SummaryModel};
use scriptor_domain::{DocumentKnowledge, Language, SectionTree};
use std::path::Path;
use tracing::info;

/// Reads documents into [`DocumentKnowledge`]
///
/// # Examples
///
/// ```
/// use scriptor_llm::{MockProvider, PromptedModel};
/// use scriptor_reader::{DocumentPipeline, ReadingConfig};
///
/// let model = PromptedModel::new(MockProvider::new("Summary: Short.\nKey Concepts: [x]"));
/// let pipeline = DocumentPipeline::new(model, ReadingConfig::default());
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// let knowledge = rt
///     .block_on(pipeline.process_markdown("# Doc\n\n## A\n\nContent A"))
///     .unwrap();
/// assert_eq!(knowledge.title, "Doc");
/// assert_eq!(knowledge.total_sections, 1);
/// ```
pub struct DocumentPipeline<M, D = StopwordDetector> {
    model: M,
    detector: D,
    config: ReadingConfig,
}

impl<M> DocumentPipeline<M, StopwordDetector>
where
    M: SummaryModel,
{
    /// Create a pipeline with the stop-word language detector
    pub fn new(model: M, config: ReadingConfig) -> Self {
        Self::with_detector(model, StopwordDetector, config)
    }
}

impl<M, D> DocumentPipeline<M, D>
where
    M: SummaryModel,
    D: LanguageDetector,
{
    /// Create a pipeline with a custom language detector
    pub fn with_detector(model: M, detector: D, config: ReadingConfig) -> Self {
        Self {
            model,
            detector,
            config,
        }
    }

    /// The reading configuration
    pub fn config(&self) -> &ReadingConfig {
        &self.config
    }

    /// The model
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Check the configuration and that the model is reachable
    pub async fn validate(&self) -> Result<(), ReaderError> {
        self.config.validate()?;
        self.model
            .health_check()
            .await
            .map_err(|e| ReaderError::Llm(e.to_string()))?;
        info!("Pipeline validated");
        Ok(())
    }

    /// Parse Markdown and read it
    pub async fn process_markdown(&self, source: &str) -> Result<DocumentKnowledge, ReaderError> {
        self.process(MarkdownParser::parse(source)).await
    }

    /// Read a Markdown file
    pub async fn process_file(&self, path: impl AsRef<Path>) -> Result<DocumentKnowledge, ReaderError> {
        let source = tokio::fs::read_to_string(path).await?;
        self.process_markdown(&source).await
    }

    /// Read a parsed document
    ///
    /// Model failures only shrink the result. The error cases are an
    /// inconsistent section tree and nothing else.
    pub async fn process(&self, parsed: ParsedDocument) -> Result<DocumentKnowledge, ReaderError> {
        let title = match clean_title(&parsed.title) {
            t if t.is_empty() => UNTITLED.to_string(),
            t => t,
        };

        if parsed.sections.is_empty() {
            let language = self.config.language.unwrap_or_else(|| self.detector.detect(&title));
            info!("Document '{}' has no sections", title);
            let summary = fallback::empty_document(&title, language);
            return Ok(DocumentKnowledge::empty(title, summary, language));
        }

        let tree = SectionTree::new(parsed.sections)?;
        let language = self.detect_language(&tree);
        info!(
            "Reading '{}': {} sections, {} content, language {}",
            title,
            tree.len(),
            tree.leaves().count(),
            language
        );

        let mut summaries = ProgressiveReader::new(&self.model, &self.config)
            .read(&tree, language)
            .await;

        let synthesizer = HierarchicalSynthesizer::new(&self.model, &self.config);
        synthesizer
            .synthesize_containers(&tree, &mut summaries, language)
            .await;
        let document_summary = synthesizer
            .synthesize_document(&title, &summaries, tree.len(), language)
            .await;

        let concepts = ConceptAggregator::new(&self.model, &self.config)
            .aggregate(&summaries, language)
            .await;

        let knowledge =
            DocumentKnowledge::assemble(title, document_summary, language, summaries, concepts);
        info!(
            "Finished '{}': {} sections summarized, {} concepts",
            knowledge.title, knowledge.total_sections, knowledge.total_concepts
        );
        Ok(knowledge)
    }

    /// Configured language, or detection over the opening sections
    pub fn detect_language(&self, tree: &SectionTree) -> Language {
        if let Some(language) = self.config.language {
            return language;
        }
        let sample: String = tree
            .in_order()
            .take(self.config.language_sample_sections)
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
            .chars()
            .take(self.config.language_sample_chars)
            .collect();
        self.detector.detect(&sample)
    }
}
