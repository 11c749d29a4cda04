//! Progressive reading of content sections
//!
//! Leaves are summarized strictly in document order: each prompt carries
//! the summaries emitted so far, so section N cannot start before section
//! N-1 is done.

use crate::config::ReadingConfig;
use crate::context::ContextAccumulator;
use crate::response::parse_summary_response;
use scriptor_domain::text::{clean_title, dedup_concepts};
use scriptor_domain::traits::{SummaryKind, SummaryModel, SummaryRequest};
use scriptor_domain::{Language, Section, SectionId, SectionSummary, SectionTree};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Confidence assigned to a successfully read section
const LEAF_CONFIDENCE: f64 = 1.0;

/// Why a content section was skipped
#[derive(Error, Debug)]
enum ReadError {
    #[error("model error: {0}")]
    Model(String),

    #[error("response carried no summary text")]
    EmptySummary,
}

/// Summarizes leaf sections with accumulated context
pub struct ProgressiveReader<'a, M> {
    model: &'a M,
    config: &'a ReadingConfig,
}

impl<'a, M> ProgressiveReader<'a, M>
where
    M: SummaryModel,
{
    /// Create a reader over a model and configuration
    pub fn new(model: &'a M, config: &'a ReadingConfig) -> Self {
        Self { model, config }
    }

    /// Summarize every leaf of `tree`
    ///
    /// Returns summaries for the sections that succeeded. A failed section is
    /// logged and left out; it contributes nothing to later context.
    pub async fn read(
        &self,
        tree: &SectionTree,
        language: Language,
    ) -> BTreeMap<SectionId, SectionSummary> {
        let leaves: Vec<&Section> = tree.leaves().collect();
        info!("Reading {} content sections progressively", leaves.len());

        let mut context = ContextAccumulator::new(self.config.context_budget());
        let mut summaries = BTreeMap::new();

        for section in leaves {
            let current_context = context.render();
            match self.read_section(section, &current_context, language).await {
                Ok(summary) => {
                    context.push(&summary.title, &summary.summary);
                    debug!(
                        section = %section.id,
                        concepts = summary.key_concepts.len(),
                        context_chars = context.char_len(),
                        "Section summarized"
                    );
                    summaries.insert(section.id.clone(), summary);
                }
                Err(e) => {
                    warn!("Skipping section '{}' ({}): {}", section.title, section.id, e);
                }
            }
        }

        info!("Progressive reading complete: {} sections summarized", summaries.len());
        summaries
    }

    async fn read_section(
        &self,
        section: &Section,
        context: &str,
        language: Language,
    ) -> Result<SectionSummary, ReadError> {
        let title = clean_title(&section.title);

        let request = SummaryRequest {
            content: &section.content,
            context,
            kind: SummaryKind::Section,
            language,
            title: &title,
            words: self.config.words(),
        };
        let response = self
            .model
            .generate_summary(&request)
            .await
            .map_err(|e| ReadError::Model(e.to_string()))?;
        let parsed = parse_summary_response(&response);
        if parsed.summary.trim().is_empty() {
            return Err(ReadError::EmptySummary);
        }

        let extracted = match self
            .model
            .extract_concepts(&title, &section.content, language)
            .await
        {
            Ok(concepts) => concepts,
            Err(e) => {
                warn!("Concept extraction failed for '{}': {}", title, e);
                Vec::new()
            }
        };

        let key_concepts = dedup_concepts(
            extracted.iter().chain(parsed.concepts.iter()),
            self.config.max_concepts_per_section,
        );

        Ok(SectionSummary::for_section(
            section,
            title,
            parsed.summary,
            key_concepts,
            LEAF_CONFIDENCE,
        ))
    }
}
