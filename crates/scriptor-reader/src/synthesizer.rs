//! Bottom-up synthesis of container and document summaries
//!
//! Containers are reduced from their children, deepest first, so every
//! child that can have a summary already has one when its parent is
//! processed. Containers get no accumulated context. The document summary
//! is a final reduce over the top-level summaries.

use crate::config::ReadingConfig;
use crate::response::parse_summary_response;
use scriptor_domain::text::{clean_title, dedup_concepts};
use scriptor_domain::traits::{SummaryKind, SummaryModel, SummaryRequest};
use scriptor_domain::{Language, Section, SectionId, SectionSummary, SectionTree};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a container was left without a summary
#[derive(Error, Debug)]
enum SynthesisError {
    #[error("none of its {0} children has a summary")]
    NoChildSummaries(usize),

    #[error("model error: {0}")]
    Model(String),

    #[error("response carried no summary text")]
    EmptySummary,
}

/// Level whose summaries are reduced into the document summary
const TOP_LEVEL: u32 = 1;

/// Summarizes containers and the whole document
pub struct HierarchicalSynthesizer<'a, M> {
    model: &'a M,
    config: &'a ReadingConfig,
}

impl<'a, M> HierarchicalSynthesizer<'a, M>
where
    M: SummaryModel,
{
    /// Create a synthesizer over a model and configuration
    pub fn new(model: &'a M, config: &'a ReadingConfig) -> Self {
        Self { model, config }
    }

    /// Add a summary for every container that can be synthesized
    ///
    /// Containers already present in `summaries` are left alone. A container
    /// with no summarized child, or whose model call fails, stays absent.
    pub async fn synthesize_containers(
        &self,
        tree: &SectionTree,
        summaries: &mut BTreeMap<SectionId, SectionSummary>,
        language: Language,
    ) {
        let containers = tree.containers_deepest_first();
        info!("Synthesizing {} container sections", containers.len());

        let mut synthesized = 0usize;
        for container in containers {
            if summaries.contains_key(&container.id) {
                continue;
            }
            match self.synthesize_container(container, summaries, language).await {
                Ok(summary) => {
                    debug!(section = %container.id, level = container.level, "Container synthesized");
                    summaries.insert(container.id.clone(), summary);
                    synthesized += 1;
                }
                Err(e) => {
                    warn!("Omitting container '{}' ({}): {}", container.title, container.id, e);
                }
            }
        }

        info!("Container synthesis complete: {} synthesized", synthesized);
    }

    async fn synthesize_container(
        &self,
        container: &Section,
        summaries: &BTreeMap<SectionId, SectionSummary>,
        language: Language,
    ) -> Result<SectionSummary, SynthesisError> {
        let children: Vec<&SectionSummary> = container
            .children
            .iter()
            .filter_map(|id| summaries.get(id))
            .collect();
        if children.is_empty() {
            return Err(SynthesisError::NoChildSummaries(container.children.len()));
        }

        let title = clean_title(&container.title);
        let input = synthesis_input(&container.content, &children, language);
        let request = SummaryRequest {
            content: &input,
            context: "",
            kind: SummaryKind::Container,
            language,
            title: &title,
            words: self.config.words(),
        };
        let response = self
            .model
            .generate_summary(&request)
            .await
            .map_err(|e| SynthesisError::Model(e.to_string()))?;
        let parsed = parse_summary_response(&response);
        if parsed.summary.trim().is_empty() {
            return Err(SynthesisError::EmptySummary);
        }

        let key_concepts = self.container_concepts(&children, &parsed.concepts);
        let confidence = children.len() as f64 / container.children.len() as f64;

        Ok(SectionSummary::for_section(
            container,
            title,
            parsed.summary,
            key_concepts,
            confidence,
        ))
    }

    /// Child concepts first, then new ones from the container's own response
    fn container_concepts(&self, children: &[&SectionSummary], fresh: &[String]) -> Vec<String> {
        let inherited = dedup_concepts(
            children.iter().flat_map(|child| child.key_concepts.iter()),
            self.config.container_child_concepts,
        );
        let known: HashSet<String> = inherited.iter().map(|c| c.to_lowercase()).collect();
        let new_concepts = dedup_concepts(
            fresh.iter().filter(|c| !known.contains(&c.trim().to_lowercase())),
            self.config.container_new_concepts,
        );

        dedup_concepts(
            inherited.into_iter().chain(new_concepts),
            self.config.max_concepts_per_section,
        )
    }

    /// Summarize the whole document from its level-1 summaries
    ///
    /// Never fails: with no level-1 summary, or when the model call fails,
    /// a fixed sentence naming the document is returned instead.
    pub async fn synthesize_document(
        &self,
        title: &str,
        summaries: &BTreeMap<SectionId, SectionSummary>,
        section_count: usize,
        language: Language,
    ) -> String {
        let top_level = top_level_summaries(summaries);
        if top_level.is_empty() {
            info!("No top-level summaries; using fallback document summary");
            return fallback::no_summaries(title, section_count, language);
        }

        let input = top_level
            .iter()
            .map(|s| s.as_block())
            .collect::<Vec<_>>()
            .join("\n\n");
        let request = SummaryRequest {
            content: &input,
            context: "",
            kind: SummaryKind::Document,
            language,
            title,
            words: self.config.words(),
        };

        match self.model.generate_summary(&request).await {
            Ok(response) => {
                let summary = parse_summary_response(&response).summary;
                if summary.is_empty() {
                    warn!("Document summary response was empty; using fallback");
                    fallback::generation_failed(title, summaries.len(), language)
                } else {
                    info!("Document summary generated from {} sections", top_level.len());
                    summary
                }
            }
            Err(e) => {
                warn!("Document summary generation failed: {}", e);
                fallback::generation_failed(title, summaries.len(), language)
            }
        }
    }
}

/// Level-1 summaries in document order
fn top_level_summaries(summaries: &BTreeMap<SectionId, SectionSummary>) -> Vec<&SectionSummary> {
    let mut top_level: Vec<&SectionSummary> = summaries
        .values()
        .filter(|s| s.level == TOP_LEVEL)
        .collect();
    top_level.sort_by_key(|s| s.order_index);
    top_level
}

/// Labeled container content followed by the child summary blocks
fn synthesis_input(content: &str, children: &[&SectionSummary], language: Language) -> String {
    let (content_label, children_label) = match language {
        Language::English => ("Section content:", "Subsection summaries:"),
        Language::Spanish => ("Contenido de la sección:", "Resúmenes de las subsecciones:"),
    };

    let blocks = children
        .iter()
        .map(|child| child.as_block())
        .collect::<Vec<_>>()
        .join("\n\n");

    let content = content.trim();
    if content.is_empty() {
        format!("{}\n{}", children_label, blocks)
    } else {
        format!("{}\n{}\n\n{}\n{}", content_label, content, children_label, blocks)
    }
}

/// Fixed document summaries used when the model cannot provide one
pub mod fallback {
    use scriptor_domain::Language;

    /// The document has no sections at all
    pub fn empty_document(title: &str, language: Language) -> String {
        match language {
            Language::English => format!("The document \"{}\" contains no sections to summarize.", title),
            Language::Spanish => format!("El documento \"{}\" no contiene secciones para resumir.", title),
        }
    }

    /// Sections exist but none of the top-level ones was summarized
    pub fn no_summaries(title: &str, section_count: usize, language: Language) -> String {
        match language {
            Language::English => format!(
                "The document \"{}\" has {} sections, but none of them could be summarized.",
                title, section_count
            ),
            Language::Spanish => format!(
                "El documento \"{}\" tiene {} secciones, pero ninguna pudo resumirse.",
                title, section_count
            ),
        }
    }

    /// The document-level model call failed
    pub fn generation_failed(title: &str, summarized: usize, language: Language) -> String {
        match language {
            Language::English => format!(
                "The document \"{}\" is covered by {} section summaries.",
                title, summarized
            ),
            Language::Spanish => format!(
                "El documento \"{}\" está cubierto por {} resúmenes de sección.",
                title, summarized
            ),
        }
    }
}
