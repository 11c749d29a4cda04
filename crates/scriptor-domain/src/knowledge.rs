//! DocumentKnowledge - the final aggregate for one document

use crate::language::Language;
use crate::section::SectionId;
use crate::summary::{ConceptDefinition, SectionSummary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything learned about a document
///
/// Assembled once by [`DocumentKnowledge::assemble`] and read-only afterwards.
/// The hierarchy is always self-consistent: every id referenced by
/// `hierarchy_index`, `parent_child_map` or a summary's `parent_id` /
/// `child_ids` is a key of `section_summaries`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentKnowledge {
    /// Document title, formatting markers removed
    pub title: String,

    /// Document-level summary
    pub document_summary: String,

    /// Detected (or configured) language
    pub language: Language,

    /// Summaries keyed by section id
    pub section_summaries: BTreeMap<SectionId, SectionSummary>,

    /// Glossary
    pub concepts: Vec<ConceptDefinition>,

    /// Section ids per level, document order within a level
    pub hierarchy_index: BTreeMap<u32, Vec<SectionId>>,

    /// Child ids per parent, document order
    pub parent_child_map: BTreeMap<SectionId, Vec<SectionId>>,

    /// Number of summarized sections
    pub total_sections: usize,

    /// Number of glossary entries
    pub total_concepts: usize,

    /// Mean summary length in characters
    pub average_summary_length: f64,
}

impl DocumentKnowledge {
    /// Assemble the aggregate, dropping references to unsummarized sections
    pub fn assemble(
        title: String,
        document_summary: String,
        language: Language,
        summaries: BTreeMap<SectionId, SectionSummary>,
        concepts: Vec<ConceptDefinition>,
    ) -> Self {
        let section_summaries: BTreeMap<SectionId, SectionSummary> = summaries
            .iter()
            .map(|(id, summary)| {
                let mut consistent = summary.clone();
                consistent.child_ids.retain(|child| summaries.contains_key(child));
                if consistent
                    .parent_id
                    .as_ref()
                    .is_some_and(|parent| !summaries.contains_key(parent))
                {
                    consistent.parent_id = None;
                }
                (id.clone(), consistent)
            })
            .collect();

        let mut ordered: Vec<&SectionSummary> = section_summaries.values().collect();
        ordered.sort_by_key(|s| s.order_index);

        let mut hierarchy_index: BTreeMap<u32, Vec<SectionId>> = BTreeMap::new();
        for summary in &ordered {
            hierarchy_index
                .entry(summary.level)
                .or_default()
                .push(summary.section_id.clone());
        }

        let parent_child_map: BTreeMap<SectionId, Vec<SectionId>> = ordered
            .iter()
            .filter(|s| !s.child_ids.is_empty())
            .map(|s| (s.section_id.clone(), s.child_ids.clone()))
            .collect();

        let average_summary_length = if ordered.is_empty() {
            0.0
        } else {
            let total: usize = ordered.iter().map(|s| s.summary.chars().count()).sum();
            total as f64 / ordered.len() as f64
        };

        let concepts: Vec<ConceptDefinition> = concepts
            .into_iter()
            .map(|mut concept| {
                concept
                    .relevant_sections
                    .retain(|id| section_summaries.contains_key(id));
                concept
            })
            .collect();

        Self {
            title,
            document_summary,
            language,
            total_sections: section_summaries.len(),
            total_concepts: concepts.len(),
            section_summaries,
            concepts,
            hierarchy_index,
            parent_child_map,
            average_summary_length,
        }
    }

    /// Knowledge for a document with nothing to summarize
    pub fn empty(title: String, document_summary: String, language: Language) -> Self {
        Self::assemble(title, document_summary, language, BTreeMap::new(), Vec::new())
    }

    /// Summaries in document order
    pub fn summaries_in_order(&self) -> Vec<&SectionSummary> {
        let mut ordered: Vec<&SectionSummary> = self.section_summaries.values().collect();
        ordered.sort_by_key(|s| s.order_index);
        ordered
    }
}
