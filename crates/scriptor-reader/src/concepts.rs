//! Glossary construction
//!
//! Concept names from every summary are grouped by normalized id, scored,
//! cut down to a bounded glossary and defined one by one. A failed
//! definition falls back to a fixed sentence and never blocks the others.

use crate::cleaning::clean_definition;
use crate::config::ReadingConfig;
use scriptor_domain::text::normalize_concept;
use scriptor_domain::traits::SummaryModel;
use scriptor_domain::{ConceptDefinition, Language, SectionId, SectionSummary};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Score every concept starts from
const BASE_SCORE: f64 = 1.0;
/// Bonus per extra section mentioning the concept
const SECTION_BONUS: f64 = 0.5;
/// Extra sections that still earn a bonus
const MAX_SECTION_BONUSES: usize = 4;
/// Bonus per extra word in the concept name
const WORD_BONUS: f64 = 0.25;
/// Extra words that still earn a bonus
const MAX_WORD_BONUSES: usize = 2;

/// A concept gathered from the summaries, before definition
#[derive(Debug, Clone, PartialEq)]
pub struct ConceptMention {
    /// Normalized id
    pub concept_id: String,

    /// First-seen spelling
    pub name: String,

    /// Sections mentioning the concept, in document order, no repeats
    pub sections: Vec<SectionId>,

    /// Order index of the first mentioning section
    pub first_order: usize,
}

impl ConceptMention {
    /// Section of first mention
    pub fn first_mentioned_in(&self) -> Option<&SectionId> {
        self.sections.first()
    }

    /// Glossary score: coverage across sections plus a bonus for multi-word names
    pub fn score(&self) -> f64 {
        let extra_sections = self.sections.len().saturating_sub(1).min(MAX_SECTION_BONUSES);
        let extra_words = self
            .concept_id
            .split_whitespace()
            .count()
            .saturating_sub(1)
            .min(MAX_WORD_BONUSES);
        BASE_SCORE + extra_sections as f64 * SECTION_BONUS + extra_words as f64 * WORD_BONUS
    }
}

/// Builds the document glossary
pub struct ConceptAggregator<'a, M> {
    model: &'a M,
    config: &'a ReadingConfig,
}

impl<'a, M> ConceptAggregator<'a, M>
where
    M: SummaryModel,
{
    /// Create an aggregator over a model and configuration
    pub fn new(model: &'a M, config: &'a ReadingConfig) -> Self {
        Self { model, config }
    }

    /// Collect, filter and define the glossary for a set of summaries
    pub async fn aggregate(
        &self,
        summaries: &BTreeMap<SectionId, SectionSummary>,
        language: Language,
    ) -> Vec<ConceptDefinition> {
        let mentions = collect_mentions(summaries);
        let total = mentions.len();
        let kept = self.filter(mentions);
        info!("Glossary: {} unique concepts, {} kept", total, kept.len());

        let mut definitions = Vec::with_capacity(kept.len());
        for mention in &kept {
            definitions.push(self.define(mention, summaries, language).await);
        }
        definitions
    }

    /// Highest-scoring concepts, best first
    ///
    /// Ties go to the concept mentioned earlier. When there are no more than
    /// `glossary_min_concepts` concepts, all of them are kept.
    pub fn filter(&self, mut mentions: Vec<ConceptMention>) -> Vec<ConceptMention> {
        mentions.sort_by(|a, b| {
            b.score()
                .partial_cmp(&a.score())
                .unwrap_or(Ordering::Equal)
                .then(a.first_order.cmp(&b.first_order))
                .then_with(|| a.concept_id.cmp(&b.concept_id))
        });

        if mentions.len() > self.config.glossary_min_concepts {
            mentions.truncate(self.config.glossary_max_concepts);
        }
        mentions
    }

    /// Define one concept from the sections that mention it
    pub async fn define(
        &self,
        mention: &ConceptMention,
        summaries: &BTreeMap<SectionId, SectionSummary>,
        language: Language,
    ) -> ConceptDefinition {
        let ranked = rank_sections(mention, summaries);
        let context = ranked
            .iter()
            .take(self.config.definition_context_sections)
            .filter_map(|id| summaries.get(id))
            .map(|s| s.as_block())
            .collect::<Vec<_>>()
            .join("\n\n");

        let definition = match self
            .model
            .generate_definition(&mention.name, &context, language)
            .await
        {
            Ok(raw) => {
                let cleaned = clean_definition(&raw, &mention.name);
                if cleaned.is_empty() {
                    warn!("Empty definition for '{}'; using fallback", mention.name);
                    fallback_definition(&mention.name, language)
                } else {
                    cleaned
                }
            }
            Err(e) => {
                warn!("Definition failed for '{}': {}", mention.name, e);
                fallback_definition(&mention.name, language)
            }
        };
        debug!(concept = %mention.concept_id, "Concept defined");

        ConceptDefinition {
            concept_id: mention.concept_id.clone(),
            name: mention.name.clone(),
            definition,
            first_mentioned_in: mention
                .first_mentioned_in()
                .cloned()
                .unwrap_or_else(|| SectionId::new("")),
            relevant_sections: ranked
                .into_iter()
                .take(self.config.max_relevant_sections)
                .collect(),
        }
    }

    /// Merge glossaries from separate passes over the same document
    ///
    /// Entries whose names normalize to the same id become one. The variant
    /// with the longer definition wins; the first-seen entry keeps its
    /// first mention and its relevant sections come first.
    pub fn merge_definitions(
        &self,
        existing: Vec<ConceptDefinition>,
        incoming: Vec<ConceptDefinition>,
    ) -> Vec<ConceptDefinition> {
        let mut merged: Vec<ConceptDefinition> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for mut entry in existing.into_iter().chain(incoming) {
            entry.concept_id = normalize_concept(&entry.name);
            match index.get(&entry.concept_id) {
                Some(&pos) => {
                    let current = &mut merged[pos];
                    if entry.definition.chars().count() > current.definition.chars().count() {
                        current.name = entry.name;
                        current.definition = entry.definition;
                    }
                    for id in entry.relevant_sections {
                        if !current.relevant_sections.contains(&id) {
                            current.relevant_sections.push(id);
                        }
                    }
                    current.relevant_sections.truncate(self.config.max_relevant_sections);
                }
                None => {
                    index.insert(entry.concept_id.clone(), merged.len());
                    entry.relevant_sections.truncate(self.config.max_relevant_sections);
                    merged.push(entry);
                }
            }
        }
        merged
    }
}

/// Group every key concept by normalized id
///
/// Summaries are visited in document order, so the first-seen spelling and
/// first mention come from the earliest section.
pub fn collect_mentions(summaries: &BTreeMap<SectionId, SectionSummary>) -> Vec<ConceptMention> {
    let mut ordered: Vec<&SectionSummary> = summaries.values().collect();
    ordered.sort_by_key(|s| s.order_index);

    let mut mentions: Vec<ConceptMention> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for summary in ordered {
        for name in &summary.key_concepts {
            let concept_id = normalize_concept(name);
            if concept_id.is_empty() {
                continue;
            }
            match index.get(&concept_id) {
                Some(&pos) => {
                    let mention = &mut mentions[pos];
                    if !mention.sections.contains(&summary.section_id) {
                        mention.sections.push(summary.section_id.clone());
                    }
                }
                None => {
                    index.insert(concept_id.clone(), mentions.len());
                    mentions.push(ConceptMention {
                        concept_id,
                        name: name.trim().to_string(),
                        sections: vec![summary.section_id.clone()],
                        first_order: summary.order_index,
                    });
                }
            }
        }
    }
    mentions
}

/// Mentioning sections, most occurrences of the concept in their summary first
fn rank_sections(
    mention: &ConceptMention,
    summaries: &BTreeMap<SectionId, SectionSummary>,
) -> Vec<SectionId> {
    let mut ranked: Vec<(usize, usize, &SectionId)> = mention
        .sections
        .iter()
        .filter_map(|id| summaries.get(id).map(|s| (s, id)))
        .map(|(summary, id)| {
            let text = normalize_concept(&summary.summary);
            let hits = text.matches(mention.concept_id.as_str()).count();
            (hits, summary.order_index, id)
        })
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    ranked.into_iter().map(|(_, _, id)| id.clone()).collect()
}

/// Definition used when the model gives none
pub fn fallback_definition(name: &str, language: Language) -> String {
    match language {
        Language::English => format!("{} is a key concept discussed in this document.", name),
        Language::Spanish => format!("{} es un concepto clave tratado en este documento.", name),
    }
}
