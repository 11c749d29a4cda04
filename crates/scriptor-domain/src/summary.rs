//! Summary and glossary value types

use crate::section::{Section, SectionId};
use serde::{Deserialize, Serialize};

/// Summary of one section
///
/// Carries denormalized copies of the originating section's hierarchy
/// fields so later stages can work from the summary map alone. Never
/// mutated after creation; a newer summary replaces it in the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    /// Originating section
    pub section_id: SectionId,

    /// Cleaned section title
    pub title: String,

    /// Summary text
    pub summary: String,

    /// Key concept names, first-seen order
    pub key_concepts: Vec<String>,

    /// Confidence in [0, 1]
    pub confidence: f64,

    /// Level of the originating section
    pub level: u32,

    /// Order index of the originating section
    pub order_index: usize,

    /// Parent of the originating section
    pub parent_id: Option<SectionId>,

    /// Children of the originating section
    pub child_ids: Vec<SectionId>,
}

impl SectionSummary {
    /// Build a summary for `section`, copying its hierarchy fields
    pub fn for_section(
        section: &Section,
        title: String,
        summary: String,
        key_concepts: Vec<String>,
        confidence: f64,
    ) -> Self {
        Self {
            section_id: section.id.clone(),
            title,
            summary,
            key_concepts,
            confidence: confidence.clamp(0.0, 1.0),
            level: section.level,
            order_index: section.order_index,
            parent_id: section.parent_id.clone(),
            child_ids: section.children.clone(),
        }
    }

    /// `"{title}: {summary}"`, the block form used in prompts and context
    pub fn as_block(&self) -> String {
        format!("{}: {}", self.title, self.summary)
    }
}

/// One glossary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptDefinition {
    /// Normalized id (lowercase, separators unified)
    pub concept_id: String,

    /// Display name, first-seen spelling
    pub name: String,

    /// Generated definition
    pub definition: String,

    /// Section where the concept first appears
    pub first_mentioned_in: SectionId,

    /// Most relevant sections, at most five
    pub relevant_sections: Vec<SectionId>,
}
