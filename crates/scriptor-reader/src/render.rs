//! Output rendering for [`DocumentKnowledge`]

use crate::error::ReaderError;
use scriptor_domain::{DocumentKnowledge, SectionSummary};
use std::fmt::Write;

/// Indentation per hierarchy level in the text rendering
const INDENT: &str = "  ";

/// Pretty JSON with the aggregate's field names
pub fn render_json(knowledge: &DocumentKnowledge) -> Result<String, ReaderError> {
    Ok(serde_json::to_string_pretty(knowledge)?)
}

/// Plain text: header, document summary, section tree, glossary
///
/// Sections are nested under their parents in document order.
pub fn render_text(knowledge: &DocumentKnowledge) -> String {
    let mut out = String::new();

    heading(&mut out, &knowledge.title, '=');
    let _ = writeln!(out, "Language: {}", knowledge.language);
    let _ = writeln!(
        out,
        "Sections: {} | Concepts: {} | Average summary length: {:.0} chars",
        knowledge.total_sections, knowledge.total_concepts, knowledge.average_summary_length
    );
    out.push('\n');

    heading(&mut out, "Summary", '-');
    let _ = writeln!(out, "{}", knowledge.document_summary);

    let ordered = knowledge.summaries_in_order();
    if !ordered.is_empty() {
        out.push('\n');
        heading(&mut out, "Sections", '-');
        for root in ordered.iter().filter(|s| s.parent_id.is_none()) {
            write_section(&mut out, knowledge, root, 0);
        }
    }

    if !knowledge.concepts.is_empty() {
        out.push('\n');
        heading(&mut out, "Glossary", '-');
        for concept in &knowledge.concepts {
            let _ = writeln!(out, "{}: {}", concept.name, concept.definition);
        }
    }

    out
}

fn heading(out: &mut String, text: &str, underline: char) {
    let _ = writeln!(out, "{}", text);
    let _ = writeln!(out, "{}", underline.to_string().repeat(text.chars().count().max(3)));
}

fn write_section(out: &mut String, knowledge: &DocumentKnowledge, summary: &SectionSummary, depth: usize) {
    let indent = INDENT.repeat(depth);
    let _ = writeln!(out, "{}- {}", indent, summary.title);
    for line in summary.summary.lines().filter(|l| !l.trim().is_empty()) {
        let _ = writeln!(out, "{}{}{}", indent, INDENT, line.trim());
    }
    if !summary.key_concepts.is_empty() {
        let _ = writeln!(
            out,
            "{}{}Key concepts: {}",
            indent,
            INDENT,
            summary.key_concepts.join(", ")
        );
    }

    for child_id in &summary.child_ids {
        if let Some(child) = knowledge.section_summaries.get(child_id) {
            write_section(out, knowledge, child, depth + 1);
        }
    }
}
