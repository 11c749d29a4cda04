//! Parser for labeled summary responses
//!
//! Summary prompts ask for a `Summary:` line and a `Key Concepts:` line
//! (`Resumen:` / `Conceptos Clave:` in Spanish). Models follow that only
//! loosely, so the parser accepts bold or differently cased labels and
//! multi-line sections, and falls back to treating the whole response as
//! the summary when no label is present.

use crate::cleaning::strip_reasoning;
use scriptor_domain::text::split_concept_list;

const SUMMARY_LABELS: &[&str] = &["summary", "resumen"];
const CONCEPT_LABELS: &[&str] = &["key concepts", "conceptos clave", "concepts", "conceptos"];

/// A summary response split into its parts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSummary {
    /// Summary text
    pub summary: String,

    /// Inline concept names, in response order (not deduplicated)
    pub concepts: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    None,
    Summary,
    Concepts,
}

/// Parse a summary response
///
/// # Examples
///
/// ```
/// use scriptor_reader::parse_summary_response;
///
/// let parsed = parse_summary_response("Summary: Short.\nKey Concepts: [a, b]");
/// assert_eq!(parsed.summary, "Short.");
/// assert_eq!(parsed.concepts, vec!["a", "b"]);
///
/// let unlabeled = parse_summary_response("Just prose.");
/// assert_eq!(unlabeled.summary, "Just prose.");
/// assert!(unlabeled.concepts.is_empty());
/// ```
pub fn parse_summary_response(response: &str) -> ParsedSummary {
    let text = strip_reasoning(response);

    let mut summary_lines: Vec<&str> = Vec::new();
    let mut concept_lines: Vec<&str> = Vec::new();
    let mut field = Field::None;
    let mut saw_label = false;

    for line in text.lines() {
        if let Some((label, rest)) = split_label(line) {
            saw_label = true;
            field = label;
            match label {
                Field::Summary => summary_lines.push(rest),
                Field::Concepts => concept_lines.push(rest),
                Field::None => {}
            }
            continue;
        }
        match field {
            Field::Summary => summary_lines.push(line),
            Field::Concepts => concept_lines.push(line),
            Field::None => {}
        }
    }

    if !saw_label || summary_lines.iter().all(|l| l.trim().is_empty()) {
        // Unlabeled prose before a concepts line still counts as the summary
        let prose = if saw_label {
            leading_prose(&text)
        } else {
            text.trim().to_string()
        };
        return ParsedSummary {
            summary: prose,
            concepts: split_concept_list(&concept_lines.join("\n")),
        };
    }

    ParsedSummary {
        summary: summary_lines.join("\n").trim().to_string(),
        concepts: split_concept_list(&concept_lines.join("\n")),
    }
}

/// Text before the first labeled line
fn leading_prose(text: &str) -> String {
    text.lines()
        .take_while(|line| split_label(line).is_none())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Recognize `Label: rest`, tolerating `**Label:**`, `**Label**:` and `## Label:`
fn split_label(line: &str) -> Option<(Field, &str)> {
    let trimmed = line.trim_start().trim_start_matches(['#', '*', '_']).trim_start();
    let colon = trimmed.find(':')?;
    let label = trimmed[..colon].trim().trim_end_matches(['*', '_']).trim();
    let label_lower = label.to_lowercase();

    let field = if SUMMARY_LABELS.contains(&label_lower.as_str()) {
        Field::Summary
    } else if CONCEPT_LABELS.contains(&label_lower.as_str()) {
        Field::Concepts
    } else {
        return None;
    };

    let rest = trimmed[colon + 1..].trim_start_matches(['*', '_']).trim();
    Some((field, rest))
}
