//! Text helpers shared by the reader and the model layer

use std::collections::HashSet;

/// Normalized concept id
///
/// Lowercases, turns `_` and `-` into spaces and collapses whitespace, so
/// `"Machine Learning"`, `"machine_learning"` and `"MACHINE-LEARNING"` all
/// map to `"machine learning"`. Idempotent.
///
/// # Examples
///
/// ```
/// use scriptor_domain::text::normalize_concept;
///
/// assert_eq!(normalize_concept("MACHINE-LEARNING"), "machine learning");
/// assert_eq!(normalize_concept(&normalize_concept("a_b")), "a b");
/// ```
pub fn normalize_concept(name: &str) -> String {
    name.to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Deduplicate concept names by case-insensitive exact match
///
/// Keeps first-seen order and spelling, trims each name, drops empties and
/// stops after `cap` names.
pub fn dedup_concepts<I, S>(names: I, cap: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for name in names {
        if result.len() >= cap {
            break;
        }
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            result.push(trimmed.to_string());
        }
    }
    result
}

/// Split a loosely formatted concept list into names
///
/// Accepts `[a, b]`, `a; b`, bullet lists and numbered lists. Bullets,
/// numbering, quotes and emphasis markers are stripped from every item.
pub fn split_concept_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');

    trimmed
        .lines()
        .flat_map(|line| line.split([',', ';']))
        .map(clean_list_item)
        .filter(|item| !item.is_empty() && item.chars().count() <= 100)
        .collect()
}

fn clean_list_item(item: &str) -> String {
    let mut item = item.trim();

    // Bullets
    item = item.trim_start_matches(['-', '*', '•', '+']).trim_start();

    // Numbering: "1." or "1)"
    let digits = item.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &item[digits..];
        if let Some(stripped) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            item = stripped.trim_start();
        }
    }

    item.replace("**", "")
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '[' | ']' | '.' | '*') || c.is_whitespace())
        .to_string()
}

/// Remove Markdown formatting markers from a title
///
/// # Examples
///
/// ```
/// use scriptor_domain::text::clean_title;
///
/// assert_eq!(clean_title("## **Somatic  Framework**"), "Somatic Framework");
/// ```
pub fn clean_title(title: &str) -> String {
    let stripped = title.replace("**", "").replace("__", "").replace('`', "");
    stripped
        .trim_matches(|c: char| matches!(c, '#' | '*' | '_') || c.is_whitespace())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
