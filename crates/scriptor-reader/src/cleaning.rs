//! Cleanup of raw model text
//!
//! Models wrap answers in reasoning blocks and meta-commentary ("Based on
//! the context, ..."). These helpers strip that noise before text is stored.

use regex::Regex;
use std::sync::LazyLock;

static REASONING_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(think|thinking|reasoning)>.*?</(think|thinking|reasoning)>|\[(thinking|reasoning)\].*?\[/(thinking|reasoning)\]")
        .expect("valid reasoning block regex")
});

/// An opened reasoning block that never closes swallows the rest of the text
static UNCLOSED_REASONING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(<(think|thinking|reasoning)>|\[(thinking|reasoning)\]).*$")
        .expect("valid unclosed reasoning regex")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Meta-commentary prefixes, matched case-insensitively
const DEFINITION_PREFIXES: &[&str] = &[
    "definition:",
    "definición:",
    "definicion:",
    "based on the provided context,",
    "based on the context,",
    "according to the context,",
    "in this context,",
    "según el contexto,",
    "de acuerdo con el contexto,",
    "en este contexto,",
];

/// Remove reasoning blocks such as `<think>...</think>` or `[thinking]...[/thinking]`
///
/// # Examples
///
/// ```
/// use scriptor_reader::strip_reasoning;
///
/// assert_eq!(strip_reasoning("<think>hmm</think>Answer"), "Answer");
/// ```
pub fn strip_reasoning(text: &str) -> String {
    let closed = REASONING_BLOCK.replace_all(text, "");
    UNCLOSED_REASONING.replace(&closed, "").trim().to_string()
}

/// Collapse runs of whitespace into single spaces
fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Clean a raw definition for `concept`
///
/// Strips reasoning blocks, bold markers, known prefixes and a leading
/// `"{concept}:"`. The result has collapsed whitespace, a capitalized first
/// letter and closing punctuation, or is empty when nothing is left.
pub fn clean_definition(raw: &str, concept: &str) -> String {
    let without_reasoning = strip_reasoning(raw);
    let mut text = collapse_whitespace(&without_reasoning.replace("**", ""));

    loop {
        let before = text.len();
        text = text
            .trim_matches(|c: char| matches!(c, '"' | '\'' | '*') || c.is_whitespace())
            .to_string();
        text = strip_prefix_ci(&text, DEFINITION_PREFIXES);

        let concept_prefix = format!("{}:", concept.trim());
        text = strip_prefix_ci(&text, &[concept_prefix.as_str()]);

        if text.len() == before {
            break;
        }
    }

    if text.is_empty() {
        return text;
    }

    let mut chars = text.chars();
    let mut cleaned: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    if !cleaned.ends_with(['.', '!', '?']) {
        cleaned.push('.');
    }
    cleaned
}

fn strip_prefix_ci(text: &str, prefixes: &[&str]) -> String {
    for prefix in prefixes {
        if let Some(rest) = strip_one_ci(text, prefix) {
            return rest.trim_start().to_string();
        }
    }
    text.to_string()
}

/// Case-insensitive prefix match, compared one char at a time
fn strip_one_ci<'t>(text: &'t str, prefix: &str) -> Option<&'t str> {
    let mut chars = text.chars();
    for expected in prefix.chars() {
        let actual = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    Some(chars.as_str())
}
