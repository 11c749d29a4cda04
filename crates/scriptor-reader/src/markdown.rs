//! Markdown to section tree
//!
//! Splits a document at ATX headings (`#` .. `######`). Headings inside
//! fenced code blocks are ignored.

use scriptor_domain::text::clean_title;
use scriptor_domain::{Section, SectionId};

/// Title used when a document has no heading at all
pub const UNTITLED: &str = "Untitled Document";

/// Result of parsing a document
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// Document title
    pub title: String,

    /// Sections in document order, with consistent parent/child links
    pub sections: Vec<Section>,
}

/// A block of lines introduced by a heading (or the preamble, which has none)
struct RawBlock<'a> {
    heading: Option<(u32, String)>,
    body: Vec<&'a str>,
}

/// Mutable section under construction; frozen into [`Section`] at the end
struct Draft {
    title: String,
    content: String,
    level: u32,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Parses Markdown into a [`ParsedDocument`]
///
/// If the document has exactly one level-1 heading and it is the first
/// heading, it becomes the document title and every other heading moves up
/// one level; text directly under it becomes an "Introduction" section.
///
/// # Examples
///
/// ```
/// use scriptor_reader::MarkdownParser;
///
/// let doc = MarkdownParser::parse("# Doc\n\n## A\n\nContent A\n\n## B\n\nContent B");
/// assert_eq!(doc.title, "Doc");
/// assert_eq!(doc.sections.len(), 2);
/// assert_eq!(doc.sections[0].level, 1);
/// ```
pub struct MarkdownParser;

impl MarkdownParser {
    /// Parse a Markdown document
    pub fn parse(source: &str) -> ParsedDocument {
        let blocks = split_blocks(source);

        let headings: Vec<&(u32, String)> = blocks.iter().filter_map(|b| b.heading.as_ref()).collect();
        let h1_count = headings.iter().filter(|(level, _)| *level == 1).count();
        let title_is_h1 = h1_count == 1 && headings.first().is_some_and(|(level, _)| *level == 1);

        let title = headings
            .first()
            .map(|(_, text)| text.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());

        let mut drafts: Vec<Draft> = Vec::new();
        for block in blocks {
            let content = block.body.join("\n").trim().to_string();
            match block.heading {
                None => {
                    if !content.is_empty() {
                        drafts.push(draft("Preamble", content, 1));
                    }
                }
                Some((1, _)) if title_is_h1 => {
                    if !content.is_empty() {
                        drafts.push(draft("Introduction", content, 1));
                    }
                }
                Some((level, text)) => {
                    let level = if title_is_h1 { (level - 1).max(1) } else { level };
                    drafts.push(draft(&text, content, level));
                }
            }
        }

        link_parents(&mut drafts);

        ParsedDocument {
            title,
            sections: freeze(drafts),
        }
    }
}

fn draft(title: &str, content: String, level: u32) -> Draft {
    Draft {
        title: title.to_string(),
        content,
        level,
        parent: None,
        children: Vec::new(),
    }
}

fn split_blocks(source: &str) -> Vec<RawBlock<'_>> {
    let mut blocks = vec![RawBlock {
        heading: None,
        body: Vec::new(),
    }];
    let mut in_fence = false;

    for line in source.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
        }

        let heading = if in_fence { None } else { parse_heading(trimmed) };
        match heading {
            Some(heading) => blocks.push(RawBlock {
                heading: Some(heading),
                body: Vec::new(),
            }),
            None => {
                if let Some(current) = blocks.last_mut() {
                    current.body.push(line);
                }
            }
        }
    }

    blocks
}

/// `## Title` -> `(2, "Title")`
fn parse_heading(line: &str) -> Option<(u32, String)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    // Closing hashes are decoration: "## Title ##"
    let text = rest.trim().trim_end_matches('#');
    Some((hashes as u32, clean_title(text)))
}

/// Parent = nearest preceding section with a smaller level
fn link_parents(drafts: &mut [Draft]) {
    let mut stack: Vec<(usize, u32)> = Vec::new();
    for idx in 0..drafts.len() {
        let level = drafts[idx].level;
        while stack.last().is_some_and(|&(_, top_level)| top_level >= level) {
            stack.pop();
        }
        if let Some(&(parent, _)) = stack.last() {
            drafts[idx].parent = Some(parent);
            drafts[parent].children.push(idx);
        }
        stack.push((idx, level));
    }
}

fn section_id(index: usize) -> SectionId {
    SectionId::new(format!("section-{}", index))
}

fn freeze(drafts: Vec<Draft>) -> Vec<Section> {
    drafts
        .into_iter()
        .enumerate()
        .map(|(index, d)| Section {
            id: section_id(index),
            title: d.title,
            content: d.content,
            level: d.level,
            parent_id: d.parent.map(section_id),
            children: d.children.into_iter().map(section_id).collect(),
            order_index: index,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptor_domain::SectionTree;

    fn titles(doc: &ParsedDocument) -> Vec<(&str, u32)> {
        doc.sections.iter().map(|s| (s.title.as_str(), s.level)).collect()
    }

    #[test]
    fn test_single_h1_becomes_title() {
        let doc = MarkdownParser::parse("# Doc\n\n## A\n\nContent A\n\n## B\n\nContent B");
        assert_eq!(doc.title, "Doc");
        assert_eq!(titles(&doc), vec![("A", 1), ("B", 1)]);
        assert_eq!(doc.sections[0].content, "Content A");
        assert!(doc.sections.iter().all(|s| s.is_leaf()));
    }

    #[test]
    fn test_text_under_title_becomes_introduction() {
        let doc = MarkdownParser::parse("# Doc\nOpening words.\n## A\nBody");
        assert_eq!(titles(&doc), vec![("Introduction", 1), ("A", 1)]);
        assert_eq!(doc.sections[0].content, "Opening words.");
    }

    #[test]
    fn test_multiple_h1_keep_levels() {
        let doc = MarkdownParser::parse("Intro text\n# One\nx\n## One.a\ny\n# Two\nz");
        assert_eq!(doc.title, "One");
        assert_eq!(
            titles(&doc),
            vec![("Preamble", 1), ("One", 1), ("One.a", 2), ("Two", 1)]
        );
        assert_eq!(doc.sections[2].parent_id, Some(SectionId::from("section-1")));
        assert_eq!(doc.sections[1].children, vec![SectionId::from("section-2")]);
    }

    #[test]
    fn test_nested_containers() {
        let source = "# Book\n## Somatic Framework\n### Empathy\ntext\n### Biology\ntext\n## Other\ntext";
        let doc = MarkdownParser::parse(source);
        assert_eq!(
            titles(&doc),
            vec![("Somatic Framework", 1), ("Empathy", 2), ("Biology", 2), ("Other", 1)]
        );
        assert_eq!(doc.sections[0].children.len(), 2);
        assert!(SectionTree::new(doc.sections).is_ok());
    }

    #[test]
    fn test_skipped_levels_attach_to_nearest_ancestor() {
        let doc = MarkdownParser::parse("# A\nx\n### Deep\ny\n# B\nz");
        assert_eq!(doc.sections[1].level, 3);
        assert_eq!(doc.sections[1].parent_id, Some(SectionId::from("section-0")));
    }

    #[test]
    fn test_headings_in_code_fences_ignored() {
        let doc = MarkdownParser::parse("# Doc\n## Code\n```\n# not a heading\n```\n");
        assert_eq!(titles(&doc), vec![("Code", 1)]);
        assert!(doc.sections[0].content.contains("# not a heading"));
    }

    #[test]
    fn test_heading_requires_space() {
        let doc = MarkdownParser::parse("#hashtag\n# Real");
        assert_eq!(doc.title, "Real");
        assert_eq!(doc.sections[0].title, "Preamble");
    }

    #[test]
    fn test_closing_hashes_and_markup_stripped() {
        let doc = MarkdownParser::parse("# **Doc** #\n## `A` ##\nx");
        assert_eq!(doc.title, "Doc");
        assert_eq!(doc.sections[0].title, "A");
    }

    #[test]
    fn test_no_headings() {
        let doc = MarkdownParser::parse("Just some text.\n\nMore text.");
        assert_eq!(doc.title, UNTITLED);
        assert_eq!(titles(&doc), vec![("Preamble", 1)]);
    }

    #[test]
    fn test_empty_document() {
        let doc = MarkdownParser::parse("");
        assert_eq!(doc.title, UNTITLED);
        assert!(doc.sections.is_empty());
    }

    #[test]
    fn test_order_indices_are_sequential() {
        let doc = MarkdownParser::parse("# A\n## B\n## C\n# D");
        let orders: Vec<_> = doc.sections.iter().map(|s| s.order_index).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
    }
}
