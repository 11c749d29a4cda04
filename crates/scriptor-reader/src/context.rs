//! Rolling window of earlier summaries fed into each new section prompt

use std::collections::VecDeque;

/// Separator between context entries
const ENTRY_SEPARATOR: &str = "\n\n";

/// Bounded accumulated context
///
/// Holds `"{title}: {summary}"` entries in document order. When the joined
/// text grows past the character budget the oldest entries are dropped
/// first; the newest entry is always kept, even if it alone exceeds the
/// budget.
///
/// # Examples
///
/// ```
/// use scriptor_reader::ContextAccumulator;
///
/// let mut context = ContextAccumulator::new(40);
/// context.push("A", "first summary");
/// context.push("B", "second summary");
/// context.push("C", "third summary");
/// assert_eq!(context.render(), "B: second summary\n\nC: third summary");
/// ```
#[derive(Debug, Clone)]
pub struct ContextAccumulator {
    entries: VecDeque<String>,
    budget: usize,
    /// Characters of the joined text, kept in step with `entries`
    chars: usize,
}

impl ContextAccumulator {
    /// Create an empty accumulator with a budget in characters
    pub fn new(budget: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            budget,
            chars: 0,
        }
    }

    /// Append a summary and trim from the front until the window fits
    pub fn push(&mut self, title: &str, summary: &str) {
        let entry = format!("{}: {}", title, summary);
        if !self.entries.is_empty() {
            self.chars += ENTRY_SEPARATOR.len();
        }
        self.chars += entry.chars().count();
        self.entries.push_back(entry);

        while self.chars > self.budget && self.entries.len() > 1 {
            if let Some(dropped) = self.entries.pop_front() {
                self.chars -= dropped.chars().count() + ENTRY_SEPARATOR.len();
            }
        }
    }

    /// The context string for the next prompt
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(ENTRY_SEPARATOR)
    }

    /// Number of entries currently in the window
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been accumulated
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Length of [`render`](Self::render) in characters
    pub fn char_len(&self) -> usize {
        self.chars
    }

    /// Character budget
    pub fn budget(&self) -> usize {
        self.budget
    }
}
