//! Section module - the nodes of a parsed document

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Identifier of a section, assigned by the parser
///
/// Unique within one document. Ordering is lexical and only used to give
/// maps a stable iteration order; document order is carried by
/// [`Section::order_index`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    /// Create a section id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SectionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A document section
///
/// Sections are created once during parsing and never mutated afterwards.
/// A section is a *leaf* (content section) iff it has no children; otherwise
/// it is a *container*.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Unique identifier
    pub id: SectionId,

    /// Display title
    pub title: String,

    /// Raw text body (may be empty for pure containers)
    pub content: String,

    /// Depth in the document, 0 = root
    pub level: u32,

    /// Parent section (back-reference only)
    pub parent_id: Option<SectionId>,

    /// Children in document order
    pub children: Vec<SectionId>,

    /// Position in the document, unique and monotonically assigned
    pub order_index: usize,
}

impl Section {
    /// Whether this is a content section (no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether this section groups at least one child
    pub fn is_container(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Contract violations in a parsed section list
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Two sections share an id
    #[error("Duplicate section id: {0}")]
    DuplicateId(SectionId),

    /// Two sections share an order index
    #[error("Duplicate order index {index} (section {section})")]
    DuplicateOrderIndex {
        /// Offending section
        section: SectionId,
        /// The repeated index
        index: usize,
    },

    /// A parent id does not resolve to a section
    #[error("Section {section} references unknown parent {parent}")]
    UnknownParent {
        /// Child section
        section: SectionId,
        /// Missing parent id
        parent: SectionId,
    },

    /// A child id does not resolve to a section
    #[error("Section {section} references unknown child {child}")]
    UnknownChild {
        /// Parent section
        section: SectionId,
        /// Missing child id
        child: SectionId,
    },

    /// Parent and child disagree about their relationship
    #[error("Section {child} is not consistently linked to parent {parent}")]
    InconsistentLink {
        /// Parent section
        parent: SectionId,
        /// Child section
        child: SectionId,
    },

    /// A parent must precede its children in document order
    #[error("Parent {parent} does not precede child {child} in document order")]
    ParentAfterChild {
        /// Parent section
        parent: SectionId,
        /// Child section
        child: SectionId,
    },
}

/// Validated collection of sections, kept in document order
///
/// # Examples
///
/// ```
/// use scriptor_domain::{Section, SectionTree};
///
/// let leaf = Section {
///     id: "intro".into(),
///     title: "Intro".to_string(),
///     content: "Hello".to_string(),
///     level: 1,
///     parent_id: None,
///     children: vec![],
///     order_index: 0,
/// };
/// let tree = SectionTree::new(vec![leaf]).unwrap();
/// assert_eq!(tree.leaves().count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SectionTree {
    sections: Vec<Section>,
    index: HashMap<SectionId, usize>,
}

impl SectionTree {
    /// Build a tree, checking the parser contract
    ///
    /// Every parent id must resolve, child lists must agree with parent ids,
    /// ids and order indices must be unique, and a parent must come before its
    /// children in document order (which also rules out cycles).
    pub fn new(mut sections: Vec<Section>) -> Result<Self, TreeError> {
        sections.sort_by_key(|s| s.order_index);

        let mut index = HashMap::with_capacity(sections.len());
        let mut seen_orders = HashSet::with_capacity(sections.len());
        for (pos, section) in sections.iter().enumerate() {
            if index.insert(section.id.clone(), pos).is_some() {
                return Err(TreeError::DuplicateId(section.id.clone()));
            }
            if !seen_orders.insert(section.order_index) {
                return Err(TreeError::DuplicateOrderIndex {
                    section: section.id.clone(),
                    index: section.order_index,
                });
            }
        }

        for section in &sections {
            if let Some(parent_id) = &section.parent_id {
                let parent = index
                    .get(parent_id)
                    .map(|&pos| &sections[pos])
                    .ok_or_else(|| TreeError::UnknownParent {
                        section: section.id.clone(),
                        parent: parent_id.clone(),
                    })?;
                if !parent.children.contains(&section.id) {
                    return Err(TreeError::InconsistentLink {
                        parent: parent_id.clone(),
                        child: section.id.clone(),
                    });
                }
                if parent.order_index >= section.order_index {
                    return Err(TreeError::ParentAfterChild {
                        parent: parent_id.clone(),
                        child: section.id.clone(),
                    });
                }
            }

            for child_id in &section.children {
                let child = index
                    .get(child_id)
                    .map(|&pos| &sections[pos])
                    .ok_or_else(|| TreeError::UnknownChild {
                        section: section.id.clone(),
                        child: child_id.clone(),
                    })?;
                if child.parent_id.as_ref() != Some(&section.id) {
                    return Err(TreeError::InconsistentLink {
                        parent: section.id.clone(),
                        child: child_id.clone(),
                    });
                }
            }
        }

        Ok(Self { sections, index })
    }

    /// Look up a section by id
    pub fn get(&self, id: &SectionId) -> Option<&Section> {
        self.index.get(id).map(|&pos| &self.sections[pos])
    }

    /// All sections in ascending order index
    pub fn in_order(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Content sections in ascending order index
    pub fn leaves(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|s| s.is_leaf())
    }

    /// Container sections, deepest level first, document order within a level
    pub fn containers_deepest_first(&self) -> Vec<&Section> {
        let mut containers: Vec<&Section> =
            self.sections.iter().filter(|s| s.is_container()).collect();
        containers.sort_by_key(|s| (Reverse(s.level), s.order_index));
        containers
    }

    /// Sections at a given level, in document order
    pub fn at_level(&self, level: u32) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(move |s| s.level == level)
    }

    /// Number of sections
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the tree has no sections
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
