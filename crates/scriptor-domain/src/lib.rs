//! Scriptor Domain Layer
//!
//! Core data model and collaborator boundaries for progressive, hierarchical
//! document summarization. Everything here is pure: no I/O, no model calls.
//!
//! ## Key Concepts
//!
//! - **Section**: an immutable node of the parsed document tree
//! - **SectionTree**: validated, ordered collection of sections
//! - **SectionSummary**: the summary produced for one section
//! - **ConceptDefinition**: one glossary entry
//! - **DocumentKnowledge**: the final, read-only aggregate for a document
//!
//! ## Architecture
//!
//! Infrastructure (model clients, prompt templates) and the reading pipeline
//! live in other crates and depend on the traits defined in [`traits`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod knowledge;
pub mod language;
pub mod section;
pub mod summary;
pub mod text;
pub mod traits;

// Re-exports for convenience
pub use knowledge::DocumentKnowledge;
pub use language::Language;
pub use section::{Section, SectionId, SectionTree, TreeError};
pub use summary::{ConceptDefinition, SectionSummary};
