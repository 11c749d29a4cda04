//! Prompt template store
//!
//! Templates are plain strings with `{name}` placeholders. Rendering is a
//! pure function of template, variables and language.

use crate::LlmError;
use scriptor_domain::Language;

/// The prompts the reading pipeline needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptTemplate {
    /// Summarize one content section with accumulated context
    SectionSummary,
    /// Synthesize a container from its content and child summaries
    ContainerSummary,
    /// Synthesize the whole document from top-level summaries
    DocumentSummary,
    /// List key concepts of a section
    ConceptExtraction,
    /// Define one concept from section context
    Definition,
}

impl PromptTemplate {
    /// Template text for a language
    pub fn text(&self, language: Language) -> &'static str {
        match (self, language) {
            (Self::SectionSummary, Language::English) => SECTION_SUMMARY_EN,
            (Self::SectionSummary, Language::Spanish) => SECTION_SUMMARY_ES,
            (Self::ContainerSummary, Language::English) => CONTAINER_SUMMARY_EN,
            (Self::ContainerSummary, Language::Spanish) => CONTAINER_SUMMARY_ES,
            (Self::DocumentSummary, Language::English) => DOCUMENT_SUMMARY_EN,
            (Self::DocumentSummary, Language::Spanish) => DOCUMENT_SUMMARY_ES,
            (Self::ConceptExtraction, Language::English) => CONCEPT_EXTRACTION_EN,
            (Self::ConceptExtraction, Language::Spanish) => CONCEPT_EXTRACTION_ES,
            (Self::Definition, Language::English) => DEFINITION_EN,
            (Self::Definition, Language::Spanish) => DEFINITION_ES,
        }
    }
}

/// System prompt for a language
pub fn system_prompt(language: Language) -> &'static str {
    match language {
        Language::English => SYSTEM_EN,
        Language::Spanish => SYSTEM_ES,
    }
}

/// Placeholder text used when there is no accumulated context
pub fn empty_context(language: Language) -> &'static str {
    match language {
        Language::English => "(none, this is the first section)",
        Language::Spanish => "(ninguno, esta es la primera sección)",
    }
}

/// Render a template
///
/// Every `{name}` placeholder must have a matching variable; unknown
/// variables are ignored. Braces that do not enclose an identifier are kept
/// as literal text.
///
/// # Examples
///
/// ```
/// use scriptor_llm::{format_prompt, PromptTemplate};
/// use scriptor_domain::Language;
///
/// let prompt = format_prompt(
///     PromptTemplate::Definition,
///     &[("concept", "Resonance"), ("context", "Physics: waves.")],
///     Language::English,
/// ).unwrap();
/// assert!(prompt.contains("\"Resonance\""));
/// ```
pub fn format_prompt(
    template: PromptTemplate,
    vars: &[(&str, &str)],
    language: Language,
) -> Result<String, LlmError> {
    render(template.text(language), vars)
}

fn render(text: &str, vars: &[(&str, &str)]) -> Result<String, LlmError> {
    let mut out = String::with_capacity(text.len() + vars.iter().map(|(_, v)| v.len()).sum::<usize>());
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let placeholder = after
            .find('}')
            .map(|close| &after[..close])
            .filter(|name| !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));

        match placeholder {
            Some(name) => {
                let value = vars
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| *value)
                    .ok_or_else(|| LlmError::Template(format!("Missing template variable '{}'", name)))?;
                out.push_str(value);
                rest = &after[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

const SYSTEM_EN: &str = "You are a careful reader who writes faithful, self-contained summaries of documents. Never invent facts that are not in the text.";

const SYSTEM_ES: &str = "Eres un lector cuidadoso que escribe resúmenes fieles y autónomos de documentos. Nunca inventes hechos que no estén en el texto.";

const SECTION_SUMMARY_EN: &str = r#"You are reading a document progressively, one section at a time.

Context from previous sections:
{context}

Current section: "{title}"
{content}

Write a summary of the current section of about {target_words} words (between {min_words} and {max_words} words). Keep continuity with the context, but do not repeat it.

Respond in exactly this format:
Summary: <summary of the current section>
Key Concepts: [concept one, concept two, concept three]"#;

const SECTION_SUMMARY_ES: &str = r#"Estás leyendo un documento de forma progresiva, sección por sección.

Contexto de las secciones anteriores:
{context}

Sección actual: "{title}"
{content}

Escribe un resumen de la sección actual de unas {target_words} palabras (entre {min_words} y {max_words} palabras). Mantén la continuidad con el contexto, pero no lo repitas.

Responde exactamente con este formato:
Resumen: <resumen de la sección actual>
Conceptos Clave: [concepto uno, concepto dos, concepto tres]"#;

const CONTAINER_SUMMARY_EN: &str = r#"Synthesize a summary of the section "{title}" from its own content and the summaries of its subsections.

{content}

Write an integrated summary of about {target_words} words (between {min_words} and {max_words} words) that explains how the subsections relate to each other.

Respond in exactly this format:
Summary: <integrated summary>
Key Concepts: [concept one, concept two]"#;

const CONTAINER_SUMMARY_ES: &str = r#"Sintetiza un resumen de la sección "{title}" a partir de su propio contenido y de los resúmenes de sus subsecciones.

{content}

Escribe un resumen integrado de unas {target_words} palabras (entre {min_words} y {max_words} palabras) que explique cómo se relacionan las subsecciones.

Responde exactamente con este formato:
Resumen: <resumen integrado>
Conceptos Clave: [concepto uno, concepto dos]"#;

const DOCUMENT_SUMMARY_EN: &str = r#"Write an overall summary of the document "{title}" from the summaries of its main sections.

{content}

The summary should be about {target_words} words (between {min_words} and {max_words} words) and capture the document's purpose, main arguments and conclusions.

Respond in exactly this format:
Summary: <document summary>
Key Concepts: [concept one, concept two]"#;

const DOCUMENT_SUMMARY_ES: &str = r#"Escribe un resumen general del documento "{title}" a partir de los resúmenes de sus secciones principales.

{content}

El resumen debe tener unas {target_words} palabras (entre {min_words} y {max_words} palabras) y recoger el propósito, los argumentos principales y las conclusiones del documento.

Responde exactamente con este formato:
Resumen: <resumen del documento>
Conceptos Clave: [concepto uno, concepto dos]"#;

const CONCEPT_EXTRACTION_EN: &str = r#"List the 3 to 5 most important concepts discussed in the section "{title}".

{content}

Prefer specific, multi-word technical terms over generic words.
Return ONLY a JSON array of short concept names, for example: ["first concept", "second concept"]"#;

const CONCEPT_EXTRACTION_ES: &str = r#"Enumera los 3 a 5 conceptos más importantes tratados en la sección "{title}".

{content}

Prefiere términos técnicos específicos de varias palabras en lugar de palabras genéricas.
Devuelve SOLO un arreglo JSON de nombres de conceptos breves, por ejemplo: ["primer concepto", "segundo concepto"]"#;

const DEFINITION_EN: &str = r#"Define the concept "{concept}" in one or two sentences, as it is used in the following document sections.

{context}

Return only the definition, without introductions or commentary."#;

const DEFINITION_ES: &str = r#"Define el concepto "{concept}" en una o dos oraciones, tal como se usa en las siguientes secciones del documento.

{context}

Devuelve solo la definición, sin introducciones ni comentarios."#;
