//! Prompt-driven implementation of the reading pipeline's model interface

use crate::prompts::{empty_context, format_prompt, system_prompt, PromptTemplate};
use crate::LlmError;
use async_trait::async_trait;
use scriptor_domain::text::{dedup_concepts, split_concept_list};
use scriptor_domain::traits::{LlmProvider, SummaryKind, SummaryModel, SummaryRequest};
use scriptor_domain::Language;
use tracing::debug;

/// Upper bound on concepts returned by one extraction call
const MAX_EXTRACTED_CONCEPTS: usize = 10;

/// [`SummaryModel`] built from prompt templates over any [`LlmProvider`]
///
/// # Examples
///
/// ```
/// use scriptor_llm::{MockProvider, PromptedModel};
///
/// let model = PromptedModel::new(MockProvider::new("Summary: short"));
/// assert_eq!(model.provider().call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct PromptedModel<P> {
    provider: P,
}

impl<P> PromptedModel<P>
where
    P: LlmProvider<Error = LlmError>,
{
    /// Wrap a provider
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The wrapped provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    async fn call(&self, prompt: &str, language: Language) -> Result<String, LlmError> {
        debug!(provider = self.provider.name(), prompt_len = prompt.len(), "Sending prompt");
        let response = self
            .provider
            .generate(prompt, Some(system_prompt(language)))
            .await?;
        debug!(response_len = response.len(), "Received response");

        if response.trim().is_empty() {
            return Err(LlmError::InvalidResponse("Empty response".to_string()));
        }
        Ok(response)
    }
}

#[async_trait]
impl<P> SummaryModel for PromptedModel<P>
where
    P: LlmProvider<Error = LlmError>,
{
    type Error = LlmError;

    async fn generate_summary(&self, request: &SummaryRequest<'_>) -> Result<String, Self::Error> {
        let template = match request.kind {
            SummaryKind::Section => PromptTemplate::SectionSummary,
            SummaryKind::Container => PromptTemplate::ContainerSummary,
            SummaryKind::Document => PromptTemplate::DocumentSummary,
        };
        let context = if request.context.trim().is_empty() {
            empty_context(request.language)
        } else {
            request.context
        };
        let target = request.words.target.to_string();
        let min = request.words.min.to_string();
        let max = request.words.max.to_string();

        let prompt = format_prompt(
            template,
            &[
                ("title", request.title),
                ("content", request.content),
                ("context", context),
                ("target_words", target.as_str()),
                ("min_words", min.as_str()),
                ("max_words", max.as_str()),
            ],
            request.language,
        )?;

        self.call(&prompt, request.language).await
    }

    async fn extract_concepts(
        &self,
        title: &str,
        content: &str,
        language: Language,
    ) -> Result<Vec<String>, Self::Error> {
        let prompt = format_prompt(
            PromptTemplate::ConceptExtraction,
            &[("title", title), ("content", content)],
            language,
        )?;
        let response = self.call(&prompt, language).await?;
        Ok(parse_concept_response(&response))
    }

    async fn generate_definition(
        &self,
        concept: &str,
        context: &str,
        language: Language,
    ) -> Result<String, Self::Error> {
        let prompt = format_prompt(
            PromptTemplate::Definition,
            &[("concept", concept), ("context", context)],
            language,
        )?;
        self.call(&prompt, language).await
    }

    async fn health_check(&self) -> Result<(), Self::Error> {
        self.provider.health_check().await
    }
}

/// Parse a concept-extraction response
///
/// Prefers a JSON array of strings (optionally inside a code fence or
/// surrounded by prose). A `Key Concepts:` line is used when the model
/// answered in the summary format; otherwise falls back to list splitting.
pub fn parse_concept_response(response: &str) -> Vec<String> {
    let body = strip_code_fence(response);
    let body = labeled_concept_line(body).unwrap_or(body);

    let from_json = match (body.find('['), body.rfind(']')) {
        (Some(start), Some(end)) if start < end => {
            serde_json::from_str::<Vec<String>>(&body[start..=end]).ok()
        }
        _ => None,
    };

    let names = from_json.unwrap_or_else(|| split_concept_list(body));
    dedup_concepts(names, MAX_EXTRACTED_CONCEPTS)
}

/// The remainder of a `Key Concepts:` / `Conceptos Clave:` line
fn labeled_concept_line(body: &str) -> Option<&str> {
    body.lines().find_map(|line| {
        let trimmed = line.trim().trim_start_matches(['*', '#']).trim_start();
        let (label, rest) = trimmed.split_once(':')?;
        let label = label.trim_end_matches('*').trim().to_lowercase();
        (label == "key concepts" || label == "conceptos clave")
            .then(|| rest.trim_start_matches('*').trim())
    })
}

/// Remove a surrounding Markdown code fence, if any
fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    // Skip the opening fence line (```json or ```)
    let without_open = trimmed
        .find('\n')
        .map(|newline| &trimmed[newline + 1..])
        .unwrap_or("");
    without_open
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}
