//! Integration tests for the reading pipeline

#[cfg(test)]
mod tests {
    use crate::{
        fallback, render_json, render_text, ConceptAggregator, DocumentPipeline, MarkdownParser,
        ReadingConfig,
    };
    use async_trait::async_trait;
    use scriptor_domain::traits::{SummaryKind, SummaryModel, SummaryRequest};
    use scriptor_domain::{DocumentKnowledge, Language, SectionId};
    use scriptor_llm::{MockProvider, PromptedModel};
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// One recorded summary request
    #[derive(Debug, Clone)]
    struct Call {
        kind: SummaryKind,
        title: String,
        content: String,
        context: String,
    }

    /// Model that echoes the first 20 characters of its input
    struct ScriptedModel {
        failing: HashSet<String>,
        extracted: HashMap<String, Vec<String>>,
        inline: Vec<String>,
        container_inline: Vec<String>,
        calls: Mutex<Vec<Call>>,
    }

    impl ScriptedModel {
        fn new() -> Self {
            Self {
                failing: HashSet::new(),
                extracted: HashMap::new(),
                inline: vec!["x".to_string()],
                container_inline: vec!["x".to_string()],
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(mut self, title: &str) -> Self {
            self.failing.insert(title.to_string());
            self
        }

        fn extracting(mut self, title: &str, concepts: &[&str]) -> Self {
            self.extracted
                .insert(title.to_string(), concepts.iter().map(|c| c.to_string()).collect());
            self
        }

        fn inline(mut self, concepts: &[&str]) -> Self {
            self.inline = concepts.iter().map(|c| c.to_string()).collect();
            self
        }

        fn container_inline(mut self, concepts: &[&str]) -> Self {
            self.container_inline = concepts.iter().map(|c| c.to_string()).collect();
            self
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn call_for(&self, title: &str) -> Call {
            self.calls()
                .into_iter()
                .find(|c| c.title == title)
                .unwrap_or_else(|| panic!("no call for {}", title))
        }
    }

    #[async_trait]
    impl SummaryModel for ScriptedModel {
        type Error = String;

        async fn generate_summary(&self, request: &SummaryRequest<'_>) -> Result<String, String> {
            self.calls.lock().unwrap().push(Call {
                kind: request.kind,
                title: request.title.to_string(),
                content: request.content.to_string(),
                context: request.context.to_string(),
            });
            if self.failing.contains(request.title) {
                return Err(format!("scripted failure for {}", request.title));
            }

            let head: String = request.content.chars().take(20).collect();
            let concepts = match request.kind {
                SummaryKind::Section => self.inline.join(", "),
                SummaryKind::Container => self.container_inline.join(", "),
                SummaryKind::Document => String::new(),
            };
            Ok(format!("Summary: {}\nKey Concepts: [{}]", head, concepts))
        }

        async fn extract_concepts(
            &self,
            title: &str,
            _content: &str,
            _language: Language,
        ) -> Result<Vec<String>, String> {
            Ok(self.extracted.get(title).cloned().unwrap_or_default())
        }

        async fn generate_definition(
            &self,
            concept: &str,
            _context: &str,
            _language: Language,
        ) -> Result<String, String> {
            Ok(format!("Definition: {} as used in the document", concept))
        }
    }

    fn assert_consistent(knowledge: &DocumentKnowledge) {
        let flattened: usize = knowledge.hierarchy_index.values().map(Vec::len).sum();
        assert_eq!(flattened, knowledge.section_summaries.len());
        assert_eq!(knowledge.total_sections, knowledge.section_summaries.len());
        for summary in knowledge.section_summaries.values() {
            if let Some(parent) = &summary.parent_id {
                assert!(knowledge.section_summaries.contains_key(parent));
            }
            for child in &summary.child_ids {
                assert!(knowledge.section_summaries.contains_key(child));
            }
        }
        for children in knowledge.parent_child_map.values() {
            for child in children {
                assert!(knowledge.section_summaries.contains_key(child));
            }
        }
    }

    fn titles(knowledge: &DocumentKnowledge) -> Vec<String> {
        knowledge
            .summaries_in_order()
            .into_iter()
            .map(|s| s.title.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_two_leaf_document() {
        init_tracing();
        let pipeline = DocumentPipeline::new(ScriptedModel::new(), ReadingConfig::default());

        let knowledge = pipeline
            .process_markdown("# Doc\n\n## A\n\nContent A\n\n## B\n\nContent B")
            .await
            .unwrap();

        assert_eq!(knowledge.title, "Doc");
        assert_eq!(titles(&knowledge), vec!["A", "B"]);
        assert_eq!(knowledge.section_summaries[&SectionId::from("section-0")].summary, "Content A");

        let document_call = pipeline
            .model()
            .calls()
            .into_iter()
            .find(|c| c.kind == SummaryKind::Document)
            .unwrap();
        assert!(document_call.content.contains("A: Content A"));
        assert!(document_call.content.contains("B: Content B"));
        assert!(knowledge.document_summary.starts_with("A: Content A"));

        assert_eq!(knowledge.total_concepts, 1);
        assert_eq!(knowledge.concepts[0].name, "x");
        assert_eq!(knowledge.concepts[0].first_mentioned_in, SectionId::from("section-0"));
        assert_consistent(&knowledge);
    }

    #[tokio::test]
    async fn test_glossary_prefers_cross_section_concepts() {
        init_tracing();
        let model = ScriptedModel::new()
            .inline(&[])
            .extracting("One", &["Resonance", "observer"])
            .extracting("Two", &["resonance"])
            .extracting("Three", &["RESONANCE"]);
        let config = ReadingConfig {
            glossary_max_concepts: 1,
            glossary_min_concepts: 0,
            ..ReadingConfig::default()
        };
        let pipeline = DocumentPipeline::new(model, config);

        let knowledge = pipeline
            .process_markdown("# Doc\n## One\ntext\n## Two\ntext\n## Three\ntext")
            .await
            .unwrap();

        assert_eq!(knowledge.concepts.len(), 1);
        let resonance = &knowledge.concepts[0];
        assert_eq!(resonance.name, "Resonance");
        assert_eq!(resonance.concept_id, "resonance");
        assert_eq!(resonance.relevant_sections.len(), 3);
        assert_eq!(resonance.definition, "Resonance as used in the document.");
    }

    #[tokio::test]
    async fn test_container_concepts_from_children_and_synthesis() {
        init_tracing();
        let model = ScriptedModel::new()
            .inline(&[])
            .extracting("Empathy", &["mirror neurons", "empathy"])
            .extracting("Biology", &["homeostasis", "Empathy", "interoception"])
            .container_inline(&["embodiment", "Homeostasis", "somatic markers", "feeling"]);
        let pipeline = DocumentPipeline::new(model, ReadingConfig::default());

        let knowledge = pipeline
            .process_markdown(
                "# Book\n## Somatic Framework\nHow body and mind meet.\n### Empathy\nFeeling with others.\n### Biology\nThe body keeps score.",
            )
            .await
            .unwrap();

        let container = knowledge
            .section_summaries
            .values()
            .find(|s| s.title == "Somatic Framework")
            .unwrap();
        assert_eq!(
            container.key_concepts,
            vec!["mirror neurons", "empathy", "homeostasis", "embodiment", "somatic markers"]
        );
        assert!(container.key_concepts.len() <= 5);
        assert_eq!(container.child_ids.len(), 2);

        let call = pipeline.model().call_for("Somatic Framework");
        assert_eq!(call.kind, SummaryKind::Container);
        assert!(call.context.is_empty());
        assert!(call.content.starts_with("Section content:\nHow body and mind meet."));
        assert!(call.content.contains("Subsection summaries:\nEmpathy: Feeling with others."));
        assert_consistent(&knowledge);
    }

    #[tokio::test]
    async fn test_failed_leaf_adds_nothing_to_context() {
        init_tracing();
        let model = ScriptedModel::new().failing("B");
        let pipeline = DocumentPipeline::new(model, ReadingConfig::default());

        let knowledge = pipeline
            .process_markdown("# Doc\n## A\nalpha text\n## B\nbeta text\n## C\ngamma text")
            .await
            .unwrap();

        assert_eq!(titles(&knowledge), vec!["A", "C"]);
        let model = pipeline.model();
        assert_eq!(model.call_for("A").context, "");
        assert_eq!(model.call_for("B").context, "A: alpha text");
        assert_eq!(model.call_for("C").context, "A: alpha text");
        assert_consistent(&knowledge);
    }

    #[tokio::test]
    async fn test_context_carries_previous_section() {
        let pipeline = DocumentPipeline::new(ScriptedModel::new(), ReadingConfig::default());
        pipeline
            .process_markdown("# Doc\n## A\none\n## B\ntwo\n## C\nthree")
            .await
            .unwrap();

        let model = pipeline.model();
        assert_eq!(model.call_for("B").context, "A: one");
        assert_eq!(model.call_for("C").context, "A: one\n\nB: two");
    }

    #[tokio::test]
    async fn test_container_with_failed_children_is_omitted() {
        init_tracing();
        let model = ScriptedModel::new().failing("Left").failing("Right");
        let pipeline = DocumentPipeline::new(model, ReadingConfig::default());

        let knowledge = pipeline
            .process_markdown("# Doc\n## Part\n### Left\nl\n### Right\nr\n## Other\no")
            .await
            .unwrap();

        assert_eq!(titles(&knowledge), vec!["Other"]);
        assert!(pipeline
            .model()
            .calls()
            .iter()
            .all(|c| c.title != "Part"));
        assert_consistent(&knowledge);
    }

    #[tokio::test]
    async fn test_failed_top_level_container_uses_fallback() {
        init_tracing();
        let model = ScriptedModel::new().failing("Part");
        let pipeline = DocumentPipeline::new(model, ReadingConfig::default());

        let knowledge = pipeline
            .process_markdown("# Doc\n## Part\n### Left\nl\n### Right\nr")
            .await
            .unwrap();

        assert_eq!(titles(&knowledge), vec!["Left", "Right"]);
        assert_eq!(
            knowledge.document_summary,
            fallback::no_summaries("Doc", 3, Language::English)
        );
        assert!(pipeline
            .model()
            .calls()
            .iter()
            .all(|c| c.kind != SummaryKind::Document));
        assert_consistent(&knowledge);
    }

    #[tokio::test]
    async fn test_zero_sections() {
        let pipeline = DocumentPipeline::new(ScriptedModel::new(), ReadingConfig::default());
        let knowledge = pipeline.process_markdown("   \n").await.unwrap();

        assert_eq!(knowledge.total_sections, 0);
        assert_eq!(knowledge.total_concepts, 0);
        assert!(!knowledge.document_summary.is_empty());
        assert!(pipeline.model().calls().is_empty());
    }

    #[tokio::test]
    async fn test_every_summary_fails() {
        let model = ScriptedModel::new().failing("A").failing("B");
        let pipeline = DocumentPipeline::new(model, ReadingConfig::default());

        let knowledge = pipeline
            .process_markdown("# Doc\n## A\na\n## B\nb")
            .await
            .unwrap();

        assert!(knowledge.section_summaries.is_empty());
        assert!(knowledge.concepts.is_empty());
        assert!(knowledge.document_summary.contains("Doc"));
        assert_consistent(&knowledge);
    }

    #[tokio::test]
    async fn test_full_stack_with_mock_provider() {
        init_tracing();
        let mut provider = MockProvider::new("Summary: A short summary.\nKey Concepts: [Somatic markers]");
        provider.add_response("most important concepts", r#"["somatic_markers", "Empathy"]"#);
        provider.add_response("Define the concept", "Based on the context, a bodily signal.");
        provider.add_response("overall summary of the document", "Summary: The whole book.");
        let pipeline = DocumentPipeline::new(PromptedModel::new(provider), ReadingConfig::default());

        let knowledge = pipeline
            .process_markdown("# Book\n## Feelings\nAbout feelings.\n## Bodies\nAbout bodies.")
            .await
            .unwrap();

        assert_eq!(knowledge.document_summary, "The whole book.");
        let names: Vec<_> = knowledge.concepts.iter().map(|c| c.concept_id.as_str()).collect();
        assert_eq!(names, vec!["somatic markers", "empathy"]);
        assert!(knowledge
            .concepts
            .iter()
            .all(|c| c.definition == "A bodily signal."));

        let json = render_json(&knowledge).unwrap();
        assert!(json.contains("\"document_summary\": \"The whole book.\""));
        let text = render_text(&knowledge);
        assert!(text.contains("- Feelings"));
        assert!(text.contains("somatic_markers: A bodily signal."));
        assert_consistent(&knowledge);
    }

    #[tokio::test]
    async fn test_spanish_document() {
        let provider = MockProvider::new("Resumen: Un resumen.\nConceptos Clave: [empatía]");
        let pipeline = DocumentPipeline::new(PromptedModel::new(provider), ReadingConfig::default());

        let knowledge = pipeline
            .process_markdown("# Libro\n## Sentir\nLa empatía es la capacidad de sentir lo que siente otro.")
            .await
            .unwrap();

        assert_eq!(knowledge.language, Language::Spanish);
        assert_eq!(knowledge.section_summaries[&SectionId::from("section-0")].summary, "Un resumen.");
        assert_eq!(knowledge.concepts[0].name, "empatía");
    }

    #[tokio::test]
    async fn test_merging_two_passes() {
        let config = ReadingConfig::default();
        let source = "# Doc\n## A\nalpha\n## B\nbeta";
        let first_model = ScriptedModel::new().extracting("A", &["Machine Learning"]);
        let second_model = ScriptedModel::new().extracting("B", &["machine-learning", "Data"]);

        let first = DocumentPipeline::new(first_model, config.clone())
            .process_markdown(source)
            .await
            .unwrap();
        let second = DocumentPipeline::new(second_model, config.clone())
            .process_markdown(source)
            .await
            .unwrap();

        let model = ScriptedModel::new();
        let merged = ConceptAggregator::new(&model, &config)
            .merge_definitions(first.concepts, second.concepts);

        let ids: Vec<_> = merged.iter().map(|c| c.concept_id.as_str()).collect();
        assert_eq!(ids, vec!["x", "machine learning", "data"]);
        let ml = &merged[1];
        assert_eq!(ml.name, "Machine Learning");
        assert_eq!(ml.first_mentioned_in, SectionId::from("section-0"));
        assert_eq!(
            ml.relevant_sections,
            vec![SectionId::from("section-0"), SectionId::from("section-1")]
        );
    }

    #[test]
    fn test_parser_output_is_a_valid_tree() {
        let doc = MarkdownParser::parse("# T\nintro\n## A\n### A1\n#### A1a\n## B\n# Second\n## C");
        assert!(scriptor_domain::SectionTree::new(doc.sections).is_ok());
    }
}

#[cfg(test)]
mod proptests {
    use super::tests_support::*;
    use crate::{DocumentPipeline, MarkdownParser, ReadingConfig};
    use proptest::prelude::*;
    use scriptor_domain::SectionId;
    use std::collections::HashSet;

    fn markdown(levels: &[u32]) -> String {
        let mut source = String::from("# Doc\n");
        for (i, level) in levels.iter().enumerate() {
            source.push_str(&format!("{} S{}\nbody {}\n", "#".repeat(*level as usize + 1), i, i));
        }
        source
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Property: whatever fails, the result is self-consistent, failed
        /// units are absent and no prompt sees later sections
        #[test]
        fn test_pipeline_invariants(
            levels in proptest::collection::vec(1u32..4, 1..10),
            failures in proptest::collection::vec(any::<bool>(), 10),
        ) {
            let source = markdown(&levels);
            let failing: HashSet<String> = (0..levels.len())
                .filter(|&i| failures[i])
                .map(|i| format!("S{}", i))
                .collect();

            let model = EchoModel::new(failing.clone());
            let pipeline = DocumentPipeline::new(model, ReadingConfig::default());
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let knowledge = runtime.block_on(pipeline.process_markdown(&source)).unwrap();

            let flattened: usize = knowledge.hierarchy_index.values().map(Vec::len).sum();
            prop_assert_eq!(flattened, knowledge.section_summaries.len());

            for summary in knowledge.section_summaries.values() {
                prop_assert!(!failing.contains(&summary.title));
                for child in &summary.child_ids {
                    prop_assert!(knowledge.section_summaries.contains_key(child));
                }
            }

            // Containers exist only with at least one summarized child
            let parsed = MarkdownParser::parse(&source);
            for section in parsed.sections.iter().filter(|s| !s.children.is_empty()) {
                if knowledge.section_summaries.contains_key(&section.id) {
                    prop_assert!(section
                        .children
                        .iter()
                        .any(|c: &SectionId| knowledge.section_summaries.contains_key(c)));
                }
            }

            // Leaf contexts only hold earlier, successful sections
            for (title, context) in pipeline.model().leaf_contexts() {
                let index: usize = title[1..].parse().unwrap();
                for later in index..levels.len() {
                    let marker = format!("S{}: ", later);
                    prop_assert!(!context.contains(&marker));
                }
                for failed in &failing {
                    let marker = format!("{}: ", failed);
                    prop_assert!(!context.contains(&marker));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests_support {
    use async_trait::async_trait;
    use scriptor_domain::traits::{SummaryKind, SummaryModel, SummaryRequest};
    use scriptor_domain::Language;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Minimal model for property tests: echoes content, fails listed titles
    pub struct EchoModel {
        failing: HashSet<String>,
        leaf_contexts: Mutex<Vec<(String, String)>>,
    }

    impl EchoModel {
        pub fn new(failing: HashSet<String>) -> Self {
            Self {
                failing,
                leaf_contexts: Mutex::new(Vec::new()),
            }
        }

        /// `(title, context)` of every leaf summary request
        pub fn leaf_contexts(&self) -> Vec<(String, String)> {
            self.leaf_contexts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SummaryModel for EchoModel {
        type Error = String;

        async fn generate_summary(&self, request: &SummaryRequest<'_>) -> Result<String, String> {
            if request.kind == SummaryKind::Section {
                self.leaf_contexts
                    .lock()
                    .unwrap()
                    .push((request.title.to_string(), request.context.to_string()));
            }
            if self.failing.contains(request.title) {
                return Err("scripted failure".to_string());
            }
            Ok(format!("Summary: {}", request.content.chars().take(20).collect::<String>()))
        }

        async fn extract_concepts(
            &self,
            title: &str,
            _content: &str,
            _language: Language,
        ) -> Result<Vec<String>, String> {
            Ok(vec![format!("topic {}", title)])
        }

        async fn generate_definition(
            &self,
            concept: &str,
            _context: &str,
            _language: Language,
        ) -> Result<String, String> {
            Ok(format!("About {}", concept))
        }
    }
}
