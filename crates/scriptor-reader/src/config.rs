//! Configuration for the reading pipeline

use crate::error::ReaderError;
use scriptor_domain::traits::WordEnvelope;
use scriptor_domain::Language;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the reading pipeline
///
/// An immutable value passed by reference into every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingConfig {
    /// Preferred summary length (words)
    pub target_words: usize,

    /// Minimum summary length (words)
    pub min_words: usize,

    /// Maximum summary length (words)
    pub max_words: usize,

    /// Model context window (characters); accumulated context gets half
    pub context_window: usize,

    /// Key concepts kept per section
    pub max_concepts_per_section: usize,

    /// Concepts a container inherits from its children
    pub container_child_concepts: usize,

    /// Concepts a container takes from its own synthesis
    pub container_new_concepts: usize,

    /// Glossary size cap
    pub glossary_max_concepts: usize,

    /// Documents with at most this many concepts keep all of them, even
    /// beyond `glossary_max_concepts`
    pub glossary_min_concepts: usize,

    /// Sections used as context for one definition
    pub definition_context_sections: usize,

    /// Relevant sections kept per glossary entry
    pub max_relevant_sections: usize,

    /// Characters sampled for language detection
    pub language_sample_chars: usize,

    /// Sections sampled for language detection
    pub language_sample_sections: usize,

    /// Skip detection and use this language
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

impl ReadingConfig {
    /// Length instructions for summary prompts
    pub fn words(&self) -> WordEnvelope {
        WordEnvelope {
            target: self.target_words,
            min: self.min_words,
            max: self.max_words,
        }
    }

    /// Character budget for accumulated context
    pub fn context_budget(&self) -> usize {
        self.context_window / 2
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ReaderError> {
        if self.min_words == 0 {
            return Err(ReaderError::Config("min_words must be greater than 0".to_string()));
        }
        if !(self.min_words <= self.target_words && self.target_words <= self.max_words) {
            return Err(ReaderError::Config(
                "word counts must satisfy min_words <= target_words <= max_words".to_string(),
            ));
        }
        if self.context_window < 2 {
            return Err(ReaderError::Config("context_window must be at least 2".to_string()));
        }
        if self.max_concepts_per_section == 0 {
            return Err(ReaderError::Config(
                "max_concepts_per_section must be greater than 0".to_string(),
            ));
        }
        if self.glossary_max_concepts == 0 {
            return Err(ReaderError::Config(
                "glossary_max_concepts must be greater than 0".to_string(),
            ));
        }
        if self.max_relevant_sections == 0 {
            return Err(ReaderError::Config(
                "max_relevant_sections must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ReadingConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            target_words: 250,
            min_words: 150,
            max_words: 400,
            context_window: 8_000,
            max_concepts_per_section: 5,
            container_child_concepts: 3,
            container_new_concepts: 2,
            glossary_max_concepts: 50,
            glossary_min_concepts: 10,
            definition_context_sections: 3,
            max_relevant_sections: 5,
            language_sample_chars: 1_000,
            language_sample_sections: 3,
            language: None,
        }
    }
}

impl ReadingConfig {
    /// Concise preset: short summaries, small glossary
    pub fn concise() -> Self {
        Self {
            target_words: 120,
            min_words: 80,
            max_words: 200,
            glossary_max_concepts: 25,
            glossary_min_concepts: 5,
            ..Self::default()
        }
    }

    /// Detailed preset: long summaries, larger context and glossary
    pub fn detailed() -> Self {
        Self {
            target_words: 400,
            min_words: 250,
            max_words: 600,
            context_window: 16_000,
            glossary_max_concepts: 100,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ReaderError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| ReaderError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ReaderError> {
        toml::to_string_pretty(self)
            .map_err(|e| ReaderError::Config(format!("Failed to serialize to TOML: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReaderError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Apply `SCRIPTOR_*` environment overrides
    ///
    /// Recognized: `SCRIPTOR_TARGET_WORDS`, `SCRIPTOR_MIN_WORDS`,
    /// `SCRIPTOR_MAX_WORDS`, `SCRIPTOR_CONTEXT_WINDOW`,
    /// `SCRIPTOR_GLOSSARY_MAX`, `SCRIPTOR_GLOSSARY_MIN`, `SCRIPTOR_LANGUAGE`.
    pub fn with_env_overrides(self) -> Result<Self, ReaderError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ReaderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let numeric: [(&str, &mut usize); 6] = [
            ("SCRIPTOR_TARGET_WORDS", &mut self.target_words),
            ("SCRIPTOR_MIN_WORDS", &mut self.min_words),
            ("SCRIPTOR_MAX_WORDS", &mut self.max_words),
            ("SCRIPTOR_CONTEXT_WINDOW", &mut self.context_window),
            ("SCRIPTOR_GLOSSARY_MAX", &mut self.glossary_max_concepts),
            ("SCRIPTOR_GLOSSARY_MIN", &mut self.glossary_min_concepts),
        ];
        for (key, field) in numeric {
            if let Some(value) = lookup(key) {
                *field = value.trim().parse().map_err(|_| {
                    ReaderError::Config(format!("{} must be a number, got '{}'", key, value))
                })?;
            }
        }
        if let Some(language) = lookup("SCRIPTOR_LANGUAGE") {
            self.language = Some(language.parse().map_err(ReaderError::Config)?);
        }

        self.validate()?;
        Ok(self)
    }
}
