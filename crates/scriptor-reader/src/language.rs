//! Stop-word language detection

use scriptor_domain::traits::LanguageDetector;
use scriptor_domain::Language;

const ENGLISH_STOPWORDS: &[&str] = &[
    "the", "and", "of", "to", "is", "in", "that", "it", "with", "for", "as", "was", "on", "are",
    "this", "be", "by", "from", "which", "or", "have", "an", "not", "but", "they", "their",
];

const SPANISH_STOPWORDS: &[&str] = &[
    "el", "la", "de", "que", "y", "en", "los", "las", "del", "se", "por", "un", "una", "con",
    "para", "es", "al", "lo", "como", "más", "pero", "sus", "su", "este", "esta", "son",
];

/// Characters that only show up in Spanish text
const SPANISH_MARKS: &[char] = &['ñ', 'á', 'é', 'í', 'ó', 'ú', '¿', '¡'];

/// Detects English or Spanish by counting stop words
///
/// Each Spanish-only character adds one point for Spanish. Ties and empty
/// samples resolve to English.
///
/// # Examples
///
/// ```
/// use scriptor_domain::traits::LanguageDetector;
/// use scriptor_domain::Language;
/// use scriptor_reader::StopwordDetector;
///
/// let detector = StopwordDetector;
/// assert_eq!(detector.detect("El cuerpo y la mente son parte del sistema"), Language::Spanish);
/// assert_eq!(detector.detect("The body and the mind are part of the system"), Language::English);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StopwordDetector;

impl LanguageDetector for StopwordDetector {
    fn detect(&self, sample: &str) -> Language {
        let lowered = sample.to_lowercase();
        let mut english = 0usize;
        let mut spanish = 0usize;

        for word in lowered.split(|c: char| !c.is_alphanumeric()) {
            if word.is_empty() {
                continue;
            }
            if ENGLISH_STOPWORDS.contains(&word) {
                english += 1;
            }
            if SPANISH_STOPWORDS.contains(&word) {
                spanish += 1;
            }
        }
        spanish += lowered.chars().filter(|c| SPANISH_MARKS.contains(c)).count();

        if spanish > english {
            Language::Spanish
        } else {
            Language::English
        }
    }
}
