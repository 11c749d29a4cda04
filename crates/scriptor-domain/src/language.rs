//! Document language

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages the prompt templates and response labels support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    /// English (`en`)
    #[default]
    #[serde(rename = "en")]
    English,
    /// Spanish (`es`)
    #[serde(rename = "es")]
    Spanish,
}

impl Language {
    /// Short language tag
    pub fn tag(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "es" | "spanish" | "español" | "espanol" => Ok(Language::Spanish),
            other => Err(format!("Unsupported language: {}", other)),
        }
    }
}
