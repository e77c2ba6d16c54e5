//! Supported benchmark languages

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{constants::languages, error::AppError};

/// Closed set of languages the engine can benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[serde(alias = "py")]
    Python,
    #[serde(alias = "js")]
    JavaScript,
    #[serde(alias = "ts")]
    TypeScript,
    #[serde(alias = "golang")]
    Go,
    #[serde(alias = "rs")]
    Rust,
}

impl Language {
    /// Every supported language, in display order
    pub const ALL: [Language; 5] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Go,
        Language::Rust,
    ];

    /// Canonical identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => languages::PYTHON,
            Self::JavaScript => languages::JAVASCRIPT,
            Self::TypeScript => languages::TYPESCRIPT,
            Self::Go => languages::GO,
            Self::Rust => languages::RUST,
        }
    }

    /// Alternative spellings accepted on input
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Python => &["py"],
            Self::JavaScript => &["js"],
            Self::TypeScript => &["ts"],
            Self::Go => &["golang"],
            Self::Rust => &["rs"],
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|language| {
                language.as_str() == wanted || language.aliases().contains(&wanted.as_str())
            })
            .ok_or_else(|| AppError::UnsupportedLanguage(s.to_string()))
    }
}
