//! Function-name extraction
//!
//! Finds the callable entry point in a code blob so the harness knows what to
//! invoke. Patterns live on each [`LanguageHandler`](super::languages::LanguageHandler).

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::Language;

static PATTERNS: LazyLock<HashMap<Language, Regex>> = LazyLock::new(|| {
    Language::ALL
        .into_iter()
        .map(|language| {
            let pattern = language.handler().function_pattern;
            let regex = Regex::new(pattern).expect("valid function pattern");
            (language, regex)
        })
        .collect()
});

/// Extract the primary function name from `code`.
///
/// Python and JS/TS return the first definition. Go and Rust skip `main`
/// unless it is the only function in the snippet.
pub fn extract_function_name(code: &str, language: Language) -> Option<String> {
    let regex = PATTERNS.get(&language)?;

    let mut names = regex.captures_iter(code).filter_map(|captures| {
        captures
            .iter()
            .skip(1)
            .flatten()
            .next()
            .map(|m| m.as_str())
    });

    if !language.handler().skips_main {
        return names.next().map(str::to_string);
    }

    let mut fallback = None;
    for name in names {
        if name != "main" {
            return Some(name.to_string());
        }
        fallback.get_or_insert(name);
    }
    fallback.map(str::to_string)
}
