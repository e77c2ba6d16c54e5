//! Language-specific handlers for harness generation and execution
//!
//! Every supported [`Language`] resolves to exactly one static
//! [`LanguageHandler`] through [`Language::handler`]. The handler carries all
//! per-language data: how the entry point is found, how the harness is
//! rendered and how the toolchain is invoked.

pub mod go;
pub mod javascript;
pub mod python;
pub mod rust;

use std::fmt;

use crate::models::Language;

use super::harness::HarnessRequest;

/// How a toolchain turns a source file into a running benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    /// `<program> <args..> <source>` runs the harness directly
    Interpret { args: &'static [&'static str] },
    /// `<program> <args..> -o <binary> <source>`, then `<binary>`
    Compile { args: &'static [&'static str] },
}

/// Language handler for harness generation and execution
pub struct LanguageHandler {
    pub language: Language,
    pub display_name: &'static str,
    pub source_extension: &'static str,
    pub execution: Execution,
    /// Arguments that make the toolchain print its version
    pub version_args: &'static [&'static str],
    /// Regex whose first non-empty capture group is a function name
    pub function_pattern: &'static str,
    /// Whether `main` is only used when it is the sole function
    pub skips_main: bool,
    /// How the harness measures memory
    pub memory_probe: &'static str,
    /// Toolchain-specific variables naming a temp directory, besides `TMPDIR`
    pub temp_dir_vars: &'static [&'static str],
    render: fn(&HarnessRequest<'_>) -> String,
}

impl fmt::Debug for LanguageHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageHandler")
            .field("language", &self.language)
            .field("source_extension", &self.source_extension)
            .field("execution", &self.execution)
            .finish_non_exhaustive()
    }
}

impl LanguageHandler {
    /// Render the complete harness program for a request
    pub fn render(&self, request: &HarnessRequest<'_>) -> String {
        (self.render)(request)
    }

    /// Get the harness source file name
    pub fn source_file(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.source_extension)
    }

    /// Check if the toolchain produces a binary that is run separately
    pub fn requires_compilation(&self) -> bool {
        matches!(self.execution, Execution::Compile { .. })
    }
}

impl Language {
    /// Get the handler for this language
    pub fn handler(self) -> &'static LanguageHandler {
        match self {
            Language::Python => &python::HANDLER,
            Language::JavaScript => &javascript::HANDLER,
            Language::TypeScript => &javascript::TYPESCRIPT_HANDLER,
            Language::Go => &go::HANDLER,
            Language::Rust => &rust::HANDLER,
        }
    }
}

/// Substitute `{name}` placeholders in a harness template.
///
/// User code is substituted last so that placeholder-looking text inside it
/// is never expanded.
pub(crate) fn fill_template(template: &str, values: &[(&str, &str)], code: &str) -> String {
    let mut rendered = template.to_string();
    for (name, value) in values {
        rendered = rendered.replace(&format!("{{{name}}}"), value);
    }
    rendered.replacen("{code}", code, 1)
}
