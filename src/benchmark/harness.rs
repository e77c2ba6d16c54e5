//! Harness generation
//!
//! A harness is a complete program in the benchmarked language that embeds
//! the user code, builds a deterministic input, runs one warm-up call, times
//! `runs` calls, takes one memory-instrumented call and reports everything on
//! stdout with the marker protocol from [`crate::constants::markers`].

use crate::{
    constants::HARNESS_FILE_STEM,
    models::{InputType, Language},
};

/// Everything needed to render one harness
#[derive(Debug, Clone, Copy)]
pub struct HarnessRequest<'a> {
    pub code: &'a str,
    pub function_name: &'a str,
    pub input_size: usize,
    pub input_type: InputType,
    pub runs: u32,
}

/// A rendered harness program, ready to be written to disk
#[derive(Debug, Clone)]
pub struct HarnessScript {
    pub language: Language,
    pub source: String,
}

impl HarnessScript {
    /// File name the harness is written under inside its scratch directory
    pub fn file_name(&self) -> String {
        self.language.handler().source_file(HARNESS_FILE_STEM)
    }
}

/// Generate the harness for one measurement
pub fn generate(language: Language, request: &HarnessRequest<'_>) -> HarnessScript {
    HarnessScript {
        language,
        source: language.handler().render(request),
    }
}
