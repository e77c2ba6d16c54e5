//! Benchmark request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::constants::{MAX_BENCHMARK_RUNS, MAX_INPUT_SIZES_PER_REQUEST, MAX_SOURCE_CODE_BYTES};

/// A code snippet and, optionally, the function to call in it
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SnippetPayload {
    #[validate(length(min = 1, max = MAX_SOURCE_CODE_BYTES))]
    pub code: String,

    /// Extracted from the code when omitted
    pub function_name: Option<String>,
}

/// Compare a baseline against a candidate
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompareBenchmarkRequest {
    /// Language identifier or alias (`py`, `ts`, ...)
    pub language: String,

    #[validate(nested)]
    pub baseline: SnippetPayload,

    #[validate(nested)]
    pub candidate: SnippetPayload,

    /// Defaults to the configured sizes
    #[validate(length(max = MAX_INPUT_SIZES_PER_REQUEST))]
    pub input_sizes: Option<Vec<usize>>,

    /// `array`, `random_array`, `string` or `dict`; anything else is `array`
    pub input_type: Option<String>,

    #[validate(range(min = 1, max = MAX_BENCHMARK_RUNS))]
    pub runs: Option<u32>,
}

/// Measure a single snippet
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RunBenchmarkRequest {
    pub language: String,

    #[validate(length(min = 1, max = MAX_SOURCE_CODE_BYTES))]
    pub code: String,

    pub function_name: Option<String>,

    #[validate(length(max = MAX_INPUT_SIZES_PER_REQUEST))]
    pub input_sizes: Option<Vec<usize>>,

    pub input_type: Option<String>,

    #[validate(range(min = 1, max = MAX_BENCHMARK_RUNS))]
    pub runs: Option<u32>,
}

/// Scalar speedup over the default sizes
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SpeedupRequest {
    pub language: String,

    #[validate(length(min = 1, max = MAX_SOURCE_CODE_BYTES))]
    pub baseline_code: String,

    #[validate(length(min = 1, max = MAX_SOURCE_CODE_BYTES))]
    pub candidate_code: String,
}
