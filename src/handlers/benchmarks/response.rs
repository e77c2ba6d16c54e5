//! Benchmark response DTOs

use serde::Serialize;

use crate::{
    benchmark::ToolchainStatus,
    models::{BenchmarkResult, EnvironmentInfo, InputType, Language},
};

/// Supported languages and their toolchains on this host
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagesResponse {
    pub languages: Vec<ToolchainStatus>,
}

/// Results of measuring one snippet
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunBenchmarkResponse {
    pub language: Language,
    pub function_name: String,
    pub input_type: InputType,
    pub results: Vec<BenchmarkResult>,
    /// True when every size was measured
    pub success: bool,
    pub environment: EnvironmentInfo,
}

/// Average speedup, `null` when no size could be compared
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedupResponse {
    pub speedup: Option<f64>,
}
