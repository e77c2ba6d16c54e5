//! Benchmark service - Turns API requests into engine runs

use std::str::FromStr;
use std::sync::Arc;

use crate::{
    benchmark::{
        toolchain, BenchmarkExecutor, BenchmarkRunner, ComparisonRequest, ProcessExecutor,
        Snippet, SnippetRequest, ToolchainStatus,
    },
    config::BenchmarkConfig,
    error::{AppError, AppResult},
    handlers::benchmarks::{
        request::{CompareBenchmarkRequest, RunBenchmarkRequest, SnippetPayload, SpeedupRequest},
        response::{RunBenchmarkResponse, SpeedupResponse},
    },
    models::{ComparisonReport, ComparisonSide, EnvironmentInfo, InputType, Language},
    utils::validation::{validate_function_name, validate_input_sizes, validate_source_code},
};

/// Benchmark service for executing and comparing code
pub struct BenchmarkService {
    config: BenchmarkConfig,
    runner: BenchmarkRunner<Arc<dyn BenchmarkExecutor>>,
}

impl BenchmarkService {
    /// Service backed by the host's toolchains
    pub fn new(config: BenchmarkConfig) -> Self {
        let executor = Arc::new(ProcessExecutor::new(config.clone()));
        Self::with_executor(config, executor)
    }

    /// Service backed by a custom executor
    pub fn with_executor(config: BenchmarkConfig, executor: Arc<dyn BenchmarkExecutor>) -> Self {
        let runner = BenchmarkRunner::new(executor, &config);
        Self { config, runner }
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Probe every language's toolchain
    pub async fn languages(&self) -> Vec<ToolchainStatus> {
        let mut statuses = Vec::with_capacity(Language::ALL.len());
        for language in Language::ALL {
            statuses.push(
                toolchain::probe(&self.config.toolchains, language, self.config.capability_timeout)
                    .await,
            );
        }
        statuses
    }

    /// Compare a baseline against a candidate
    pub async fn compare(&self, payload: CompareBenchmarkRequest) -> AppResult<ComparisonReport> {
        let language = Language::from_str(&payload.language)?;
        let baseline =
            resolve_snippet(payload.baseline, language, ComparisonSide::Baseline.as_str())?;
        let candidate =
            resolve_snippet(payload.candidate, language, ComparisonSide::Candidate.as_str())?;

        let request = ComparisonRequest {
            language,
            baseline,
            candidate,
            input_sizes: self.input_sizes(payload.input_sizes)?,
            input_type: input_type(payload.input_type.as_deref()),
            runs: payload.runs.unwrap_or(self.config.runs),
        };

        self.runner.run_comparison(&request).await
    }

    /// Measure a single snippet
    pub async fn run(&self, payload: RunBenchmarkRequest) -> AppResult<RunBenchmarkResponse> {
        let language = Language::from_str(&payload.language)?;
        let snippet = resolve_snippet(
            SnippetPayload {
                code: payload.code,
                function_name: payload.function_name,
            },
            language,
            "submitted",
        )?;

        let request = SnippetRequest {
            language,
            input_sizes: self.input_sizes(payload.input_sizes)?,
            input_type: input_type(payload.input_type.as_deref()),
            runs: payload.runs.unwrap_or(self.config.runs),
            snippet,
        };

        let results = self.runner.benchmark(&request).await?;

        Ok(RunBenchmarkResponse {
            language,
            function_name: request.snippet.function_name,
            input_type: request.input_type,
            success: results.iter().all(|r| r.success),
            results,
            environment: EnvironmentInfo::capture(),
        })
    }

    /// Average speedup over the default sizes
    pub async fn speedup(&self, payload: SpeedupRequest) -> AppResult<SpeedupResponse> {
        let language = Language::from_str(&payload.language)?;
        validate_source_code(&payload.baseline_code).map_err(validation_error)?;
        validate_source_code(&payload.candidate_code).map_err(validation_error)?;

        let speedup = self
            .runner
            .calculate_speedup(&payload.baseline_code, &payload.candidate_code, language)
            .await?;

        Ok(SpeedupResponse { speedup })
    }

    fn input_sizes(&self, requested: Option<Vec<usize>>) -> AppResult<Vec<usize>> {
        let sizes = requested.unwrap_or_else(|| self.config.default_input_sizes.clone());
        validate_input_sizes(&sizes, self.config.max_input_size).map_err(AppError::Validation)?;
        Ok(sizes)
    }
}

fn resolve_snippet(payload: SnippetPayload, language: Language, label: &str) -> AppResult<Snippet> {
    validate_source_code(&payload.code).map_err(validation_error)?;
    if let Some(name) = payload.function_name.as_deref().map(str::trim) {
        if !name.is_empty() {
            validate_function_name(name).map_err(validation_error)?;
        }
    }
    Snippet::resolve(payload.code, payload.function_name.as_deref(), language, label)
}

fn input_type(name: Option<&str>) -> InputType {
    name.map(InputType::from_name).unwrap_or_default()
}

fn validation_error(message: &str) -> AppError {
    AppError::Validation(message.to_string())
}
