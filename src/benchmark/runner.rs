//! Benchmark runner - Orchestrates baseline vs candidate comparisons
//!
//! Sizes are measured strictly in order, baseline first, one subprocess at a
//! time so the two sides never compete for the CPU.

use uuid::Uuid;

use crate::{
    config::BenchmarkConfig,
    error::{AppError, AppResult},
    models::{
        BenchmarkComparison, BenchmarkResult, ComparisonReport, ComparisonSide, InputType,
        Language,
    },
    utils::time::format_milliseconds,
};

use super::{
    executor::{BenchmarkExecutor, RunRequest},
    extractor::extract_function_name,
    metrics::{round2, MetricsCollector},
};

/// A code blob and the function inside it to benchmark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub code: String,
    pub function_name: String,
}

impl Snippet {
    pub fn new(code: impl Into<String>, function_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            function_name: function_name.into(),
        }
    }

    /// Use `function_name` when given, otherwise extract it from the code.
    ///
    /// `label` names the snippet (`baseline`, `candidate`) in the error.
    pub fn resolve(
        code: impl Into<String>,
        function_name: Option<&str>,
        language: Language,
        label: &str,
    ) -> AppResult<Self> {
        let code = code.into();
        let function_name = match function_name.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => extract_function_name(&code, language)
                .ok_or_else(|| AppError::FunctionNotFound(label.to_string()))?,
        };
        Ok(Self {
            code,
            function_name,
        })
    }
}

/// Baseline vs candidate over a list of input sizes
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRequest {
    pub language: Language,
    pub baseline: Snippet,
    pub candidate: Snippet,
    pub input_sizes: Vec<usize>,
    pub input_type: InputType,
    pub runs: u32,
}

/// A single snippet over a list of input sizes
#[derive(Debug, Clone, PartialEq)]
pub struct SnippetRequest {
    pub language: Language,
    pub snippet: Snippet,
    pub input_sizes: Vec<usize>,
    pub input_type: InputType,
    pub runs: u32,
}

/// Drives an executor across input sizes
pub struct BenchmarkRunner<E> {
    executor: E,
    default_input_sizes: Vec<usize>,
    default_runs: u32,
}

impl<E: BenchmarkExecutor> BenchmarkRunner<E> {
    /// Create a new benchmark runner
    pub fn new(executor: E, config: &BenchmarkConfig) -> Self {
        Self {
            executor,
            default_input_sizes: config.default_input_sizes.clone(),
            default_runs: config.runs,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Per-size comparisons; sizes where either side failed are left out
    pub async fn compare(&self, request: &ComparisonRequest) -> AppResult<Vec<BenchmarkComparison>> {
        let collector = self.collect(request).await?;
        Ok(collector.comparisons().to_vec())
    }

    /// Full report including dropped sizes, averages and host information
    pub async fn run_comparison(&self, request: &ComparisonRequest) -> AppResult<ComparisonReport> {
        let collector = self.collect(request).await?;
        Ok(collector.finish(request.language, request.input_type, request.runs))
    }

    /// Measure one snippet at every requested size
    pub async fn benchmark(&self, request: &SnippetRequest) -> AppResult<Vec<BenchmarkResult>> {
        ensure_runs(request.runs)?;

        let mut results = Vec::with_capacity(request.input_sizes.len());
        for &input_size in &request.input_sizes {
            let result = self
                .executor
                .execute(&run_request(
                    request.language,
                    &request.snippet,
                    input_size,
                    request.input_type,
                    request.runs,
                ))
                .await;

            if !result.success {
                tracing::warn!(
                    language = %request.language,
                    input_size,
                    error = result.error.as_deref().unwrap_or_default(),
                    "Benchmark failed"
                );
            }
            results.push(result);
        }

        Ok(results)
    }

    /// Average speedup of `candidate_code` over `baseline_code` at the
    /// default sizes, rounded to two decimals.
    ///
    /// Functions are located automatically; `None` means no size succeeded.
    pub async fn calculate_speedup(
        &self,
        baseline_code: &str,
        candidate_code: &str,
        language: Language,
    ) -> AppResult<Option<f64>> {
        let request = ComparisonRequest {
            language,
            baseline: Snippet::resolve(
                baseline_code,
                None,
                language,
                ComparisonSide::Baseline.as_str(),
            )?,
            candidate: Snippet::resolve(
                candidate_code,
                None,
                language,
                ComparisonSide::Candidate.as_str(),
            )?,
            input_sizes: self.default_input_sizes.clone(),
            input_type: InputType::default(),
            runs: self.default_runs,
        };

        let collector = self.collect(&request).await?;
        Ok(collector.average_speedup().map(round2))
    }

    async fn collect(&self, request: &ComparisonRequest) -> AppResult<MetricsCollector> {
        ensure_runs(request.runs)?;

        let comparison_id = Uuid::new_v4();
        let mut collector = MetricsCollector::new();

        tracing::info!(
            %comparison_id,
            language = %request.language,
            sizes = ?request.input_sizes,
            runs = request.runs,
            "Starting comparison"
        );

        for &input_size in &request.input_sizes {
            let baseline = self
                .executor
                .execute(&run_request(
                    request.language,
                    &request.baseline,
                    input_size,
                    request.input_type,
                    request.runs,
                ))
                .await;
            let candidate = self
                .executor
                .execute(&run_request(
                    request.language,
                    &request.candidate,
                    input_size,
                    request.input_type,
                    request.runs,
                ))
                .await;

            match collector.record(&baseline, &candidate) {
                Some(comparison) => {
                    tracing::info!(
                        %comparison_id,
                        input_size,
                        baseline = %format_milliseconds(comparison.baseline_time_ms),
                        candidate = %format_milliseconds(comparison.optimized_time_ms),
                        speedup = comparison.speedup,
                        "Compared input size"
                    );
                    if comparison.output_matches == Some(false) {
                        tracing::warn!(%comparison_id, input_size, "Snippets returned different values");
                    }
                }
                None => tracing::warn!(
                    %comparison_id,
                    input_size,
                    baseline_error = baseline.error.as_deref().unwrap_or_default(),
                    candidate_error = candidate.error.as_deref().unwrap_or_default(),
                    "Dropping input size"
                ),
            }
        }

        tracing::info!(
            %comparison_id,
            compared = collector.comparisons().len(),
            dropped = collector.failures().len(),
            average_speedup = ?collector.average_speedup(),
            "Comparison finished"
        );

        Ok(collector)
    }
}

fn ensure_runs(runs: u32) -> AppResult<()> {
    if runs == 0 {
        return Err(AppError::Validation(
            "runs must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn run_request(
    language: Language,
    snippet: &Snippet,
    input_size: usize,
    input_type: InputType,
    runs: u32,
) -> RunRequest {
    RunRequest {
        language,
        code: snippet.code.clone(),
        function_name: snippet.function_name.clone(),
        input_size,
        input_type,
        runs,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::benchmark::executor::MockBenchmarkExecutor;
    use crate::models::FailureKind;

    const BASELINE: &str = "def slow(xs):\n    return xs\n";
    const CANDIDATE: &str = "def fast(xs):\n    return xs\n";

    /// Baseline takes 10ms, candidate 2ms, at every size
    fn timed(request: &RunRequest) -> BenchmarkResult {
        let time = if request.function_name == "slow" { 10.0 } else { 2.0 };
        BenchmarkResult::measured(request.input_size, request.runs, time, Some(1000), None)
    }

    fn runner(executor: MockBenchmarkExecutor) -> BenchmarkRunner<MockBenchmarkExecutor> {
        BenchmarkRunner::new(executor, &BenchmarkConfig::default())
    }

    fn comparison(sizes: Vec<usize>) -> ComparisonRequest {
        ComparisonRequest {
            language: Language::Python,
            baseline: Snippet::new(BASELINE, "slow"),
            candidate: Snippet::new(CANDIDATE, "fast"),
            input_sizes: sizes,
            input_type: InputType::Array,
            runs: 5,
        }
    }

    #[tokio::test]
    async fn test_compare_runs_sizes_in_order_baseline_first() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&calls);

        let mut executor = MockBenchmarkExecutor::new();
        executor.expect_execute().times(6).returning(move |request| {
            seen.lock()
                .unwrap()
                .push((request.function_name.clone(), request.input_size));
            timed(request)
        });

        let comparisons = runner(executor)
            .compare(&comparison(vec![1000, 100, 1000]))
            .await
            .unwrap();

        assert_eq!(
            comparisons.iter().map(|c| c.input_size).collect::<Vec<_>>(),
            vec![1000, 100, 1000]
        );
        assert!(comparisons.iter().all(|c| c.speedup == 5.0));

        let calls = calls.lock().unwrap();
        let expected: Vec<(String, usize)> = [1000, 100, 1000]
            .into_iter()
            .flat_map(|size| [("slow".to_string(), size), ("fast".to_string(), size)])
            .collect();
        assert_eq!(*calls, expected);
    }

    #[tokio::test]
    async fn test_failed_size_is_dropped() {
        let mut executor = MockBenchmarkExecutor::new();
        executor.expect_execute().returning(|request| {
            if request.function_name == "fast" && request.input_size == 1000 {
                BenchmarkResult::failed(1000, request.runs, FailureKind::Timeout, "too slow")
            } else {
                timed(request)
            }
        });
        let runner = runner(executor);

        let comparisons = runner.compare(&comparison(vec![100, 1000])).await.unwrap();
        assert_eq!(comparisons.len(), 1);
        assert_eq!(comparisons[0].input_size, 100);

        let report = runner
            .run_comparison(&comparison(vec![100, 1000]))
            .await
            .unwrap();
        assert!(report.success);
        assert_eq!(report.average_speedup, Some(5.0));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, FailureKind::Timeout);
        assert_eq!(report.failures[0].input_size, 1000);
    }

    #[tokio::test]
    async fn test_every_size_failing_leaves_average_undefined() {
        let mut executor = MockBenchmarkExecutor::new();
        executor.expect_execute().returning(|request| {
            if request.function_name == "fast" {
                BenchmarkResult::failed(
                    request.input_size,
                    request.runs,
                    FailureKind::Runtime,
                    "SyntaxError: invalid syntax",
                )
            } else {
                timed(request)
            }
        });

        let report = runner(executor)
            .run_comparison(&comparison(vec![100, 1000]))
            .await
            .unwrap();

        assert!(report.comparisons.is_empty());
        assert_eq!(report.average_speedup, None);
        assert!(!report.success);
        assert!(report.error.unwrap().contains("SyntaxError"));
        assert!(report.failures.iter().all(|f| !f.message.is_empty()));
    }

    #[tokio::test]
    async fn test_empty_sizes() {
        let mut executor = MockBenchmarkExecutor::new();
        executor.expect_execute().never();
        let runner = runner(executor);

        assert!(runner.compare(&comparison(vec![])).await.unwrap().is_empty());

        let report = runner.run_comparison(&comparison(vec![])).await.unwrap();
        assert!(report.success);
        assert_eq!(report.average_speedup, None);
    }

    #[tokio::test]
    async fn test_zero_runs_rejected() {
        let mut executor = MockBenchmarkExecutor::new();
        executor.expect_execute().never();

        let mut request = comparison(vec![100]);
        request.runs = 0;

        let err = runner(executor).compare(&request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_benchmark_single_snippet() {
        let mut executor = MockBenchmarkExecutor::new();
        executor.expect_execute().times(2).returning(timed);

        let results = runner(executor)
            .benchmark(&SnippetRequest {
                language: Language::Python,
                snippet: Snippet::new(BASELINE, "slow"),
                input_sizes: vec![10, 20],
                input_type: InputType::String,
                runs: 3,
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[1].input_size, 20);
        assert_eq!(results[1].runs_count, 3);
    }

    #[tokio::test]
    async fn test_calculate_speedup_uses_defaults_and_rounds() {
        let mut executor = MockBenchmarkExecutor::new();
        executor.expect_execute().times(6).returning(|request| {
            assert_eq!(request.runs, 5);
            let time = if request.function_name == "slow" { 10.0 } else { 3.0 };
            BenchmarkResult::measured(request.input_size, request.runs, time, None, None)
        });

        let speedup = runner(executor)
            .calculate_speedup(BASELINE, CANDIDATE, Language::Python)
            .await
            .unwrap();

        assert_eq!(speedup, Some(3.33));
    }

    #[tokio::test]
    async fn test_calculate_speedup_requires_functions() {
        let mut executor = MockBenchmarkExecutor::new();
        executor.expect_execute().never();

        let err = runner(executor)
            .calculate_speedup("x = 1", CANDIDATE, Language::Python)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Could not find a function to benchmark in the baseline code"
        );

        let mut executor = MockBenchmarkExecutor::new();
        executor.expect_execute().never();

        let err = runner(executor)
            .calculate_speedup(BASELINE, "y = 2", Language::Python)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not find a function to benchmark in the candidate code"
        );
    }

    #[test]
    fn test_snippet_resolve() {
        let explicit =
            Snippet::resolve(BASELINE, Some("custom"), Language::Python, "baseline").unwrap();
        assert_eq!(explicit.function_name, "custom");

        let extracted =
            Snippet::resolve(BASELINE, Some("  "), Language::Python, "baseline").unwrap();
        assert_eq!(extracted.function_name, "slow");

        let err = Snippet::resolve("nothing here", None, Language::Go, "candidate").unwrap_err();
        assert!(matches!(err, AppError::FunctionNotFound(ref side) if side == "candidate"));
    }
}
