//! Metrics collection and analysis

use crate::models::{
    BenchmarkComparison, BenchmarkResult, ComparisonReport, ComparisonSide, EnvironmentInfo,
    InputType, Language, SizeFailure,
};

/// Speedup of `optimized` over `baseline`.
///
/// A zero (or negative) optimized time cannot be divided by and counts as
/// no change.
pub fn speedup(baseline_ms: f64, optimized_ms: f64) -> f64 {
    if optimized_ms <= 0.0 {
        return 1.0;
    }
    baseline_ms / optimized_ms
}

/// How many times less memory the optimized run used
pub fn memory_reduction(baseline: Option<u64>, optimized: Option<u64>) -> Option<f64> {
    match (baseline, optimized) {
        (Some(baseline), Some(optimized)) if optimized > 0 => {
            Some(baseline as f64 / optimized as f64)
        }
        _ => None,
    }
}

/// Arithmetic mean, `None` for an empty slice
pub fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Combined 0-100 score: 60% speed, 40% memory.
///
/// Each ratio maps to `min(100, 50 * log10(ratio))`, so 10x earns 50 points
/// and 100x earns the full 100. Ratios below 1 score zero.
pub fn efficiency_score(speedup: Option<f64>, memory_reduction: Option<f64>) -> Option<f64> {
    if speedup.is_none() && memory_reduction.is_none() {
        return None;
    }

    let speed = ratio_score(speedup.unwrap_or(1.0));
    let memory = ratio_score(memory_reduction.unwrap_or(1.0));
    Some(round2(0.6 * speed + 0.4 * memory))
}

fn ratio_score(ratio: f64) -> f64 {
    (50.0 * ratio.max(1.0).log10()).min(100.0)
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Accumulates per-size outcomes of one comparison
#[derive(Debug, Default)]
pub struct MetricsCollector {
    comparisons: Vec<BenchmarkComparison>,
    failures: Vec<SizeFailure>,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the pair of measurements taken at one size.
    ///
    /// Returns the comparison when both sides succeeded; otherwise the
    /// failing side(s) are kept for the report and `None` is returned.
    pub fn record(
        &mut self,
        baseline: &BenchmarkResult,
        candidate: &BenchmarkResult,
    ) -> Option<&BenchmarkComparison> {
        match BenchmarkComparison::from_results(baseline, candidate) {
            Some(comparison) => {
                self.comparisons.push(comparison);
                self.comparisons.last()
            }
            None => {
                self.failures.extend(
                    [
                        SizeFailure::from_result(ComparisonSide::Baseline, baseline),
                        SizeFailure::from_result(ComparisonSide::Candidate, candidate),
                    ]
                    .into_iter()
                    .flatten(),
                );
                None
            }
        }
    }

    pub fn comparisons(&self) -> &[BenchmarkComparison] {
        &self.comparisons
    }

    pub fn failures(&self) -> &[SizeFailure] {
        &self.failures
    }

    /// Mean speedup over successful sizes
    pub fn average_speedup(&self) -> Option<f64> {
        let speedups: Vec<f64> = self.comparisons.iter().map(|c| c.speedup).collect();
        average(&speedups)
    }

    /// Mean memory reduction over sizes where both sides reported memory
    pub fn average_memory_reduction(&self) -> Option<f64> {
        let reductions: Vec<f64> = self
            .comparisons
            .iter()
            .filter_map(|c| c.memory_reduction)
            .collect();
        average(&reductions)
    }

    /// `Some(false)` as soon as one checked size returned different values
    pub fn outputs_match(&self) -> Option<bool> {
        self.comparisons
            .iter()
            .filter_map(|c| c.output_matches)
            .reduce(|all, matches| all && matches)
    }

    /// Build the final report
    pub fn finish(self, language: Language, input_type: InputType, runs: u32) -> ComparisonReport {
        let average_speedup = self.average_speedup();
        let average_memory_reduction = self.average_memory_reduction();
        let outputs_match = self.outputs_match();

        // An empty request is not a failure; only sizes that were attempted
        // and all dropped are.
        let success = !self.comparisons.is_empty() || self.failures.is_empty();
        let error = (!success).then(|| summarize_failures(&self.failures));

        ComparisonReport {
            language,
            input_type,
            runs,
            efficiency_score: efficiency_score(average_speedup, average_memory_reduction),
            average_speedup,
            average_memory_reduction,
            outputs_match,
            comparisons: self.comparisons,
            failures: self.failures,
            success,
            error,
            environment: EnvironmentInfo::capture(),
        }
    }
}

fn summarize_failures(failures: &[SizeFailure]) -> String {
    match failures.first() {
        Some(first) if failures.len() == 1 => first.message.clone(),
        Some(first) => format!(
            "All input sizes failed ({} failures); first: {}",
            failures.len(),
            first.message
        ),
        None => "Unknown error".to_string(),
    }
}
