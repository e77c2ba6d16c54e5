//! Benchmark result models

use serde::{Deserialize, Serialize};

use crate::{
    benchmark::metrics::{memory_reduction, speedup},
    constants::input_types,
};

use super::{EnvironmentInfo, Language};

/// Shape of the synthetic input handed to the benchmarked function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    /// Contiguous integers `0..N`
    #[default]
    Array,
    /// `N` integers in `[0, N]` from a PRNG seeded with `N`
    RandomArray,
    /// The character `a` repeated `N` times
    String,
    /// Integer-keyed map `i -> i` for `i in 0..N`
    #[serde(alias = "dict")]
    Map,
}

impl InputType {
    /// Resolve an input type name, falling back to [`InputType::Array`]
    /// for anything unrecognised.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            input_types::RANDOM_ARRAY => Self::RandomArray,
            input_types::STRING => Self::String,
            input_types::DICT | input_types::MAP => Self::Map,
            _ => Self::Array,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Array => input_types::ARRAY,
            Self::RandomArray => input_types::RANDOM_ARRAY,
            Self::String => input_types::STRING,
            Self::Map => input_types::MAP,
        }
    }
}

/// Why a single measurement failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Interpreter or compiler missing on the host
    ToolchainUnavailable,
    /// The harness did not compile
    Compilation,
    /// User code raised, panicked or exited without completing
    Runtime,
    /// Wall-clock ceiling exceeded; the process tree was killed
    Timeout,
    /// Output markers were missing or malformed
    Parse,
    /// Host-side problem preparing the run (temp files, spawning)
    Internal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToolchainUnavailable => "toolchain_unavailable",
            Self::Compilation => "compilation",
            Self::Runtime => "runtime",
            Self::Timeout => "timeout",
            Self::Parse => "parse",
            Self::Internal => "internal",
        }
    }
}

/// Outcome of measuring one snippet at one input size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkResult {
    pub input_size: usize,
    /// Mean of the timed runs in milliseconds (0 on failure)
    pub execution_time_ms: f64,
    pub memory_bytes: Option<u64>,
    pub runs_count: u32,
    pub success: bool,
    pub error: Option<String>,
    pub failure: Option<FailureKind>,
    /// Spread of the individual timed runs, when the harness reported them
    pub timing: Option<TimingStats>,
    /// Digest of the warm-up call's return value, when it could be rendered
    pub output_digest: Option<String>,
}

impl BenchmarkResult {
    /// A completed measurement
    pub fn measured(
        input_size: usize,
        runs_count: u32,
        execution_time_ms: f64,
        memory_bytes: Option<u64>,
        timing: Option<TimingStats>,
    ) -> Self {
        Self {
            input_size,
            execution_time_ms,
            memory_bytes,
            runs_count,
            success: true,
            error: None,
            failure: None,
            timing,
            output_digest: None,
        }
    }

    /// Attach the digest of the function's return value
    pub fn with_output_digest(mut self, digest: Option<String>) -> Self {
        self.output_digest = digest;
        self
    }

    /// A failed measurement
    pub fn failed(
        input_size: usize,
        runs_count: u32,
        kind: FailureKind,
        error: impl Into<String>,
    ) -> Self {
        Self {
            input_size,
            execution_time_ms: 0.0,
            memory_bytes: None,
            runs_count,
            success: false,
            error: Some(error.into()),
            failure: Some(kind),
            timing: None,
            output_digest: None,
        }
    }
}

/// Statistics over the individual timed runs of one measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingStats {
    pub samples: u32,
    pub mean_ms: f64,
    pub median_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub stddev_ms: f64,
    /// Samples outside 1.5 IQR of the quartiles
    pub outliers: u32,
}

impl TimingStats {
    /// Summarise run durations; `None` when there are no samples
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let count = samples.len();
        let mean_ms = samples.iter().sum::<f64>() / count as f64;
        let min_ms = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max_ms = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        let median_ms = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };

        let variance = samples
            .iter()
            .map(|t| (t - mean_ms).powi(2))
            .sum::<f64>()
            / count as f64;

        Some(Self {
            samples: count as u32,
            mean_ms,
            median_ms,
            min_ms,
            max_ms,
            stddev_ms: variance.sqrt(),
            outliers: count_outliers(&sorted),
        })
    }
}

/// Count outliers using the IQR method (needs at least four samples)
fn count_outliers(sorted: &[f64]) -> u32 {
    let n = sorted.len();
    if n < 4 {
        return 0;
    }

    let q1 = sorted[n / 4];
    let q3 = sorted[3 * n / 4];
    let iqr = q3 - q1;

    let lower_bound = q1 - 1.5 * iqr;
    let upper_bound = q3 + 1.5 * iqr;

    sorted
        .iter()
        .filter(|t| **t < lower_bound || **t > upper_bound)
        .count() as u32
}

/// Baseline vs candidate at one input size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkComparison {
    pub input_size: usize,
    pub baseline_time_ms: f64,
    pub optimized_time_ms: f64,
    /// `baseline / optimized`, or `1.0` when the optimized time is zero
    pub speedup: f64,
    pub memory_baseline: Option<u64>,
    pub memory_optimized: Option<u64>,
    pub memory_reduction: Option<f64>,
    /// Whether both sides returned the same value; `None` when either side
    /// could not render its return value
    pub output_matches: Option<bool>,
}

impl BenchmarkComparison {
    /// Pair two measurements taken at the same size.
    ///
    /// Returns `None` unless both succeeded.
    pub fn from_results(baseline: &BenchmarkResult, optimized: &BenchmarkResult) -> Option<Self> {
        if !baseline.success || !optimized.success {
            return None;
        }

        Some(Self {
            input_size: baseline.input_size,
            baseline_time_ms: baseline.execution_time_ms,
            optimized_time_ms: optimized.execution_time_ms,
            speedup: speedup(baseline.execution_time_ms, optimized.execution_time_ms),
            memory_baseline: baseline.memory_bytes,
            memory_optimized: optimized.memory_bytes,
            memory_reduction: memory_reduction(baseline.memory_bytes, optimized.memory_bytes),
            output_matches: match (&baseline.output_digest, &optimized.output_digest) {
                (Some(baseline), Some(optimized)) => Some(baseline == optimized),
                _ => None,
            },
        })
    }
}

/// Which snippet of a pair a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonSide {
    Baseline,
    Candidate,
}

impl ComparisonSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Candidate => "candidate",
        }
    }
}

/// A failed measurement that caused an input size to be dropped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeFailure {
    pub input_size: usize,
    pub side: ComparisonSide,
    pub kind: FailureKind,
    pub message: String,
}

impl SizeFailure {
    /// Build from a failed result; `None` if the result succeeded
    pub fn from_result(side: ComparisonSide, result: &BenchmarkResult) -> Option<Self> {
        if result.success {
            return None;
        }

        Some(Self {
            input_size: result.input_size,
            side,
            kind: result.failure.unwrap_or(FailureKind::Internal),
            message: result
                .error
                .clone()
                .unwrap_or_else(|| "Unknown error".to_string()),
        })
    }
}

/// Aggregated outcome of comparing a baseline and a candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub language: Language,
    pub input_type: InputType,
    pub runs: u32,
    pub comparisons: Vec<BenchmarkComparison>,
    pub failures: Vec<SizeFailure>,
    /// Mean of per-size speedups; `None` when no size succeeded
    pub average_speedup: Option<f64>,
    pub average_memory_reduction: Option<f64>,
    /// Combined 0-100 score of speed and memory improvements
    pub efficiency_score: Option<f64>,
    /// `false` if any compared size returned different values on the two
    /// sides; `None` when no size could be checked
    pub outputs_match: Option<bool>,
    pub success: bool,
    pub error: Option<String>,
    pub environment: EnvironmentInfo,
}
