//! Benchmark execution engine
//!
//! A comparison flows through these pieces in order:
//!
//! 1. **Extractor** (`extractor.rs`): finds the function to call in each snippet.
//! 2. **Harness** (`harness.rs`, `languages/`): renders a standalone program that
//!    builds the input, times the function and prints marker lines.
//! 3. **Executor** (`executor.rs`, `toolchain.rs`): runs the program with the
//!    host toolchain under a wall-clock limit, in a throwaway directory.
//!    `capture.rs` bounds what is kept of its output.
//! 4. **Parser** (`parser.rs`): reads the markers back into a result.
//! 5. **Runner** (`runner.rs`, `metrics.rs`): pairs baseline and candidate per
//!    input size and aggregates speedups.

mod capture;
pub mod executor;
pub mod extractor;
pub mod harness;
pub mod languages;
pub mod metrics;
pub mod parser;
pub mod runner;
pub mod toolchain;

pub use executor::{BenchmarkExecutor, ProcessExecutor, RunRequest};
pub use extractor::extract_function_name;
pub use harness::{generate, HarnessRequest, HarnessScript};
pub use metrics::MetricsCollector;
pub use parser::parse_output;
pub use runner::{BenchmarkRunner, ComparisonRequest, Snippet, SnippetRequest};
pub use toolchain::{Toolchain, ToolchainStatus};
