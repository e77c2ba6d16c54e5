//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Maximum accepted request body size (bytes)
pub const MAX_REQUEST_BODY_BYTES: usize = 512 * 1024;

// =============================================================================
// BENCHMARK DEFAULTS
// =============================================================================

/// Default number of timed runs per measurement (warm-up excluded)
pub const DEFAULT_BENCHMARK_RUNS: u32 = 5;

/// Maximum number of timed runs a caller may request
pub const MAX_BENCHMARK_RUNS: u32 = 100;

/// Wall-clock ceiling for every benchmark subprocess, in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Window for toolchain capability probes (`--version`), in milliseconds
pub const DEFAULT_CAPABILITY_TIMEOUT_MS: u64 = 5_000;

/// Input sizes used when the caller does not supply any
pub const DEFAULT_INPUT_SIZES: &[usize] = &[100, 1_000, 10_000];

/// Largest input size a single measurement may request
pub const DEFAULT_MAX_INPUT_SIZE: usize = 10_000_000;

/// Maximum number of input sizes in one request
pub const MAX_INPUT_SIZES_PER_REQUEST: u64 = 10;

/// Maximum source code size accepted for one snippet (64KB)
pub const MAX_SOURCE_CODE_BYTES: u64 = 65_536;

/// Prefix of every per-invocation scratch directory
pub const SCRATCH_DIR_PREFIX: &str = "forgebench-";

/// Stem of the generated harness file inside a scratch directory
pub const HARNESS_FILE_STEM: &str = "harness";

/// Non-marker text kept per output stream of a benchmark subprocess (8MB),
/// split between the first and the last lines
pub const MAX_CAPTURED_OUTPUT_BYTES: usize = 8 * 1024 * 1024;

/// Marker lines kept per output stream (1MB, newest kept)
pub const MAX_CAPTURED_MARKER_BYTES: usize = 1024 * 1024;

/// Longest single output line kept; the rest of the line is discarded
pub const MAX_CAPTURED_LINE_BYTES: usize = 64 * 1024;

// =============================================================================
// HARNESS MARKER PROTOCOL
// =============================================================================

/// Line prefixes written by generated harness programs
pub mod markers {
    /// Mean of the timed runs in milliseconds
    pub const TIME: &str = "TIME:";
    /// One timed run in milliseconds
    pub const SAMPLE: &str = "SAMPLE:";
    /// Memory measurement in bytes
    pub const MEMORY: &str = "MEMORY:";
    /// Digest of the function's return value from the warm-up call
    pub const OUTPUT: &str = "OUTPUT:";
    /// Warm-up failure
    pub const ERROR: &str = "ERROR:";
    /// Terminal line of a completed harness
    pub const SUCCESS: &str = "SUCCESS";
}

// =============================================================================
// SUPPORTED LANGUAGES
// =============================================================================

/// Language identifiers
pub mod languages {
    pub const PYTHON: &str = "python";
    pub const JAVASCRIPT: &str = "javascript";
    pub const TYPESCRIPT: &str = "typescript";
    pub const GO: &str = "go";
    pub const RUST: &str = "rust";

    /// All supported language identifiers
    pub const ALL: &[&str] = &[PYTHON, JAVASCRIPT, TYPESCRIPT, GO, RUST];
}

/// Default toolchain programs for each language
pub mod toolchains {
    pub const PYTHON: &str = "python3";
    pub const NODE: &str = "node";
    pub const GO: &str = "go";
    pub const RUSTC: &str = "rustc";
}

/// File extensions for each language
pub mod file_extensions {
    pub const PYTHON: &str = "py";
    pub const JAVASCRIPT: &str = "js";
    pub const GO: &str = "go";
    pub const RUST: &str = "rs";
}

// =============================================================================
// INPUT TYPES
// =============================================================================

/// Synthetic input kinds understood by the harness generator
pub mod input_types {
    pub const ARRAY: &str = "array";
    pub const RANDOM_ARRAY: &str = "random_array";
    pub const STRING: &str = "string";
    pub const DICT: &str = "dict";
    pub const MAP: &str = "map";
}
