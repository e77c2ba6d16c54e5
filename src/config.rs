//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! Configuration is loaded once by the binary and handed to the services that need it.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    toolchains, DEFAULT_BENCHMARK_RUNS, DEFAULT_CAPABILITY_TIMEOUT_MS, DEFAULT_INPUT_SIZES,
    DEFAULT_MAX_INPUT_SIZE, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_TIMEOUT_SECONDS,
};
use crate::models::Language;

/// Main application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub benchmark: BenchmarkConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub log_format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Benchmark execution configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of timed runs per measurement (warm-up excluded)
    pub runs: u32,
    /// Wall-clock ceiling for each subprocess
    pub timeout: Duration,
    /// Ceiling for toolchain version probes
    pub capability_timeout: Duration,
    /// Input sizes used when a request does not name any
    pub default_input_sizes: Vec<usize>,
    /// Largest input size a request may ask for
    pub max_input_size: usize,
    /// Root for scratch directories (system temp dir when unset)
    pub temp_dir: Option<PathBuf>,
    /// Toolchain programs
    pub toolchains: ToolchainConfig,
}

/// Programs used to run each language
#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    pub python: String,
    pub node: String,
    pub go: String,
    pub rustc: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            benchmark: BenchmarkConfig::from_env()?,
        })
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            log_format: match env::var("LOG_FORMAT") {
                Ok(value) => value.parse()?,
                Err(_) => LogFormat::Pretty,
            },
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            rust_log: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" | "" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidValue("LOG_FORMAT".to_string())),
        }
    }
}

impl BenchmarkConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let runs: u32 = parse_var("BENCHMARK_RUNS", DEFAULT_BENCHMARK_RUNS)?;
        if runs == 0 {
            return Err(ConfigError::InvalidValue("BENCHMARK_RUNS".to_string()));
        }

        let timeout_secs: u64 = parse_var("BENCHMARK_TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECONDS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "BENCHMARK_TIMEOUT_SECONDS".to_string(),
            ));
        }

        let default_input_sizes = match env::var("BENCHMARK_INPUT_SIZES") {
            Ok(raw) => parse_sizes(&raw)
                .ok_or_else(|| ConfigError::InvalidValue("BENCHMARK_INPUT_SIZES".to_string()))?,
            Err(_) => DEFAULT_INPUT_SIZES.to_vec(),
        };

        Ok(Self {
            runs,
            timeout: Duration::from_secs(timeout_secs),
            capability_timeout: Duration::from_millis(parse_var(
                "BENCHMARK_CAPABILITY_TIMEOUT_MS",
                DEFAULT_CAPABILITY_TIMEOUT_MS,
            )?),
            default_input_sizes,
            max_input_size: parse_var("BENCHMARK_MAX_INPUT_SIZE", DEFAULT_MAX_INPUT_SIZE)?,
            temp_dir: env::var("BENCHMARK_TEMP_DIR").ok().map(PathBuf::from),
            toolchains: ToolchainConfig::from_env(),
        })
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            runs: DEFAULT_BENCHMARK_RUNS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            capability_timeout: Duration::from_millis(DEFAULT_CAPABILITY_TIMEOUT_MS),
            default_input_sizes: DEFAULT_INPUT_SIZES.to_vec(),
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
            temp_dir: None,
            toolchains: ToolchainConfig::default(),
        }
    }
}

impl ToolchainConfig {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            python: env::var("PYTHON_BIN").unwrap_or(defaults.python),
            node: env::var("NODE_BIN").unwrap_or(defaults.node),
            go: env::var("GO_BIN").unwrap_or(defaults.go),
            rustc: env::var("RUSTC_BIN").unwrap_or(defaults.rustc),
        }
    }

    /// Program that runs (or compiles) the given language
    pub fn program(&self, language: Language) -> &str {
        match language {
            Language::Python => &self.python,
            Language::JavaScript | Language::TypeScript => &self.node,
            Language::Go => &self.go,
            Language::Rust => &self.rustc,
        }
    }
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            python: toolchains::PYTHON.to_string(),
            node: toolchains::NODE.to_string(),
            go: toolchains::GO.to_string(),
            rustc: toolchains::RUSTC.to_string(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Parse a comma separated list of positive sizes
fn parse_sizes(raw: &str) -> Option<Vec<usize>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<usize>().ok().filter(|size| *size > 0))
        .collect()
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
